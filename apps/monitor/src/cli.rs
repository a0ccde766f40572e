use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "monitor")]
#[command(about = "Watchlist drawdown and RSI monitor", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the background scanner and the local control API until interrupted
    Serve,
    /// Resume scheduled scans in the serving monitor
    Start,
    /// Pause scheduled scans in the serving monitor
    Stop,
    /// Scan the watchlist once (through the serving monitor when there is one)
    Scan,
    /// Current price, daily change and RSI for every watched symbol
    Prices,
    /// Monitoring state, last scan and alert counts of the serving monitor
    Status,
    /// Manage the watchlist
    Stocks {
        #[command(subcommand)]
        action: StocksAction,
    },
    /// Show or change monitoring settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
    /// Manage trade thesis notes
    Thesis {
        #[command(subcommand)]
        action: ThesisAction,
    },
}

#[derive(Subcommand)]
pub enum StocksAction {
    /// Replace the watchlist (comma or newline separated)
    Set { symbols: String },
    /// Add symbol(s), comma-separated (e.g., TSLA,MSFT)
    Add { symbols: String },
    /// Remove symbol(s), comma-separated
    Remove { symbols: String },
    /// Print the watchlist
    List,
}

#[derive(Subcommand)]
pub enum SettingsAction {
    Show,
    Update(SettingsArgs),
}

#[derive(Args, Debug, Default)]
pub struct SettingsArgs {
    /// Alert when this many percent below the recent high (e.g., 5 or 7.5)
    #[arg(long)]
    pub alert_threshold: Option<String>,
    #[arg(long)]
    pub lookback_days: Option<u32>,
    #[arg(long)]
    pub scan_interval_minutes: Option<u32>,
    #[arg(long)]
    pub tradingview_url: Option<String>,
    #[arg(long)]
    pub email_enabled: Option<bool>,
    #[arg(long)]
    pub smtp_server: Option<String>,
    #[arg(long)]
    pub smtp_port: Option<u16>,
    #[arg(long)]
    pub sender_email: Option<String>,
    #[arg(long)]
    pub sender_password: Option<String>,
    #[arg(long)]
    pub recipient_email: Option<String>,
}

#[derive(Subcommand)]
pub enum ThesisAction {
    List,
    Add(ThesisArgs),
    /// Edit the entry at INDEX (as shown by `thesis list`)
    Update {
        index: usize,
        #[command(flatten)]
        entry: ThesisArgs,
    },
    /// Delete the entry at INDEX
    Delete { index: usize },
}

#[derive(Args, Debug)]
pub struct ThesisArgs {
    #[arg(long)]
    pub ticker: String,
    #[arg(long, default_value = "")]
    pub thesis: String,
    #[arg(long, default_value = "")]
    pub trigger: String,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_start_and_stop() {
        let start = Cli::try_parse_from(["monitor", "start"]).unwrap();
        assert!(matches!(start.command, Commands::Start));

        let stop = Cli::try_parse_from(["monitor", "stop"]).unwrap();
        assert!(matches!(stop.command, Commands::Stop));
    }

    #[test]
    fn parses_settings_update() {
        let cli = Cli::try_parse_from([
            "monitor",
            "settings",
            "update",
            "--alert-threshold",
            "7.5",
            "--email-enabled",
            "true",
        ])
        .unwrap();

        match cli.command {
            Commands::Settings {
                action: SettingsAction::Update(args),
            } => {
                assert_eq!(args.alert_threshold.as_deref(), Some("7.5"));
                assert_eq!(args.email_enabled, Some(true));
                assert_eq!(args.lookback_days, None);
            }
            _ => panic!("expected settings update"),
        }
    }

    #[test]
    fn parses_thesis_update() {
        let cli = Cli::try_parse_from([
            "monitor", "thesis", "update", "2", "--ticker", "amd", "--trigger", "break 200",
        ])
        .unwrap();

        match cli.command {
            Commands::Thesis {
                action: ThesisAction::Update { index, entry },
            } => {
                assert_eq!(index, 2);
                assert_eq!(entry.ticker, "amd");
                assert_eq!(entry.thesis, "");
                assert_eq!(entry.trigger, "break 200");
            }
            _ => panic!("expected thesis update"),
        }
    }
}
