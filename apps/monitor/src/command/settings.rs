use stock::SettingsUpdate;
use stock::config::{MonitorConfig, fraction_to_percent, percent_to_fraction};
use tracing::info;

use crate::cli::{SettingsAction, SettingsArgs};
use crate::{Data, Error};

pub async fn settings(data: &Data, action: SettingsAction) -> Result<(), Error> {
    match action {
        SettingsAction::Show => {
            let config = data.config_store.current().await;
            print!("{}", describe(&config));
        }
        SettingsAction::Update(args) => {
            let update = to_update(args)?;
            data.config_store.update_settings(update).await?;
            info!("settings updated");
            println!("Settings updated successfully");
        }
    }
    Ok(())
}

fn to_update(args: SettingsArgs) -> Result<SettingsUpdate, Error> {
    let alert_threshold = args
        .alert_threshold
        .as_deref()
        .map(percent_to_fraction)
        .transpose()?;

    Ok(SettingsUpdate {
        alert_threshold,
        lookback_days: args.lookback_days,
        scan_interval_minutes: args.scan_interval_minutes,
        tradingview_url: args.tradingview_url,
        email_enabled: args.email_enabled,
        smtp_server: args.smtp_server,
        smtp_port: args.smtp_port,
        sender_email: args.sender_email,
        sender_password: args.sender_password,
        recipient_email: args.recipient_email,
    })
}

fn describe(config: &MonitorConfig) -> String {
    let email = &config.email_settings;
    let mut out = String::new();
    out.push_str(&format!(
        "alert_threshold: {}%\n",
        fraction_to_percent(config.alert_threshold)
    ));
    out.push_str(&format!("lookback_days: {}\n", config.lookback_days));
    out.push_str(&format!(
        "scan_interval_minutes: {}\n",
        config.scan_interval_minutes
    ));
    out.push_str(&format!("tradingview_url: {}\n", config.tradingview_url));
    out.push_str(&format!("stocks: {}\n", config.stocks.join(", ")));
    out.push_str(&format!("email_enabled: {}\n", email.enabled));
    out.push_str(&format!("smtp: {}:{}\n", email.smtp_server, email.smtp_port));
    out.push_str(&format!("sender_email: {}\n", email.sender_email));
    out.push_str(&format!("recipient_email: {}\n", email.recipient_email));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_percentage_becomes_fraction() {
        let update = to_update(SettingsArgs {
            alert_threshold: Some("7.5".to_string()),
            lookback_days: Some(60),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(update.alert_threshold, Some(0.075));
        assert_eq!(update.lookback_days, Some(60));
        assert_eq!(update.smtp_port, None);
    }

    #[test]
    fn bad_percentage_is_rejected() {
        let res = to_update(SettingsArgs {
            alert_threshold: Some("five".to_string()),
            ..Default::default()
        });
        assert!(res.is_err());
    }

    #[test]
    fn describe_shows_percent_and_hides_password() {
        let mut config = MonitorConfig::default();
        config.email_settings.sender_password = "hunter2".to_string();

        let text = describe(&config);

        assert!(text.contains("alert_threshold: 5%"));
        assert!(!text.contains("hunter2"));
    }
}
