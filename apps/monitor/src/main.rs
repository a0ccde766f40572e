use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use monitor::{Data, cli::Cli, command, config::Config};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();
    debug!(?config, "loaded process config");

    let data = Arc::new(Data::new(&config).await?);
    command::run(cli.command, data).await
}
