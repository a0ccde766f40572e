use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use stock::{
    ConfigStore, EmailNotifier, HistoryProvider, Notifier, PriceClient, Scanner, Scheduler,
    SchedulerState, StatusReport,
};

pub mod cli;
pub mod command;
pub mod config;
pub mod control;

use config::Config;
use control::ControlClient;

pub type Error = anyhow::Error;

/// Shared application state handed to every command and control route.
pub struct Data {
    pub config_store: Arc<ConfigStore>,
    pub fetch_timeout: Duration,
    pub control_addr: SocketAddr,
    pub control: ControlClient,
    market: Option<Market>,
}

/// Everything that needs market data.
pub struct Market {
    pub provider: Arc<dyn HistoryProvider>,
    pub scanner: Arc<Scanner>,
    pub scheduler: Arc<Scheduler>,
}

impl Market {
    pub fn new(
        provider: Arc<dyn HistoryProvider>,
        notifier: Arc<dyn Notifier>,
        config_store: &Arc<ConfigStore>,
        fetch_timeout: Duration,
    ) -> Self {
        let scanner = Arc::new(
            Scanner::new(Arc::clone(&provider), notifier).with_fetch_timeout(fetch_timeout),
        );
        let scheduler = Arc::new(Scheduler::new(
            Arc::clone(&scanner),
            Arc::clone(config_store),
        ));
        Self {
            provider,
            scanner,
            scheduler,
        }
    }
}

impl Data {
    pub async fn new(config: &Config) -> Result<Self, Error> {
        let config_store = Arc::new(ConfigStore::open(&config.config_path).await?);

        let market = match &config.market_data {
            Some(creds) => {
                let price_client = PriceClient::new(
                    creds.base_api.clone(),
                    creds.key_id.clone(),
                    creds.secret.clone(),
                    config.fetch_timeout,
                )?;
                Some(Market::new(
                    Arc::new(price_client),
                    Arc::new(EmailNotifier),
                    &config_store,
                    config.fetch_timeout,
                ))
            }
            None => None,
        };

        Self::with_market(
            config_store,
            config.fetch_timeout,
            market,
            config.control_addr,
        )
    }

    pub fn with_market(
        config_store: Arc<ConfigStore>,
        fetch_timeout: Duration,
        market: Option<Market>,
        control_addr: SocketAddr,
    ) -> Result<Self, Error> {
        Ok(Self {
            config_store,
            fetch_timeout,
            control_addr,
            control: ControlClient::new(control_addr)?,
            market,
        })
    }

    pub fn market(&self) -> Result<&Market, Error> {
        self.market.as_ref().ok_or_else(|| {
            anyhow!(
                "market data is not configured: set APCA_API_BASE_URL, APCA_API_KEY_ID and APCA_API_SECRET_KEY"
            )
        })
    }

    /// Status of the monitor owned by this process.
    pub async fn status(&self) -> StatusReport {
        let config = self.config_store.current().await;
        let (state, snapshot) = match &self.market {
            Some(market) => (market.scheduler.state().await, market.scanner.snapshot().await),
            None => (SchedulerState::Stopped, None),
        };
        stock::status(state, snapshot.as_deref(), &config)
    }
}
