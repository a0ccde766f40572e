use std::env::var;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_CONFIG_PATH: &str = "config.json";
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_CONTROL_ADDR: SocketAddr =
    SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, 8787));

/// Process settings read from the environment (after `.env` is loaded).
#[derive(Clone, Debug)]
pub struct Config {
    pub config_path: PathBuf,
    pub fetch_timeout: Duration,
    /// Where `serve` listens for control requests and other commands find it.
    pub control_addr: SocketAddr,
    pub market_data: Option<MarketDataCredentials>,
}

#[derive(Clone)]
pub struct MarketDataCredentials {
    pub base_api: String,
    pub key_id: String,
    pub secret: String,
}

impl std::fmt::Debug for MarketDataCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarketDataCredentials")
            .field("base_api", &self.base_api)
            .finish_non_exhaustive()
    }
}

impl Config {
    pub fn from_env() -> Self {
        let fetch_timeout_secs = var("FETCH_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_FETCH_TIMEOUT_SECS);

        let market_data = match (
            var("APCA_API_BASE_URL"),
            var("APCA_API_KEY_ID"),
            var("APCA_API_SECRET_KEY"),
        ) {
            (Ok(base_api), Ok(key_id), Ok(secret)) => Some(MarketDataCredentials {
                base_api,
                key_id,
                secret,
            }),
            _ => None,
        };

        Self {
            config_path: var("CONFIG_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH)),
            fetch_timeout: Duration::from_secs(fetch_timeout_secs),
            control_addr: var("CONTROL_ADDR")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_CONTROL_ADDR),
            market_data,
        }
    }
}
