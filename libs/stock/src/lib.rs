mod config_store;
mod error;
mod price_client;

pub mod alert;
pub mod config;
pub mod indicators;
pub mod notifier;
pub mod quote;
pub mod scanner;
pub mod scheduler;
pub mod status;
pub mod thesis;

pub use alert::{AlertResult, evaluate};
pub use config::{EmailSettings, MonitorConfig, SettingsUpdate};
pub use config_store::ConfigStore;
pub use error::ConfigError;
pub use notifier::{EmailNotifier, Notifier};
pub use price_client::{Bar, HistoryProvider, PriceClient, Timeframe};
pub use scanner::{ScanOutcome, ScanSnapshot, Scanner};
pub use scheduler::{SchedulerState, Scheduler};
pub use status::{StatusReport, status};
pub use thesis::{ThesisDraft, ThesisEntry};
