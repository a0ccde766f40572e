use thiserror::Error;

/// Rejected user input for the monitor config.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("alert threshold must be a fraction in [0, 1), got {0}")]
    ThresholdOutOfRange(f64),

    #[error("invalid percentage: {0}")]
    InvalidPercentage(String),

    #[error("lookback_days must be positive")]
    InvalidLookback,

    #[error("scan_interval_minutes must be positive")]
    InvalidInterval,

    #[error("ticker is required")]
    EmptyTicker,

    #[error("invalid entry index {index} (have {len})")]
    IndexOutOfRange { index: usize, len: usize },
}
