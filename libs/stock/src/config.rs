use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ConfigError;
use crate::thesis::ThesisEntry;

pub const DEFAULT_ALERT_THRESHOLD: f64 = 0.05;
pub const DEFAULT_LOOKBACK_DAYS: u32 = 30;
pub const DEFAULT_SCAN_INTERVAL_MINUTES: u32 = 30;

/// User settings and watchlist, persisted as one JSON document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Upper-cased tickers in the order the user entered them.
    pub stocks: Vec<String>,
    /// Fractional drop from the recent high that raises an alert.
    pub alert_threshold: f64,
    pub lookback_days: u32,
    pub scan_interval_minutes: u32,
    pub tradingview_url: String,
    pub thesis_entries: Vec<ThesisEntry>,
    pub email_settings: EmailSettings,

    /// Keys this version does not know about, kept so a save does not drop them.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            stocks: Vec::new(),
            alert_threshold: DEFAULT_ALERT_THRESHOLD,
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            scan_interval_minutes: DEFAULT_SCAN_INTERVAL_MINUTES,
            tradingview_url: String::new(),
            thesis_entries: Vec::new(),
            email_settings: EmailSettings::default(),
            extra: Map::new(),
        }
    }
}

impl MonitorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.alert_threshold.is_finite()
            || self.alert_threshold < 0.0
            || self.alert_threshold >= 1.0
        {
            return Err(ConfigError::ThresholdOutOfRange(self.alert_threshold));
        }
        if self.lookback_days == 0 {
            return Err(ConfigError::InvalidLookback);
        }
        if self.scan_interval_minutes == 0 {
            return Err(ConfigError::InvalidInterval);
        }
        Ok(())
    }

    /// Re-normalize the watchlist (trim, upper-case, drop blanks and repeats).
    pub fn normalize(&mut self) {
        self.stocks = dedupe(self.stocks.iter().map(|s| normalize_symbol(s)));
    }

    pub fn apply(&mut self, update: SettingsUpdate) {
        if let Some(v) = update.alert_threshold {
            self.alert_threshold = v;
        }
        if let Some(v) = update.lookback_days {
            self.lookback_days = v;
        }
        if let Some(v) = update.scan_interval_minutes {
            self.scan_interval_minutes = v;
        }
        if let Some(v) = update.tradingview_url {
            self.tradingview_url = v.trim().to_string();
        }

        let email = &mut self.email_settings;
        if let Some(v) = update.email_enabled {
            email.enabled = v;
        }
        if let Some(v) = update.smtp_server {
            email.smtp_server = v;
        }
        if let Some(v) = update.smtp_port {
            email.smtp_port = v;
        }
        if let Some(v) = update.sender_email {
            email.sender_email = v;
        }
        if let Some(v) = update.sender_password {
            email.sender_password = v;
        }
        if let Some(v) = update.recipient_email {
            email.recipient_email = v;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailSettings {
    pub enabled: bool,
    pub smtp_server: String,
    pub smtp_port: u16,
    pub sender_email: String,
    pub sender_password: String,
    pub recipient_email: String,
}

impl Default for EmailSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            smtp_server: "smtp.gmail.com".to_string(),
            smtp_port: 587,
            sender_email: String::new(),
            sender_password: String::new(),
            recipient_email: String::new(),
        }
    }
}

/// Partial settings change; `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsUpdate {
    pub alert_threshold: Option<f64>,
    pub lookback_days: Option<u32>,
    pub scan_interval_minutes: Option<u32>,
    pub tradingview_url: Option<String>,
    pub email_enabled: Option<bool>,
    pub smtp_server: Option<String>,
    pub smtp_port: Option<u16>,
    pub sender_email: Option<String>,
    pub sender_password: Option<String>,
    pub recipient_email: Option<String>,
}

pub fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

/// Split user text on commas and newlines into normalized tickers.
pub fn parse_symbols(text: &str) -> Vec<String> {
    dedupe(text.split([',', '\n']).map(normalize_symbol))
}

fn dedupe(symbols: impl Iterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for symbol in symbols {
        if !symbol.is_empty() && !out.contains(&symbol) {
            out.push(symbol);
        }
    }
    out
}

/// Convert a user-facing percentage ("5", "5.05") into a stored fraction,
/// quantized to four decimal places.
pub fn percent_to_fraction(percent: &str) -> Result<f64, ConfigError> {
    let invalid = || ConfigError::InvalidPercentage(percent.to_string());

    let value = Decimal::from_str(percent.trim()).map_err(|_| invalid())?;
    let fraction = (value / Decimal::ONE_HUNDRED).round_dp(4);
    let fraction = fraction.to_f64().ok_or_else(invalid)?;

    if !(0.0..1.0).contains(&fraction) {
        return Err(ConfigError::ThresholdOutOfRange(fraction));
    }
    Ok(fraction)
}

pub fn fraction_to_percent(fraction: f64) -> f64 {
    (fraction * 100.0 * 100.0).round() / 100.0
}
