use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::indicators::compute_rsi;
use crate::indicators::rsi::round2;
use crate::price_client::Bar;

/// Verdict for one symbol after a scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertResult {
    pub symbol: String,
    pub current_price: f64,
    pub recent_high: f64,
    /// Percent distance from the recent high, always <= 0.
    pub pct_from_high: f64,
    pub is_alert: bool,
    pub date_of_high: NaiveDate,
    pub rsi: Option<f64>,
}

impl AlertResult {
    pub fn status_label(&self) -> &'static str {
        if self.is_alert { "ALERT" } else { "OK" }
    }
}

/// Compare the last close of `history` against its highest high.
///
/// `alert_threshold` is a fraction (0.05 alerts at 5% or more below the high).
/// Returns `None` for an empty history or a non-positive high.
pub fn evaluate(
    symbol: &str,
    history: &[Bar],
    alert_threshold: f64,
    rsi_period: usize,
) -> Option<AlertResult> {
    let last = history.last()?;
    let current_price = last.close;

    // Ties resolve to the latest bar.
    let (high_bar, recent_high) = history
        .iter()
        .fold(None::<(&Bar, f64)>, |best, bar| match best {
            Some((_, high)) if bar.high < high => best,
            _ => Some((bar, bar.high)),
        })?;

    if !recent_high.is_finite() || recent_high <= 0.0 || !current_price.is_finite() {
        return None;
    }

    let change = (current_price - recent_high) / recent_high;
    let is_alert = change <= -alert_threshold.abs();

    let closes: Vec<f64> = history.iter().map(|b| b.close).collect();

    Some(AlertResult {
        symbol: symbol.to_string(),
        current_price: round2(current_price),
        recent_high: round2(recent_high),
        pct_from_high: round2(change * 100.0),
        is_alert,
        date_of_high: high_bar.timestamp.date_naive(),
        rsi: compute_rsi(&closes, rsi_period),
    })
}
