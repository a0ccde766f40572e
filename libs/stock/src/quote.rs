use std::time::Duration;

use anyhow::{Error, anyhow};
use chrono::Utc;
use serde::Serialize;
use tokio::time::error::Elapsed;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::indicators::rsi::round2;
use crate::indicators::{RSI_PERIOD, compute_rsi};
use crate::price_client::{Bar, HistoryProvider, Timeframe};

const DAILY_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quote {
    pub price: f64,
    /// Percent change against the previous daily close.
    pub change: f64,
    pub rsi: Option<f64>,
}

/// Per-symbol answer of a price lookup; failures carry an error tag instead
/// of aborting the whole lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum QuoteLookup {
    Quote(Quote),
    Error { error: String },
}

/// Latest price from intraday bars when available, else the last daily close.
pub fn quote_from_bars(intraday: &[Bar], daily: &[Bar]) -> Option<Quote> {
    let current = intraday.last().or(daily.last())?.close;

    let change = match daily {
        [.., prev, _] if prev.close != 0.0 => round2((current / prev.close - 1.0) * 100.0),
        _ => 0.0,
    };

    let closes: Vec<f64> = daily.iter().map(|b| b.close).collect();

    Some(Quote {
        price: round2(current),
        change,
        rsi: compute_rsi(&closes, RSI_PERIOD),
    })
}

pub async fn lookup(
    provider: &dyn HistoryProvider,
    symbol: &str,
    fetch_timeout: Duration,
) -> QuoteLookup {
    let now = Utc::now();
    let day_ago = now - chrono::Duration::days(1);
    let month_ago = now - chrono::Duration::days(DAILY_WINDOW_DAYS);

    let (intraday, daily) = tokio::join!(
        timeout(
            fetch_timeout,
            provider.fetch_bars(symbol, Timeframe::Minute1, day_ago, now)
        ),
        timeout(fetch_timeout, provider.fetch_history(symbol, month_ago, now)),
    );

    let mut failure: Option<Error> = None;
    let mut bars_or_empty = |res: Result<Result<Vec<Bar>, Error>, Elapsed>, kind: &str| match res {
        Ok(Ok(bars)) => bars,
        Ok(Err(e)) => {
            debug!(symbol, kind, error = ?e, "fetch failed");
            failure = Some(e);
            Vec::new()
        }
        Err(_) => {
            debug!(symbol, kind, "fetch timed out");
            failure = Some(anyhow!("timed out after {:?}", fetch_timeout));
            Vec::new()
        }
    };

    let intraday = bars_or_empty(intraday, "intraday");
    let daily = bars_or_empty(daily, "daily");

    match quote_from_bars(&intraday, &daily) {
        Some(quote) => QuoteLookup::Quote(quote),
        None => {
            let error = match failure {
                Some(e) => format!("Error fetching price for {symbol}: {e}"),
                None => "No data available".to_string(),
            };
            warn!(symbol, %error, "price lookup failed");
            QuoteLookup::Error { error }
        }
    }
}

/// Look up every symbol in order.
pub async fn lookup_all(
    provider: &dyn HistoryProvider,
    symbols: &[String],
    fetch_timeout: Duration,
) -> Vec<(String, QuoteLookup)> {
    let mut out = Vec::with_capacity(symbols.len());
    for symbol in symbols {
        out.push((symbol.clone(), lookup(provider, symbol, fetch_timeout).await));
    }
    out
}
