use std::time::Duration;

use anyhow::{Error, Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{
    Client, Url,
    header::{HeaderMap, HeaderValue},
};
use serde::Deserialize;
use tracing::debug;

const MAX_BARS: usize = 10_000;

/// Source of OHLCV history for a single symbol.
///
/// Bars are returned in ascending time order. An empty vector means the
/// provider answered but had no data for the window.
#[async_trait]
pub trait HistoryProvider: Send + Sync {
    async fn fetch_bars(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Bar>>;

    /// Daily bars between `start` and `end`.
    async fn fetch_history(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Bar>> {
        self.fetch_bars(symbol, Timeframe::Day1, start, end).await
    }
}

#[derive(Clone)]
pub struct PriceClient {
    client: Client,
    base_api: String,
}

impl PriceClient {
    pub fn new(base_api: String, key_id: String, secret: String, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert("APCA-API-KEY-ID", HeaderValue::from_str(&key_id)?);
        headers.insert("APCA-API-SECRET-KEY", HeaderValue::from_str(&secret)?);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self { client, base_api })
    }

    /// `{base}/v2/stocks/{symbol}/bars` with the symbol as one encoded segment.
    fn bars_url(&self, symbol: &str) -> Result<Url> {
        let mut url = Url::parse(&self.base_api)?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("{} cannot be used as a base URL", self.base_api))?
            .pop_if_empty()
            .extend(["v2", "stocks", symbol, "bars"]);
        Ok(url)
    }
}

#[async_trait]
impl HistoryProvider for PriceClient {
    async fn fetch_bars(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Bar>, Error> {
        let url = self.bars_url(symbol)?;

        let res: BarsResponse = self
            .client
            .get(url)
            .query(&[
                ("feed", "iex"),
                ("timeframe", timeframe.as_str()),
                ("start", &start.to_rfc3339()),
                ("end", &end.to_rfc3339()),
                ("limit", &MAX_BARS.to_string()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let bars = res.bars.unwrap_or_default();
        debug!(symbol, timeframe = timeframe.as_str(), bars = bars.len(), "fetched bars");
        Ok(bars)
    }
}

//
// Match Alpaca API JSON
// https://docs.alpaca.markets/reference/stockbars
//
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeframe {
    Minute1,
    Day1,
}

impl Timeframe {
    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::Minute1 => "1Min",
            Timeframe::Day1 => "1Day",
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct BarsResponse {
    // Alpaca sends `null` when the window has no bars.
    pub bars: Option<Vec<Bar>>,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Bar {
    #[serde(rename = "t")]
    pub timestamp: DateTime<Utc>,

    #[serde(rename = "o")]
    pub open: f64,

    #[serde(rename = "h")]
    pub high: f64,

    #[serde(rename = "l")]
    pub low: f64,

    #[serde(rename = "c")]
    pub close: f64,

    #[serde(rename = "v")]
    pub volume: i64,
}
