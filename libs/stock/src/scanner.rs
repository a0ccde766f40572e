use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local, Utc};
use futures::{StreamExt, stream};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tokio::time::timeout;
use tracing::{debug, error, info, instrument, warn};
use tracing_futures::Instrument;

use crate::alert::{AlertResult, evaluate};
use crate::config::MonitorConfig;
use crate::indicators::RSI_PERIOD;
use crate::notifier::Notifier;
use crate::price_client::HistoryProvider;

const CONCURRENCY: usize = 8;
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(15);

/// Results of the latest completed scan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanSnapshot {
    pub results: Vec<AlertResult>,
    pub alerts: Vec<AlertResult>,
    pub timestamp: DateTime<Local>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanOutcome {
    pub alerts: Vec<AlertResult>,
    pub results: Vec<AlertResult>,
}

/// Evaluates the watchlist and publishes the latest [`ScanSnapshot`].
///
/// `scan` takes `&self` and may run concurrently from the scheduler and a
/// manual trigger; the last one to finish owns the snapshot.
pub struct Scanner {
    provider: Arc<dyn HistoryProvider>,
    notifier: Arc<dyn Notifier>,
    fetch_timeout: Duration,
    snapshot: RwLock<Option<Arc<ScanSnapshot>>>,
}

impl Scanner {
    pub fn new(provider: Arc<dyn HistoryProvider>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            provider,
            notifier,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            snapshot: RwLock::new(None),
        }
    }

    pub fn with_fetch_timeout(mut self, fetch_timeout: Duration) -> Self {
        self.fetch_timeout = fetch_timeout;
        self
    }

    pub async fn snapshot(&self) -> Option<Arc<ScanSnapshot>> {
        self.snapshot.read().await.clone()
    }

    #[instrument(name = "scan", skip_all, fields(symbols = config.stocks.len()))]
    pub async fn scan(&self, config: &MonitorConfig) -> ScanOutcome {
        let end = Utc::now();
        let start = end - chrono::Duration::days(i64::from(config.lookback_days));
        let threshold = config.alert_threshold;

        let results: Vec<AlertResult> = stream::iter(config.stocks.clone())
            .map(|symbol| {
                let span = tracing::info_span!("scan_symbol", symbol = %symbol);
                async move { self.check_symbol(&symbol, start, end, threshold).await }
                    .instrument(span)
            })
            .buffered(CONCURRENCY)
            .filter_map(|res| async move { res })
            .collect()
            .await;

        let alerts: Vec<AlertResult> = results.iter().filter(|r| r.is_alert).cloned().collect();

        info!(
            evaluated = results.len(),
            skipped = config.stocks.len() - results.len(),
            alerts = alerts.len(),
            "completed scan"
        );

        let snapshot = ScanSnapshot {
            results: results.clone(),
            alerts: alerts.clone(),
            timestamp: Local::now(),
        };
        *self.snapshot.write().await = Some(Arc::new(snapshot));

        if !alerts.is_empty() && config.email_settings.enabled {
            match self.notifier.notify(&config.email_settings, &alerts).await {
                Ok(()) => debug!(alerts = alerts.len(), "notification sent"),
                Err(e) => error!(error = ?e, "notification failed"),
            }
        }

        ScanOutcome { alerts, results }
    }

    async fn check_symbol(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        threshold: f64,
    ) -> Option<AlertResult> {
        let fetch = self.provider.fetch_history(symbol, start, end);
        let bars = match timeout(self.fetch_timeout, fetch).await {
            Ok(Ok(b)) => {
                debug!(bars = b.len(), "fetched price bars");
                b
            }
            Ok(Err(e)) => {
                warn!(error = ?e, "fetch_history failed");
                return None;
            }
            Err(_) => {
                warn!(timeout = ?self.fetch_timeout, "fetch_history timed out");
                return None;
            }
        };

        if bars.is_empty() {
            debug!("no bars returned");
            return None;
        }

        let result = evaluate(symbol, &bars, threshold, RSI_PERIOD);
        match &result {
            Some(r) => debug!(
                pct_from_high = r.pct_from_high,
                is_alert = r.is_alert,
                rsi = ?r.rsi,
                "evaluated"
            ),
            None => debug!("history could not be evaluated"),
        }
        result
    }
}
