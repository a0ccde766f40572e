use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};
use tracing::{debug, error, info, warn};

use crate::config::MonitorConfig;
use crate::config_store::ConfigStore;
use crate::scanner::Scanner;

const STOP_GRACE: Duration = Duration::from_secs(1);
pub const ERROR_COOLDOWN: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SchedulerState {
    Stopped,
    Running,
}

struct Worker {
    cancel: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

/// Runs the scanner in the background every `scan_interval_minutes`.
///
/// At most one loop exists at a time. Cancellation is checked between
/// iterations; a scan that has started always runs to completion. The config
/// file is re-read at every iteration boundary, so edits made by other
/// processes reach a running loop.
pub struct Scheduler {
    scanner: Arc<Scanner>,
    store: Arc<ConfigStore>,
    worker: Mutex<Option<Worker>>,
}

impl Scheduler {
    pub fn new(scanner: Arc<Scanner>, store: Arc<ConfigStore>) -> Self {
        Self {
            scanner,
            store,
            worker: Mutex::new(None),
        }
    }

    pub async fn state(&self) -> SchedulerState {
        if self.worker.lock().await.is_some() {
            SchedulerState::Running
        } else {
            SchedulerState::Stopped
        }
    }

    /// Returns false if a loop is already running.
    pub async fn start(&self) -> bool {
        let mut worker = self.worker.lock().await;
        if worker.is_some() {
            debug!("scheduler already running");
            return false;
        }

        let (cancel, cancelled) = watch::channel(false);
        let handle = tokio::spawn(run_loop(
            Arc::clone(&self.scanner),
            Arc::clone(&self.store),
            cancelled,
        ));

        *worker = Some(Worker { cancel, handle });
        info!("scheduler started");
        true
    }

    /// Signal the loop to stop and wait briefly for it to exit.
    ///
    /// Always reports success; a loop busy with a scan exits after it.
    pub async fn stop(&self) -> bool {
        let Some(Worker { cancel, handle }) = self.worker.lock().await.take() else {
            return true;
        };

        let _ = cancel.send(true);

        match timeout(STOP_GRACE, handle).await {
            Ok(Ok(())) => info!("scheduler stopped"),
            Ok(Err(e)) => warn!(error = ?e, "scheduler loop ended abnormally"),
            Err(_) => info!("scheduler stopping after in-flight scan"),
        }
        true
    }
}

async fn run_loop(
    scanner: Arc<Scanner>,
    store: Arc<ConfigStore>,
    mut cancelled: watch::Receiver<bool>,
) {
    let mut iteration: u64 = 0;

    loop {
        if *cancelled.borrow() {
            break;
        }
        iteration += 1;

        let config = latest_config(&store).await;
        let scan = {
            let scanner = Arc::clone(&scanner);
            tokio::spawn(async move { scanner.scan(&config).await })
        };

        let finished = scan.await;

        // Picked up after the scan so edits made meanwhile apply to this wait.
        let minutes = latest_config(&store).await.scan_interval_minutes;
        let interval = Duration::from_secs(u64::from(minutes) * 60);

        let delay = match finished {
            Ok(outcome) => {
                info!(
                    iteration,
                    results = outcome.results.len(),
                    alerts = outcome.alerts.len(),
                    next_in_secs = interval.as_secs(),
                    "scheduled scan finished"
                );
                interval
            }
            Err(e) => {
                error!(iteration, error = ?e, "scheduled scan failed");
                ERROR_COOLDOWN.min(interval)
            }
        };

        tokio::select! {
            _ = sleep(delay) => {}
            changed = cancelled.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }

    info!(iterations = iteration, "scheduler loop exited");
}

async fn latest_config(store: &ConfigStore) -> Arc<MonitorConfig> {
    if let Err(e) = store.reload().await {
        warn!(error = ?e, "config reload failed, keeping last good copy");
    }
    store.current().await
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use anyhow::Result;
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use tempfile::{TempDir, tempdir};

    use super::*;
    use crate::config::SettingsUpdate;
    use crate::price_client::{Bar, HistoryProvider, Timeframe};
    use crate::scanner::tests::{FakeProvider, RecordingNotifier, dropping};

    async fn fixture(provider: Arc<dyn HistoryProvider>) -> (TempDir, Arc<ConfigStore>, Scheduler) {
        let dir = tempdir().unwrap();
        let store = Arc::new(ConfigStore::open(dir.path().join("config.json")).await.unwrap());
        store.add("AAA").await.unwrap();

        let scanner = Arc::new(Scanner::new(provider, Arc::new(RecordingNotifier::default())));
        let scheduler = Scheduler::new(scanner, Arc::clone(&store));
        (dir, store, scheduler)
    }

    #[tokio::test(start_paused = true)]
    async fn start_twice_then_stop_and_restart() {
        let provider = Arc::new(FakeProvider::default().with("AAA", dropping()));
        let (_dir, _store, scheduler) = fixture(provider).await;

        assert_eq!(scheduler.state().await, SchedulerState::Stopped);
        assert!(scheduler.start().await);
        assert!(!scheduler.start().await);
        assert_eq!(scheduler.state().await, SchedulerState::Running);

        assert!(scheduler.stop().await);
        assert_eq!(scheduler.state().await, SchedulerState::Stopped);

        assert!(scheduler.start().await);
        assert_eq!(scheduler.state().await, SchedulerState::Running);
        assert!(scheduler.stop().await);
    }

    #[tokio::test]
    async fn stop_when_stopped_is_noop() {
        let provider = Arc::new(FakeProvider::default());
        let (_dir, _store, scheduler) = fixture(provider).await;

        assert!(scheduler.stop().await);
        assert_eq!(scheduler.state().await, SchedulerState::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn scans_once_per_interval() {
        let provider = Arc::new(FakeProvider::default().with("AAA", dropping()));
        let (_dir, _store, scheduler) = fixture(provider.clone()).await;

        scheduler.start().await;
        sleep(Duration::from_secs(1)).await;
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);

        sleep(Duration::from_secs(30 * 60 + 1)).await;
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);

        scheduler.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn stop_wakes_sleeping_loop() {
        let provider = Arc::new(FakeProvider::default().with("AAA", dropping()));
        let (_dir, _store, scheduler) = fixture(provider.clone()).await;

        scheduler.start().await;
        sleep(Duration::from_secs(1)).await;
        assert!(scheduler.stop().await);

        sleep(Duration::from_secs(2 * 60 * 60)).await;
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn interval_is_read_from_current_config() {
        let provider = Arc::new(FakeProvider::default().with("AAA", dropping()));
        let (_dir, store, scheduler) = fixture(provider.clone()).await;
        store
            .update_settings(SettingsUpdate {
                scan_interval_minutes: Some(5),
                ..Default::default()
            })
            .await
            .unwrap();

        scheduler.start().await;
        sleep(Duration::from_secs(5 * 60 + 1)).await;
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);

        scheduler.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn interval_change_applies_to_next_wait() {
        let provider = Arc::new(FakeProvider::default().with("AAA", dropping()));
        let (_dir, store, scheduler) = fixture(provider.clone()).await;

        scheduler.start().await;
        sleep(Duration::from_secs(1)).await;
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);

        store
            .update_settings(SettingsUpdate {
                scan_interval_minutes: Some(5),
                ..Default::default()
            })
            .await
            .unwrap();

        // The 30 minute wait already under way is not shortened.
        sleep(Duration::from_secs(5 * 60)).await;
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);

        sleep(Duration::from_secs(25 * 60)).await;
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);

        sleep(Duration::from_secs(5 * 60)).await;
        assert_eq!(provider.calls.load(Ordering::SeqCst), 3);

        scheduler.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn edits_from_another_store_reach_running_loop() {
        let provider = Arc::new(
            FakeProvider::default()
                .with("AAA", dropping())
                .with("BBB", dropping()),
        );
        let (_dir, store, scheduler) = fixture(provider.clone()).await;
        let editor = ConfigStore::open(store.path()).await.unwrap();

        scheduler.start().await;
        sleep(Duration::from_secs(1)).await;
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);

        editor.add("BBB").await.unwrap();
        editor
            .update_settings(SettingsUpdate {
                scan_interval_minutes: Some(5),
                ..Default::default()
            })
            .await
            .unwrap();

        sleep(Duration::from_secs(30 * 60)).await;
        assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
        let snapshot = scheduler.scanner.snapshot().await.unwrap();
        assert_eq!(snapshot.results.len(), 2);
        assert_eq!(store.current().await.scan_interval_minutes, 5);

        sleep(Duration::from_secs(5 * 60)).await;
        assert_eq!(provider.calls.load(Ordering::SeqCst), 5);

        scheduler.stop().await;
    }

    /// Panics on the first fetch, then behaves.
    struct FlakyProvider {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl HistoryProvider for FlakyProvider {
        async fn fetch_bars(
            &self,
            _symbol: &str,
            _timeframe: Timeframe,
            _start: DateTime<Utc>,
            _end: DateTime<Utc>,
        ) -> Result<Vec<Bar>> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                panic!("upstream exploded");
            }
            Ok(dropping())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn loop_survives_failed_scan() {
        let provider = Arc::new(FlakyProvider {
            calls: AtomicUsize::new(0),
        });
        let (_dir, _store, scheduler) = fixture(provider.clone()).await;

        scheduler.start().await;
        sleep(ERROR_COOLDOWN + Duration::from_secs(1)).await;

        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
        assert_eq!(scheduler.state().await, SchedulerState::Running);
        assert!(scheduler.scanner.snapshot().await.is_some());

        scheduler.stop().await;
    }
}
