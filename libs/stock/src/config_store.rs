use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Error};
use chrono::Local;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::config::{MonitorConfig, SettingsUpdate, normalize_symbol};
use crate::error::ConfigError;
use crate::thesis::{self, ThesisDraft, ThesisEntry};

/// Read a config document, applying defaults for missing keys.
pub async fn load(path: &Path) -> Result<MonitorConfig, Error> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;

    let mut config: MonitorConfig = serde_json::from_str(&raw)
        .with_context(|| format!("parsing {}", path.display()))?;

    config.normalize();
    config
        .validate()
        .with_context(|| format!("validating {}", path.display()))?;

    Ok(config)
}

/// Write `config` as indented JSON, replacing the file in one rename.
pub async fn save(path: &Path, config: &MonitorConfig) -> Result<(), Error> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    serde::Serialize::serialize(config, &mut ser)?;

    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, &buf)
        .await
        .with_context(|| format!("writing {}", tmp.display()))?;
    tokio::fs::rename(&tmp, path)
        .await
        .with_context(|| format!("replacing {}", path.display()))?;

    debug!(path = %path.display(), bytes = buf.len(), "config saved");
    Ok(())
}

/// Process-wide owner of the monitor config.
///
/// Readers get an `Arc` snapshot; writers build a modified copy, persist it,
/// then swap it in, so nobody observes a half-applied update. Other processes
/// may edit the same file; [`ConfigStore::reload`] picks their edits up and
/// every update starts from the file's latest contents.
pub struct ConfigStore {
    path: PathBuf,
    current: RwLock<Arc<MonitorConfig>>,
    writer: Mutex<()>,
}

impl ConfigStore {
    /// Load `path`, or create it with defaults when it does not exist.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, Error> {
        let path = path.into();

        let config = if tokio::fs::try_exists(&path).await? {
            let config = load(&path).await?;
            info!(
                path = %path.display(),
                stocks = config.stocks.len(),
                "loaded config"
            );
            config
        } else {
            let config = MonitorConfig::default();
            save(&path, &config).await?;
            info!(path = %path.display(), "created default config");
            config
        };

        Ok(Self {
            path,
            current: RwLock::new(Arc::new(config)),
            writer: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current config snapshot.
    pub async fn current(&self) -> Arc<MonitorConfig> {
        self.current.read().await.clone()
    }

    /// Re-read the file and publish it if it differs from the current config.
    ///
    /// Returns true when a newer document was published.
    pub async fn reload(&self) -> Result<bool, Error> {
        let _guard = self.writer.lock().await;
        self.reload_locked().await
    }

    async fn reload_locked(&self) -> Result<bool, Error> {
        let on_disk = load(&self.path).await?;
        if on_disk == **self.current.read().await {
            return Ok(false);
        }

        info!(
            path = %self.path.display(),
            stocks = on_disk.stocks.len(),
            interval_minutes = on_disk.scan_interval_minutes,
            "config changed on disk"
        );
        *self.current.write().await = Arc::new(on_disk);
        Ok(true)
    }

    /// Apply `change` to a copy of the config, persist it and publish it.
    ///
    /// Nothing is published when `change` or the save fails.
    pub async fn update<T>(
        &self,
        change: impl FnOnce(&mut MonitorConfig) -> Result<T, ConfigError>,
    ) -> Result<T, Error> {
        let _guard = self.writer.lock().await;
        if let Err(e) = self.reload_locked().await {
            warn!(error = ?e, "config file unreadable, updating in-memory copy");
        }

        let mut next = MonitorConfig::clone(&*self.current().await);
        let out = change(&mut next)?;
        next.normalize();
        next.validate()?;

        save(&self.path, &next).await?;
        *self.current.write().await = Arc::new(next);

        Ok(out)
    }

    /// Replace the whole watchlist; returns the number of symbols kept.
    pub async fn set_stocks(&self, symbols: Vec<String>) -> Result<usize, Error> {
        self.update(|config| {
            config.stocks = symbols;
            config.normalize();
            Ok(config.stocks.len())
        })
        .await
    }

    /// Add a stock symbol
    /// Returns true if it was newly added
    pub async fn add(&self, symbol: &str) -> Result<bool, Error> {
        let symbol = normalize_symbol(symbol);
        if symbol.is_empty() {
            return Err(ConfigError::EmptyTicker.into());
        }

        self.update(|config| {
            if config.stocks.contains(&symbol) {
                return Ok(false);
            }
            config.stocks.push(symbol);
            Ok(true)
        })
        .await
    }

    /// Remove a stock symbol
    /// Returns true if it existed
    pub async fn remove(&self, symbol: &str) -> Result<bool, Error> {
        let symbol = normalize_symbol(symbol);

        self.update(|config| {
            let before = config.stocks.len();
            config.stocks.retain(|s| *s != symbol);
            Ok(config.stocks.len() != before)
        })
        .await
    }

    /// Get all symbols
    pub async fn list(&self) -> Vec<String> {
        self.current().await.stocks.clone()
    }

    pub async fn update_settings(&self, update: SettingsUpdate) -> Result<(), Error> {
        self.update(|config| {
            config.apply(update);
            Ok(())
        })
        .await
    }

    pub async fn theses(&self) -> Vec<ThesisEntry> {
        self.current().await.thesis_entries.clone()
    }

    pub async fn add_thesis(&self, draft: ThesisDraft) -> Result<ThesisEntry, Error> {
        self.update(|config| thesis::add(&mut config.thesis_entries, draft, Local::now()))
            .await
    }

    pub async fn update_thesis(&self, index: usize, draft: ThesisDraft) -> Result<ThesisEntry, Error> {
        self.update(|config| thesis::update(&mut config.thesis_entries, index, draft))
            .await
    }

    pub async fn delete_thesis(&self, index: usize) -> Result<ThesisEntry, Error> {
        self.update(|config| thesis::remove(&mut config.thesis_entries, index))
            .await
    }
}
