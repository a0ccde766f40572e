use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::config::normalize_symbol;
use crate::error::ConfigError;

pub const CREATED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A note on why a ticker is interesting and what would make it actionable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThesisEntry {
    pub ticker: String,
    #[serde(default)]
    pub thesis: String,
    #[serde(default)]
    pub trigger: String,
    #[serde(default)]
    pub created_at: String,
}

/// User input for creating or editing an entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThesisDraft {
    pub ticker: String,
    pub thesis: String,
    pub trigger: String,
}

impl ThesisDraft {
    pub fn new(
        ticker: impl Into<String>,
        thesis: impl Into<String>,
        trigger: impl Into<String>,
    ) -> Self {
        Self {
            ticker: ticker.into(),
            thesis: thesis.into(),
            trigger: trigger.into(),
        }
    }

    fn normalized(self) -> Result<Self, ConfigError> {
        let ticker = normalize_symbol(&self.ticker);
        if ticker.is_empty() {
            return Err(ConfigError::EmptyTicker);
        }
        Ok(Self {
            ticker,
            thesis: self.thesis.trim().to_string(),
            trigger: self.trigger.trim().to_string(),
        })
    }
}

/// Append a new entry stamped with `now`.
pub fn add(
    entries: &mut Vec<ThesisEntry>,
    draft: ThesisDraft,
    now: DateTime<Local>,
) -> Result<ThesisEntry, ConfigError> {
    let draft = draft.normalized()?;
    let entry = ThesisEntry {
        ticker: draft.ticker,
        thesis: draft.thesis,
        trigger: draft.trigger,
        created_at: now.format(CREATED_AT_FORMAT).to_string(),
    };
    entries.push(entry.clone());
    Ok(entry)
}

/// Replace ticker, thesis and trigger of the entry at `index`; `created_at` is kept.
pub fn update(
    entries: &mut [ThesisEntry],
    index: usize,
    draft: ThesisDraft,
) -> Result<ThesisEntry, ConfigError> {
    let draft = draft.normalized()?;
    let len = entries.len();
    let entry = entries
        .get_mut(index)
        .ok_or(ConfigError::IndexOutOfRange { index, len })?;

    entry.ticker = draft.ticker;
    entry.thesis = draft.thesis;
    entry.trigger = draft.trigger;
    Ok(entry.clone())
}

pub fn remove(entries: &mut Vec<ThesisEntry>, index: usize) -> Result<ThesisEntry, ConfigError> {
    if index >= entries.len() {
        return Err(ConfigError::IndexOutOfRange {
            index,
            len: entries.len(),
        });
    }
    Ok(entries.remove(index))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 6, 1, 9, 30, 0).unwrap()
    }

    #[test]
    fn add_normalizes_and_stamps() {
        let mut entries = Vec::new();
        let entry = add(
            &mut entries,
            ThesisDraft::new(" nvda ", " AI capex cycle ", "close below 50DMA "),
            now(),
        )
        .unwrap();

        assert_eq!(entry.ticker, "NVDA");
        assert_eq!(entry.thesis, "AI capex cycle");
        assert_eq!(entry.trigger, "close below 50DMA");
        assert_eq!(entry.created_at, "2024-06-01 09:30:00");
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn add_requires_ticker() {
        let mut entries = Vec::new();
        let err = add(&mut entries, ThesisDraft::new("  ", "x", "y"), now()).unwrap_err();
        assert_eq!(err, ConfigError::EmptyTicker);
        assert!(entries.is_empty());
    }

    #[test]
    fn duplicate_tickers_are_allowed() {
        let mut entries = Vec::new();
        add(&mut entries, ThesisDraft::new("AMD", "a", ""), now()).unwrap();
        add(&mut entries, ThesisDraft::new("amd", "b", ""), now()).unwrap();
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn update_keeps_created_at() {
        let mut entries = Vec::new();
        add(&mut entries, ThesisDraft::new("AMD", "a", ""), now()).unwrap();

        let updated = update(&mut entries, 0, ThesisDraft::new("intc", "b", "c")).unwrap();

        assert_eq!(updated.ticker, "INTC");
        assert_eq!(updated.created_at, "2024-06-01 09:30:00");
        assert_eq!(entries[0], updated);
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let mut entries = Vec::new();
        add(&mut entries, ThesisDraft::new("AMD", "a", ""), now()).unwrap();

        assert_eq!(
            update(&mut entries, 3, ThesisDraft::new("X", "", "")),
            Err(ConfigError::IndexOutOfRange { index: 3, len: 1 })
        );
        assert_eq!(
            remove(&mut entries, 1),
            Err(ConfigError::IndexOutOfRange { index: 1, len: 1 })
        );
    }

    #[test]
    fn remove_by_position() {
        let mut entries = Vec::new();
        add(&mut entries, ThesisDraft::new("AAA", "", ""), now()).unwrap();
        add(&mut entries, ThesisDraft::new("BBB", "", ""), now()).unwrap();
        add(&mut entries, ThesisDraft::new("CCC", "", ""), now()).unwrap();

        let removed = remove(&mut entries, 1).unwrap();

        assert_eq!(removed.ticker, "BBB");
        let left: Vec<&str> = entries.iter().map(|e| e.ticker.as_str()).collect();
        assert_eq!(left, vec!["AAA", "CCC"]);
    }
}
