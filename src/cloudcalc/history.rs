//! Bounded, newest-first log of successful calculations.
//!
//! Only successful evaluations (standard or AI) are ever recorded. Once the
//! log holds [`HISTORY_CAPACITY`] entries, recording a new one evicts the
//! oldest.

use std::collections::VecDeque;

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Maximum number of entries retained by a [`HistoryLog`].
pub const HISTORY_CAPACITY: usize = 50;

/// One successful calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Input buffer as it was when evaluated.
    pub expression: String,
    /// Display string of the result.
    pub result: String,
    /// Wall-clock time of the evaluation in milliseconds since the Unix epoch.
    pub timestamp: i64,
    /// Whether the AI resolver produced the result.
    pub via_ai: bool,
}

impl HistoryEntry {
    /// Create an entry stamped with the current time.
    pub fn new(expression: impl Into<String>, result: impl Into<String>, via_ai: bool) -> Self {
        HistoryEntry {
            expression: expression.into(),
            result: result.into(),
            timestamp: Utc::now().timestamp_millis(),
            via_ai,
        }
    }
}

/// Newest-first sequence of [`HistoryEntry`] capped at [`HISTORY_CAPACITY`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryLog {
    entries: VecDeque<HistoryEntry>,
}

impl HistoryLog {
    pub fn new() -> Self {
        HistoryLog {
            entries: VecDeque::with_capacity(HISTORY_CAPACITY),
        }
    }

    /// Put `entry` at the front. Returns the evicted oldest entry when the log
    /// was already full.
    pub fn record(&mut self, entry: HistoryEntry) -> Option<HistoryEntry> {
        self.entries.push_front(entry);
        if self.entries.len() > HISTORY_CAPACITY {
            self.entries.pop_back()
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Most recent entry, if any.
    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.front()
    }

    /// Entry at `index`, where `0` is the newest.
    pub fn get(&self, index: usize) -> Option<&HistoryEntry> {
        self.entries.get(index)
    }

    /// Iterate newest to oldest.
    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    /// Owned copy of the entries, newest first.
    pub fn to_vec(&self) -> Vec<HistoryEntry> {
        self.entries.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_prepends() {
        let mut log = HistoryLog::new();
        log.record(HistoryEntry::new("1+1", "2", false));
        log.record(HistoryEntry::new("2+2", "4", false));
        assert_eq!(log.len(), 2);
        assert_eq!(log.latest().unwrap().expression, "2+2");
        assert_eq!(log.get(1).unwrap().expression, "1+1");
    }

    #[test]
    fn test_eviction_returns_oldest() {
        let mut log = HistoryLog::new();
        for i in 0..HISTORY_CAPACITY {
            assert!(log.record(HistoryEntry::new(i.to_string(), i.to_string(), false)).is_none());
        }
        let evicted = log.record(HistoryEntry::new("new", "1", true)).unwrap();
        assert_eq!(evicted.expression, "0");
        assert_eq!(log.len(), HISTORY_CAPACITY);
        assert_eq!(log.latest().unwrap().expression, "new");
    }

    #[test]
    fn test_clear() {
        let mut log = HistoryLog::new();
        log.record(HistoryEntry::new("1+1", "2", false));
        log.clear();
        assert!(log.is_empty());
        assert!(log.latest().is_none());
    }
}
