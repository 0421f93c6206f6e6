use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use crate::models::{HistoryEntry, ReminderKind};

use super::HistorySink;

pub const MAX_HISTORY_ENTRIES: usize = 100;

/// In-memory reminder history, oldest entries evicted first.
pub struct ReminderHistory {
    entries: Mutex<VecDeque<HistoryEntry>>,
    capacity: usize,
}

impl ReminderHistory {
    pub fn new() -> Self {
        Self::with_capacity(MAX_HISTORY_ENTRIES)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    /// Newest first.
    pub fn recent(&self, count: usize) -> Vec<HistoryEntry> {
        let guard = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        guard.iter().rev().take(count).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl Default for ReminderHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl HistorySink for ReminderHistory {
    fn record(&self, program: &str, kind: ReminderKind, timestamp: DateTime<Utc>) {
        let mut guard = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        guard.push_back(HistoryEntry {
            program: program.to_string(),
            kind,
            timestamp,
        });
        while guard.len() > self.capacity {
            guard.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_history_evicts_oldest_past_capacity() {
        let history = ReminderHistory::new();
        let start = Utc::now();
        for i in 0..105 {
            history.record(
                &format!("app{i}"),
                ReminderKind::Save,
                start + Duration::seconds(i),
            );
        }

        assert_eq!(history.len(), MAX_HISTORY_ENTRIES);
        let recent = history.recent(MAX_HISTORY_ENTRIES);
        assert_eq!(recent.first().map(|e| e.program.as_str()), Some("app104"));
        assert_eq!(recent.last().map(|e| e.program.as_str()), Some("app5"));
    }

    #[test]
    fn test_recent_limits_and_orders() {
        let history = ReminderHistory::with_capacity(3);
        let now = Utc::now();
        history.record("a", ReminderKind::Save, now);
        history.record("System", ReminderKind::Hourly, now);
        history.record("a", ReminderKind::AutoSave, now);

        let kinds: Vec<_> = history.recent(2).into_iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![ReminderKind::AutoSave, ReminderKind::Hourly]);

        history.clear();
        assert!(history.is_empty());
    }
}
