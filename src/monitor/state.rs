use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::Duration;

use crate::autosave::PendingSaveSet;
use crate::config::FrequencyMode;
use crate::scheduler::ReminderScheduler;

/// State written by both the scheduler loop and the focus correlator.
/// Both live under one lock so "reminder fires and marks pending" and
/// "focus observed and pending cleared" never interleave.
#[derive(Debug)]
pub struct MonitorState {
    pub scheduler: ReminderScheduler,
    pub pending: PendingSaveSet,
}

pub type SharedState = Arc<Mutex<MonitorState>>;

impl MonitorState {
    pub fn new(interval: Duration, frequency: FrequencyMode) -> Self {
        Self {
            scheduler: ReminderScheduler::new(interval, frequency),
            pending: PendingSaveSet::new(),
        }
    }

    pub fn shared(interval: Duration, frequency: FrequencyMode) -> SharedState {
        Arc::new(Mutex::new(Self::new(interval, frequency)))
    }

    /// Forgets a stopped program: its timer and any pending save.
    pub fn forget(&mut self, program: &str) -> bool {
        let tracked = self.scheduler.on_stopped(program).is_some();
        self.pending.remove(program);
        tracked
    }

    pub fn clear(&mut self) {
        self.scheduler.clear();
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tokio::time::Instant;

    #[test]
    fn test_forget_drops_timer_and_pending_save() {
        let mut state = MonitorState::new(Duration::from_secs(10), FrequencyMode::Repeat);
        let now = Instant::now();
        state.scheduler.on_started("editor.exe", 7, Utc::now(), now);
        state.pending.insert("editor.exe");
        state.pending.insert("figma");

        assert!(state.forget("editor.exe"));
        assert!(!state.scheduler.is_tracking("editor.exe"));
        assert!(!state.pending.contains("editor.exe"));
        assert!(state.pending.contains("figma"));

        // A pending entry without a timer is still cleared.
        assert!(!state.forget("figma"));
        assert!(state.pending.is_empty());
    }
}
