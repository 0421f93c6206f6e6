use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::time::{Duration, Instant};

use crate::config::FrequencyMode;

use super::state::{ReminderEntry, ReminderStatus};

const MIN_INTERVAL: Duration = Duration::from_secs(1);

/// One reminder that came due.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DueReminder {
    pub program: String,
    pub pid: u32,
    /// 1 for the first reminder of this instance, 2 for the second, ...
    pub fire_index: u32,
}

/// Per-program reminder timers driven by watcher events and a clock.
///
/// The scheduler owns no timers of its own: the caller passes `now` and
/// polls [`ReminderScheduler::take_due`] on its own cadence, so the fire
/// times stay on the `start + k * interval` grid regardless of tick jitter.
#[derive(Debug)]
pub struct ReminderScheduler {
    entries: HashMap<String, ReminderEntry>,
    interval: Duration,
    frequency: FrequencyMode,
}

impl ReminderScheduler {
    pub fn new(interval: Duration, frequency: FrequencyMode) -> Self {
        Self {
            entries: HashMap::new(),
            interval: interval.max(MIN_INTERVAL),
            frequency,
        }
    }

    /// Arms a reminder for a newly started program. Returns false when the
    /// program is already tracked.
    pub fn on_started(
        &mut self,
        program: &str,
        pid: u32,
        started_at: DateTime<Utc>,
        now: Instant,
    ) -> bool {
        if self.entries.contains_key(program) {
            return false;
        }
        self.entries.insert(
            program.to_string(),
            ReminderEntry::armed(program.to_string(), pid, started_at, now, self.interval),
        );
        true
    }

    /// Drops the program whatever state it is in.
    pub fn on_stopped(&mut self, program: &str) -> Option<ReminderEntry> {
        self.entries.remove(program)
    }

    /// Fires every entry whose deadline has passed, sorted by program name.
    pub fn take_due(&mut self, now: Instant) -> Vec<DueReminder> {
        let mut due: Vec<DueReminder> = Vec::new();
        for entry in self.entries.values_mut() {
            if !entry.is_due(now) {
                continue;
            }
            match self.frequency {
                FrequencyMode::Repeat => entry.rearm(now, self.interval),
                FrequencyMode::Once => entry.fire_once(),
            }
            due.push(DueReminder {
                program: entry.program.clone(),
                pid: entry.pid,
                fire_index: entry.fires,
            });
        }
        due.sort_by(|a, b| a.program.cmp(&b.program));
        due
    }

    /// Earliest armed deadline, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.entries.values().filter_map(ReminderEntry::deadline).min()
    }

    pub fn is_tracking(&self, program: &str) -> bool {
        self.entries.contains_key(program)
    }

    pub fn status(&self, program: &str) -> Option<ReminderStatus> {
        self.entries.get(program).map(|e| e.status)
    }

    pub fn entry(&self, program: &str) -> Option<&ReminderEntry> {
        self.entries.get(program)
    }

    /// Tracked programs, sorted.
    pub fn programs(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const I: Duration = Duration::from_secs(10);

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    /// Steps a 250ms clock from `from` to `to` and records fire times in
    /// whole seconds after `t0`.
    fn run(
        sched: &mut ReminderScheduler,
        t0: Instant,
        from: Duration,
        to: Duration,
    ) -> Vec<(u64, String)> {
        let step = Duration::from_millis(250);
        let mut fired = Vec::new();
        let mut at = from;
        while at <= to {
            for due in sched.take_due(t0 + at) {
                fired.push((at.as_secs(), due.program));
            }
            at += step;
        }
        fired
    }

    #[test]
    fn test_repeat_fires_on_interval_grid() {
        let t0 = Instant::now();
        let mut sched = ReminderScheduler::new(I, FrequencyMode::Repeat);
        assert!(sched.on_started("editor.exe", 1, Utc::now(), t0));

        let fired = run(&mut sched, t0, Duration::ZERO, secs(35));
        let times: Vec<u64> = fired.iter().map(|(t, _)| *t).collect();
        assert_eq!(times, vec![10, 20, 30]);
        assert_eq!(sched.entry("editor.exe").map(|e| e.fires), Some(3));
    }

    #[test]
    fn test_once_fires_exactly_once() {
        let t0 = Instant::now();
        let mut sched = ReminderScheduler::new(I, FrequencyMode::Once);
        sched.on_started("editor.exe", 1, Utc::now(), t0);

        let fired = run(&mut sched, t0, Duration::ZERO, secs(120));
        assert_eq!(fired.len(), 1);
        assert_eq!(sched.status("editor.exe"), Some(ReminderStatus::Fired));
        assert_eq!(sched.next_deadline(), None);
    }

    #[test]
    fn test_stop_cancels_pending_fire() {
        // editor.exe seen at t=0, fires at 10s, stops at 15s; nothing at 20s.
        let t0 = Instant::now();
        let mut sched = ReminderScheduler::new(I, FrequencyMode::Repeat);
        sched.on_started("editor.exe", 1, Utc::now(), t0);

        let before = run(&mut sched, t0, Duration::ZERO, secs(15));
        assert_eq!(before, vec![(10, "editor.exe".to_string())]);

        assert!(sched.on_stopped("editor.exe").is_some());
        assert!(!sched.is_tracking("editor.exe"));

        let after = run(&mut sched, t0, secs(15), secs(25));
        assert!(after.is_empty());
    }

    #[test]
    fn test_duplicate_start_is_ignored_and_restart_rearms() {
        let t0 = Instant::now();
        let mut sched = ReminderScheduler::new(I, FrequencyMode::Once);
        assert!(sched.on_started("code", 1, Utc::now(), t0));
        assert!(!sched.on_started("code", 2, Utc::now(), t0 + secs(5)));
        assert_eq!(sched.take_due(t0 + secs(10)).len(), 1);

        sched.on_stopped("code");
        assert!(sched.on_started("code", 3, Utc::now(), t0 + secs(12)));
        assert!(sched.take_due(t0 + secs(21)).is_empty());
        let due = sched.take_due(t0 + secs(22));
        assert_eq!(due.first().map(|d| (d.pid, d.fire_index)), Some((3, 1)));
    }

    #[test]
    fn test_lagging_clock_skips_missed_deadlines() {
        let t0 = Instant::now();
        let mut sched = ReminderScheduler::new(I, FrequencyMode::Repeat);
        sched.on_started("figma", 1, Utc::now(), t0);

        assert_eq!(sched.take_due(t0 + secs(35)).len(), 1);
        assert_eq!(sched.next_deadline(), Some(t0 + secs(40)));
    }

    #[test]
    fn test_zero_interval_is_clamped() {
        let sched = ReminderScheduler::new(Duration::ZERO, FrequencyMode::Repeat);
        assert_eq!(sched.interval(), MIN_INTERVAL);
    }
}
