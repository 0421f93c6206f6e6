use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ReminderStatus {
    /// Waiting for the deadline.
    Armed,
    /// Fired in "once" mode; stays here until the program stops.
    Fired,
}

/// Reminder bookkeeping for one running program.
#[derive(Debug, Clone)]
pub struct ReminderEntry {
    pub program: String,
    pub pid: u32,
    pub started_at: DateTime<Utc>,
    pub status: ReminderStatus,
    pub fires: u32,
    deadline: Option<Instant>,
}

impl ReminderEntry {
    pub fn armed(
        program: String,
        pid: u32,
        started_at: DateTime<Utc>,
        now: Instant,
        interval: Duration,
    ) -> Self {
        Self {
            program,
            pid,
            started_at,
            status: ReminderStatus::Armed,
            fires: 0,
            deadline: Some(now + interval),
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.status == ReminderStatus::Armed && self.deadline.is_some_and(|d| d <= now)
    }

    /// Marks a fire and moves to the next deadline on the original grid
    /// (start + k * interval). Deadlines missed while the loop lagged are
    /// skipped rather than fired in a burst.
    pub fn rearm(&mut self, now: Instant, interval: Duration) {
        self.fires = self.fires.saturating_add(1);
        let mut next = self.deadline.unwrap_or(now) + interval;
        while next <= now {
            next += interval;
        }
        self.deadline = Some(next);
        self.status = ReminderStatus::Armed;
    }

    pub fn fire_once(&mut self) {
        self.fires = self.fires.saturating_add(1);
        self.deadline = None;
        self.status = ReminderStatus::Fired;
    }
}
