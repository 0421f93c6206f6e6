use chrono::{NaiveDate, NaiveDateTime, Timelike};

/// Fires once per wall-clock hour.
///
/// The hour that is current when the reminder is created counts as already
/// seen, so the first fire happens at the next hour boundary. Midnight is
/// never announced.
#[derive(Debug, Clone)]
pub struct HourlyReminder {
    last_fired: (NaiveDate, u32),
}

impl HourlyReminder {
    pub fn starting_at(now: NaiveDateTime) -> Self {
        Self {
            last_fired: (now.date(), now.hour()),
        }
    }

    /// Returns the hour to announce if `now` is in an hour not yet fired.
    pub fn check(&mut self, now: NaiveDateTime) -> Option<u32> {
        let slot = (now.date(), now.hour());
        if slot == self.last_fired {
            return None;
        }
        self.last_fired = slot;
        (slot.1 > 0).then_some(slot.1)
    }
}
