pub mod controller;
pub mod hourly;
pub mod state;

pub use controller::{DueReminder, ReminderScheduler};
pub use hourly::HourlyReminder;
pub use state::{ReminderEntry, ReminderStatus};
