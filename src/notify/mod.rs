//! Seams to the collaborators the core talks to but does not own: the
//! notification surface, reminder history and localized text.

pub mod history;
pub mod i18n;
pub mod log_sink;
pub mod messages;
pub mod pump;

use chrono::{DateTime, Utc};
use std::time::Duration;

use crate::models::{Category, ReminderKind};

pub use history::ReminderHistory;
pub use i18n::Catalog;
pub use log_sink::LogNotifier;
pub use messages::MessageComposer;
pub use pump::{notice_channel, notification_pump, Notice, NoticeReceiver, NoticeSender};

/// A reminder bubble as handed to the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bubble {
    pub message: String,
    /// Display name of the program the bubble is about, if any.
    pub program: Option<String>,
    pub duration: Duration,
    /// Whether the bubble should offer an immediate "save now" action.
    pub offer_auto_save: bool,
}

/// Notification surface. Calls arrive from the notification pump task and
/// should hand off to the UI without waiting on the user.
pub trait Notifier: Send + Sync {
    fn show(&self, bubble: Bubble);

    fn warn(&self, message: &str);

    /// Audible cue accompanying a reminder when sound is enabled.
    fn chime(&self) {}
}

pub trait HistorySink: Send + Sync {
    fn record(&self, program: &str, kind: ReminderKind, timestamp: DateTime<Utc>);
}

pub trait Translator: Send + Sync {
    /// Looks up `key`, or `key.<category>` when a category is given.
    fn translate(&self, key: &str, category: Option<Category>) -> String;
}
