use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReminderKind {
    /// Periodic "save your work" reminder for a running program.
    Save,
    /// Wall-clock hour reminder, no program attached.
    Hourly,
    /// A save keystroke was sent to the program.
    AutoSave,
}

impl ReminderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReminderKind::Save => "save",
            ReminderKind::Hourly => "hourly",
            ReminderKind::AutoSave => "auto_save",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryEntry {
    pub program: String,
    pub kind: ReminderKind,
    pub timestamp: DateTime<Utc>,
}
