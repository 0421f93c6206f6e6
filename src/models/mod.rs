pub mod catalog;
pub mod history;
pub mod program;

pub use history::{HistoryEntry, ReminderKind};
pub use program::{names_match, Category, TargetList, TargetProgram};
