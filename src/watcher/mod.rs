pub mod diff;
pub mod loop_worker;
pub mod source;

pub use diff::{ProcessWatcher, RunningInstance, WatchEvent};
pub use loop_worker::watch_loop;
pub use source::{ProcessEntry, ProcessSource, SysinfoSource};
