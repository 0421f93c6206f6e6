pub mod controller;
mod loops;
pub mod state;

pub use controller::{Monitor, MonitorContext, Timing};
pub use state::{MonitorState, SharedState};
