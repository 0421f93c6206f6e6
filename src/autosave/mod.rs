pub mod correlator;
pub mod pending;

pub use correlator::{FocusCorrelator, FocusOutcome, SaveOutcome, FOCUS_SETTLE};
pub use pending::PendingSaveSet;
