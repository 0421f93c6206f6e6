use crate::error::PlatformError;

use super::DesktopBackend;

/// Stand-in for platforms (or sessions) without focus and input APIs.
#[derive(Debug, Default)]
pub struct UnsupportedBackend;

impl UnsupportedBackend {
    pub fn new() -> Self {
        Self
    }
}

impl DesktopBackend for UnsupportedBackend {
    fn foreground_process_name(&self) -> Result<Option<String>, PlatformError> {
        Err(PlatformError::Unsupported {
            capability: "foreground window detection",
        })
    }

    fn simulate_save_keystroke(&self) -> Result<(), PlatformError> {
        Err(PlatformError::Unsupported {
            capability: "keystroke simulation",
        })
    }

    fn switch_focus_to(&self, _program: &str) -> Result<bool, PlatformError> {
        Err(PlatformError::Unsupported {
            capability: "window switching",
        })
    }

    fn name(&self) -> &'static str {
        "unsupported"
    }
}
