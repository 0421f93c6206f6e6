use crate::error::PlatformError;

/// Desktop capabilities the focus correlator needs. One implementation per
/// platform, chosen at startup. Every call is a short blocking OS query.
pub trait DesktopBackend: Send + Sync {
    /// Executable name of the process owning the focused window, or `None`
    /// when nothing (or the desktop itself) has focus.
    fn foreground_process_name(&self) -> Result<Option<String>, PlatformError>;

    /// Sends the platform "save" shortcut to whichever window has focus.
    fn simulate_save_keystroke(&self) -> Result<(), PlatformError>;

    /// Raises a window of the named program. `Ok(false)` when no window
    /// belongs to it.
    fn switch_focus_to(&self, program: &str) -> Result<bool, PlatformError>;

    fn name(&self) -> &'static str;
}
