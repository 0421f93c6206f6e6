pub mod types;
pub mod unsupported;

#[cfg(target_os = "linux")]
pub mod linux;

#[cfg(target_os = "macos")]
pub mod macos;

use std::sync::Arc;
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};

pub use types::DesktopBackend;
pub use unsupported::UnsupportedBackend;

/// Picks the desktop backend for this machine. Falls back to
/// [`UnsupportedBackend`] when the native one cannot start (no X server).
#[cfg(target_os = "linux")]
pub fn native_backend() -> Arc<dyn DesktopBackend> {
    match linux::X11Backend::connect() {
        Ok(backend) => Arc::new(backend),
        Err(err) => {
            log::warn!("X11 backend unavailable ({err}); focus auto-save disabled");
            Arc::new(UnsupportedBackend::new())
        }
    }
}

#[cfg(target_os = "macos")]
pub fn native_backend() -> Arc<dyn DesktopBackend> {
    Arc::new(macos::MacOSBackend::new())
}

#[cfg(not(any(target_os = "linux", target_os = "macos")))]
pub fn native_backend() -> Arc<dyn DesktopBackend> {
    Arc::new(UnsupportedBackend::new())
}

/// Resolves a pid to its executable name via `sysinfo`.
#[cfg_attr(not(any(target_os = "linux", target_os = "macos")), allow(dead_code))]
pub(crate) fn process_name_for_pid(pid: u32) -> Option<String> {
    let pid = Pid::from_u32(pid);
    let mut system = System::new();
    system.refresh_processes_specifics(ProcessesToUpdate::Some(&[pid]), ProcessRefreshKind::new());
    system
        .process(pid)
        .map(|process| process.name().to_string_lossy().into_owned())
        .filter(|name| !name.is_empty())
}

/// Pids of every process whose name matches `program`.
#[cfg_attr(not(any(target_os = "linux", target_os = "macos")), allow(dead_code))]
pub(crate) fn pids_for_program(program: &str) -> Vec<u32> {
    let mut system = System::new();
    system.refresh_processes_specifics(ProcessesToUpdate::All, ProcessRefreshKind::new());
    system
        .processes()
        .iter()
        .filter(|(_, process)| crate::models::names_match(&process.name().to_string_lossy(), program))
        .map(|(pid, _)| pid.as_u32())
        .collect()
}
