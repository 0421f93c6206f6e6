use core_graphics::event::{CGEvent, CGEventFlags, CGEventTapLocation, CGKeyCode};
use core_graphics::event_source::{CGEventSource, CGEventSourceStateID};
use objc2_app_kit::{NSApplicationActivationOptions, NSRunningApplication, NSWorkspace};

use crate::error::PlatformError;

use super::{pids_for_program, process_name_for_pid, DesktopBackend};

/// kVK_ANSI_S
const KEY_S: CGKeyCode = 1;

/// NSWorkspace for focus, Quartz events for Cmd+S.
///
/// Key events are dropped silently by the OS unless the app has the
/// Accessibility permission.
#[derive(Debug, Default)]
pub struct MacOSBackend;

impl MacOSBackend {
    pub fn new() -> Self {
        Self
    }

    fn post_key(source: &CGEventSource, keydown: bool) -> Result<(), PlatformError> {
        let event = CGEvent::new_keyboard_event(source.clone(), KEY_S, keydown)
            .map_err(|_| PlatformError::Input("could not create keyboard event".into()))?;
        event.set_flags(CGEventFlags::CGEventFlagCommand);
        event.post(CGEventTapLocation::HID);
        Ok(())
    }
}

impl DesktopBackend for MacOSBackend {
    fn foreground_process_name(&self) -> Result<Option<String>, PlatformError> {
        let pid = unsafe {
            let workspace = NSWorkspace::sharedWorkspace();
            workspace
                .frontmostApplication()
                .map(|app| app.processIdentifier())
        };

        Ok(pid
            .and_then(|pid| u32::try_from(pid).ok())
            .and_then(process_name_for_pid))
    }

    fn simulate_save_keystroke(&self) -> Result<(), PlatformError> {
        let source = CGEventSource::new(CGEventSourceStateID::HIDSystemState).map_err(|_| {
            PlatformError::Unsupported {
                capability: "Quartz event source",
            }
        })?;
        Self::post_key(&source, true)?;
        Self::post_key(&source, false)
    }

    fn switch_focus_to(&self, program: &str) -> Result<bool, PlatformError> {
        for pid in pids_for_program(program) {
            let Ok(pid) = i32::try_from(pid) else {
                continue;
            };
            let activated = unsafe {
                NSRunningApplication::runningApplicationWithProcessIdentifier(pid).map(|app| {
                    app.activateWithOptions(
                        NSApplicationActivationOptions::NSApplicationActivateIgnoringOtherApps,
                    )
                })
            };
            if activated == Some(true) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn name(&self) -> &'static str {
        "macos"
    }
}
