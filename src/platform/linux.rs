use std::collections::HashSet;
use std::fmt::Display;

use x11rb::connection::{Connection, RequestConnection};
use x11rb::protocol::xproto::{
    AtomEnum, ClientMessageEvent, ConnectionExt, EventMask, Window, KEY_PRESS_EVENT,
    KEY_RELEASE_EVENT,
};
use x11rb::protocol::xtest::{self, ConnectionExt as XTestExt};
use x11rb::rust_connection::RustConnection;

use crate::error::PlatformError;

use super::{pids_for_program, process_name_for_pid, DesktopBackend};

const XK_CONTROL_L: u32 = 0xffe3;
const XK_LOWER_S: u32 = 0x0073;

/// `_NET_ACTIVE_WINDOW` source indication for pagers and taskbars, which
/// window managers honour more readily than application requests.
const SOURCE_PAGER: u32 = 2;

struct Atoms {
    net_active_window: u32,
    net_wm_pid: u32,
    net_client_list: u32,
}

/// EWMH focus queries plus XTEST key injection.
pub struct X11Backend {
    conn: RustConnection,
    root: Window,
    atoms: Atoms,
}

fn query_err(err: impl Display) -> PlatformError {
    PlatformError::Query(err.to_string())
}

fn input_err(err: impl Display) -> PlatformError {
    PlatformError::Input(err.to_string())
}

impl X11Backend {
    pub fn connect() -> Result<Self, PlatformError> {
        let (conn, screen_num) =
            x11rb::connect(None).map_err(|err| PlatformError::Connection(err.to_string()))?;
        let root = conn
            .setup()
            .roots
            .get(screen_num)
            .map(|screen| screen.root)
            .ok_or_else(|| PlatformError::Connection(format!("screen {screen_num} not found")))?;

        let atoms = Atoms {
            net_active_window: intern(&conn, "_NET_ACTIVE_WINDOW")?,
            net_wm_pid: intern(&conn, "_NET_WM_PID")?,
            net_client_list: intern(&conn, "_NET_CLIENT_LIST")?,
        };

        Ok(Self { conn, root, atoms })
    }

    fn property_u32(
        &self,
        window: Window,
        property: u32,
        kind: AtomEnum,
    ) -> Result<Option<u32>, PlatformError> {
        let reply = self
            .conn
            .get_property(false, window, property, kind, 0, 1)
            .map_err(query_err)?
            .reply()
            .map_err(query_err)?;
        Ok(reply.value32().and_then(|mut values| values.next()))
    }

    fn client_windows(&self) -> Result<Vec<Window>, PlatformError> {
        let reply = self
            .conn
            .get_property(
                false,
                self.root,
                self.atoms.net_client_list,
                AtomEnum::WINDOW,
                0,
                4096,
            )
            .map_err(query_err)?
            .reply()
            .map_err(query_err)?;
        Ok(reply
            .value32()
            .map(|values| values.collect())
            .unwrap_or_default())
    }

    fn activate(&self, window: Window) -> Result<(), PlatformError> {
        let event = ClientMessageEvent::new(
            32,
            window,
            self.atoms.net_active_window,
            [SOURCE_PAGER, x11rb::CURRENT_TIME, 0, 0, 0],
        );
        self.conn
            .send_event(
                false,
                self.root,
                EventMask::SUBSTRUCTURE_REDIRECT | EventMask::SUBSTRUCTURE_NOTIFY,
                event,
            )
            .map_err(query_err)?;
        self.conn.flush().map_err(query_err)
    }

    fn keycode_for(&self, keysym: u32) -> Result<Option<u8>, PlatformError> {
        let setup = self.conn.setup();
        let min = setup.min_keycode;
        let count = setup.max_keycode.saturating_sub(min).saturating_add(1);
        let mapping = self
            .conn
            .get_keyboard_mapping(min, count)
            .map_err(query_err)?
            .reply()
            .map_err(query_err)?;

        let per_keycode = usize::from(mapping.keysyms_per_keycode);
        if per_keycode == 0 {
            return Ok(None);
        }
        Ok(mapping
            .keysyms
            .chunks(per_keycode)
            .position(|syms| syms.contains(&keysym))
            .and_then(|offset| u8::try_from(offset).ok())
            .map(|offset| min.saturating_add(offset)))
    }
}

fn intern(conn: &RustConnection, name: &str) -> Result<u32, PlatformError> {
    conn.intern_atom(false, name.as_bytes())
        .map_err(|err| PlatformError::Connection(err.to_string()))?
        .reply()
        .map(|reply| reply.atom)
        .map_err(|err| PlatformError::Connection(err.to_string()))
}

impl DesktopBackend for X11Backend {
    fn foreground_process_name(&self) -> Result<Option<String>, PlatformError> {
        let Some(window) =
            self.property_u32(self.root, self.atoms.net_active_window, AtomEnum::WINDOW)?
        else {
            return Ok(None);
        };
        if window == x11rb::NONE {
            return Ok(None);
        }

        let Some(pid) = self.property_u32(window, self.atoms.net_wm_pid, AtomEnum::CARDINAL)?
        else {
            return Ok(None);
        };
        Ok(process_name_for_pid(pid))
    }

    fn simulate_save_keystroke(&self) -> Result<(), PlatformError> {
        if self
            .conn
            .extension_information(xtest::X11_EXTENSION_NAME)
            .map_err(query_err)?
            .is_none()
        {
            return Err(PlatformError::Unsupported {
                capability: "XTEST key injection",
            });
        }

        let control = self
            .keycode_for(XK_CONTROL_L)?
            .ok_or_else(|| PlatformError::Input("no keycode for Control_L".into()))?;
        let s = self
            .keycode_for(XK_LOWER_S)?
            .ok_or_else(|| PlatformError::Input("no keycode for 's'".into()))?;

        for (event_type, keycode) in [
            (KEY_PRESS_EVENT, control),
            (KEY_PRESS_EVENT, s),
            (KEY_RELEASE_EVENT, s),
            (KEY_RELEASE_EVENT, control),
        ] {
            self.conn
                .xtest_fake_input(event_type, keycode, x11rb::CURRENT_TIME, self.root, 0, 0, 0)
                .map_err(input_err)?;
        }
        self.conn.flush().map_err(input_err)
    }

    fn switch_focus_to(&self, program: &str) -> Result<bool, PlatformError> {
        let pids: HashSet<u32> = pids_for_program(program).into_iter().collect();
        if pids.is_empty() {
            return Ok(false);
        }

        for window in self.client_windows()? {
            // Windows can disappear between listing and lookup.
            let Ok(Some(pid)) = self.property_u32(window, self.atoms.net_wm_pid, AtomEnum::CARDINAL)
            else {
                continue;
            };
            if pids.contains(&pid) {
                self.activate(window)?;
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn name(&self) -> &'static str {
        "x11"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[ignore] // Requires X11 display
    fn test_foreground_process_name() {
        let backend = X11Backend::connect().unwrap();
        let name = backend.foreground_process_name().unwrap();
        log::info!("foreground: {name:?}");
    }
}
