//! System-backed input capture over the X11 protocol.
//!
//! Grabs pointer and keyboard on the root window and reads key-press events
//! off the wire, translating keycodes through the server's keyboard mapping.
//! There is no fallback path: when the display cannot be opened or a grab is
//! refused, `acquire` fails and the caller aborts.

pub mod keymap;

use log::debug;

use vigil_core::error::{VigilError, VigilResult};
use vigil_provider::display::{DisplayServer, InputCapture, KeyPress};

use x11rb::connection::Connection;
use x11rb::protocol::xproto::{
    ChangeWindowAttributesAux, ConnectionExt as _, EventMask, GrabMode, GrabStatus, KeyButMask,
    Window,
};
use x11rb::protocol::Event;
use x11rb::rust_connection::RustConnection;

use crate::keymap::KeyboardMap;

/// Factory for X11-backed input capture, honouring `$DISPLAY`.
#[derive(Debug, Clone, Copy, Default)]
pub struct X11DisplayServer;

impl X11DisplayServer {
    pub fn new() -> Self {
        Self
    }
}

impl DisplayServer for X11DisplayServer {
    type Error = VigilError;
    type Capture = X11InputCapture;

    fn acquire(&self) -> VigilResult<X11InputCapture> {
        X11InputCapture::open()
    }
}

/// Live display connection holding exclusive pointer and keyboard grabs.
pub struct X11InputCapture {
    conn: RustConnection,
    root: Window,
    keymap: KeyboardMap,
    released: bool,
}

impl X11InputCapture {
    fn open() -> VigilResult<Self> {
        let (conn, screen_num) = x11rb::connect(None)
            .map_err(|err| VigilError::Capture(format!("could not open display: {err}")))?;

        let setup = conn.setup();
        let root = setup.roots[screen_num].root;
        let min_keycode = setup.min_keycode;
        let max_keycode = setup.max_keycode;

        let mapping = conn
            .get_keyboard_mapping(min_keycode, max_keycode - min_keycode + 1)
            .map_err(|err| capture_error("keyboard mapping request", err))?
            .reply()
            .map_err(|err| capture_error("keyboard mapping reply", err))?;
        let keymap = KeyboardMap::new(min_keycode, mapping.keysyms_per_keycode, mapping.keysyms);

        debug!("grabbing pointer and keyboard on root window {root}");
        let pointer = conn
            .grab_pointer(
                true,
                root,
                EventMask::BUTTON_PRESS,
                GrabMode::ASYNC,
                GrabMode::ASYNC,
                x11rb::NONE,
                x11rb::NONE,
                x11rb::CURRENT_TIME,
            )
            .map_err(|err| capture_error("pointer grab request", err))?
            .reply()
            .map_err(|err| capture_error("pointer grab reply", err))?;
        if pointer.status != GrabStatus::SUCCESS {
            return Err(VigilError::Capture(format!(
                "server refused the pointer grab ({:?})",
                pointer.status
            )));
        }

        let keyboard = conn
            .grab_keyboard(
                false,
                root,
                x11rb::CURRENT_TIME,
                GrabMode::ASYNC,
                GrabMode::ASYNC,
            )
            .map_err(|err| capture_error("keyboard grab request", err))?
            .reply()
            .map_err(|err| capture_error("keyboard grab reply", err))?;
        if keyboard.status != GrabStatus::SUCCESS {
            let _ = conn.ungrab_pointer(x11rb::CURRENT_TIME);
            let _ = conn.flush();
            return Err(VigilError::Capture(format!(
                "server refused the keyboard grab ({:?})",
                keyboard.status
            )));
        }

        conn.change_window_attributes(
            root,
            &ChangeWindowAttributesAux::new().event_mask(EventMask::KEY_PRESS),
        )
        .map_err(|err| capture_error("key-press selection request", err))?
        .check()
        .map_err(|err| capture_error("key-press selection", err))?;
        conn.flush()
            .map_err(|err| capture_error("connection flush", err))?;

        Ok(Self {
            conn,
            root,
            keymap,
            released: false,
        })
    }

    fn teardown(&self) -> VigilResult<()> {
        debug!("releasing grabs on root window {}", self.root);
        self.conn
            .ungrab_keyboard(x11rb::CURRENT_TIME)
            .map_err(|err| capture_error("keyboard ungrab", err))?;
        self.conn
            .ungrab_pointer(x11rb::CURRENT_TIME)
            .map_err(|err| capture_error("pointer ungrab", err))?;
        self.conn
            .flush()
            .map_err(|err| capture_error("connection flush", err))?;
        // The connection itself closes when this handle is dropped.
        Ok(())
    }
}

impl InputCapture for X11InputCapture {
    type Error = VigilError;

    fn next_key(&mut self) -> VigilResult<KeyPress> {
        loop {
            let event = self
                .conn
                .wait_for_event()
                .map_err(|err| capture_error("event wait", err))?;

            // Everything except a key-press (pointer noise, mapping
            // notifications, the grab's own side effects) is consumed here.
            let press = match event {
                Event::KeyPress(press) => press,
                _ => continue,
            };

            let shifted = u16::from(press.state) & u16::from(KeyButMask::SHIFT) != 0;
            let Some(keysym) = self.keymap.lookup(press.detail, shifted) else {
                continue;
            };

            if keymap::is_submission(keysym) {
                return Ok(KeyPress::submit());
            }
            if let Some(ch) = keymap::text_for_keysym(keysym) {
                return Ok(KeyPress::text(ch.to_string()));
            }
        }
    }

    fn release(mut self) -> VigilResult<()> {
        self.released = true;
        self.teardown()
    }
}

impl Drop for X11InputCapture {
    fn drop(&mut self) {
        // Backstop for error propagation paths that never reach `release`.
        if !self.released {
            let _ = self.teardown();
        }
    }
}

fn capture_error(context: &str, err: impl std::fmt::Display) -> VigilError {
    VigilError::Capture(format!("{context} failed: {err}"))
}
