//! X11 platform backend.
//!
//! Synthesis goes through the XTest extension; window and application state
//! through the EWMH root-window properties; editor state through the
//! clipboard fallback (X11 exposes no portable accessibility tree).
//!
//! Every facade call opens its own display connection and drops it on
//! return. That keeps calls self-contained -- there is no connection state
//! to poison -- and matches the keyboard-layout contract: the layout is
//! re-read from the server on every call.

mod clipboard;
mod editor;
mod input;
mod keymap;
mod winctl;

use x11rb::connection::Connection;
use x11rb::protocol::xproto::Window;
use x11rb::rust_connection::RustConnection;

use crate::config::DriverConfig;
use crate::driver::Driver;
use crate::error::DriverError;
use crate::key;
use crate::types::{EditorState, MouseButton, MouseLocation, WindowBounds};
use keymap::KeyMap;

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

pub(crate) struct X11Driver {
    config: DriverConfig,
}

impl X11Driver {
    /// Fails fast when no X session is reachable; individual calls would
    /// otherwise each report the same connection error.
    pub(crate) fn new(config: DriverConfig) -> Result<Self, DriverError> {
        if std::env::var_os("DISPLAY").map_or(true, |v| v.is_empty()) {
            return Err(DriverError::Unavailable(
                "DISPLAY is not set; no X11 session detected".into(),
            ));
        }
        Ok(X11Driver { config })
    }

    fn connect(&self) -> Result<(RustConnection, Window), DriverError> {
        let (conn, screen_num) = RustConnection::connect(None)
            .map_err(|e| DriverError::Unavailable(format!("X11 connect failed: {e}")))?;
        let root = conn.setup().roots[screen_num].root;
        Ok((conn, root))
    }
}

fn normalized(tokens: &[String]) -> Vec<String> {
    tokens.iter().map(|t| key::normalize(t)).collect()
}

/// Sticky entries that are not modifiers are dropped; holding a
/// non-modifier key across calls is never meaningful.
fn sticky_modifiers(tokens: &[String]) -> Vec<String> {
    tokens
        .iter()
        .map(|t| key::normalize(t))
        .filter(|t| key::is_modifier(t))
        .collect()
}

impl Driver for X11Driver {
    fn click(&self, button: MouseButton, count: i32) -> Result<(), DriverError> {
        if count < 1 {
            return Ok(());
        }
        let (conn, _root) = self.connect()?;
        input::click(&conn, button, count, &self.config.timing)
    }

    fn mouse_down(&self, button: MouseButton) -> Result<(), DriverError> {
        let (conn, _root) = self.connect()?;
        input::button_event(&conn, button, true, &self.config.timing)
    }

    fn mouse_up(&self, button: MouseButton) -> Result<(), DriverError> {
        let (conn, _root) = self.connect()?;
        input::button_event(&conn, button, false, &self.config.timing)
    }

    fn press_key(
        &self,
        key_token: &str,
        modifiers: &[String],
        sticky: &[String],
        count: i32,
    ) -> Result<(), DriverError> {
        if count < 1 {
            return Ok(());
        }
        let (conn, _root) = self.connect()?;
        let map = KeyMap::fetch(&conn)?;
        input::press_key(
            &conn,
            &map,
            &key::normalize(key_token),
            &normalized(modifiers),
            &sticky_modifiers(sticky),
            count,
            &self.config.timing,
        )
    }

    fn toggle_key(&self, key_token: &str, sticky: &[String], down: bool) -> Result<(), DriverError> {
        let (conn, _root) = self.connect()?;
        let map = KeyMap::fetch(&conn)?;
        input::toggle_key(
            &conn,
            &map,
            &key::normalize(key_token),
            &sticky_modifiers(sticky),
            down,
            &self.config.timing,
        )
    }

    fn type_text(&self, text: &str, sticky: &[String]) -> Result<(), DriverError> {
        let (conn, _root) = self.connect()?;
        let map = KeyMap::fetch(&conn)?;
        input::type_text(&conn, &map, text, &sticky_modifiers(sticky), &self.config.timing)
    }

    fn focus_application(&self, name: &str) -> Result<(), DriverError> {
        let (conn, root) = self.connect()?;
        winctl::focus_application(&conn, root, name)
    }

    fn active_application(&self) -> Result<String, DriverError> {
        let (conn, root) = self.connect()?;
        winctl::active_application(&conn, root)
    }

    fn active_window_bounds(&self) -> Result<WindowBounds, DriverError> {
        let (conn, root) = self.connect()?;
        winctl::active_window_bounds(&conn, root)
    }

    fn running_applications(&self) -> Result<Vec<String>, DriverError> {
        let (conn, root) = self.connect()?;
        winctl::running_applications(&conn, root)
    }

    fn mouse_location(&self) -> Result<MouseLocation, DriverError> {
        let (conn, root) = self.connect()?;
        let reply = x11rb::protocol::xproto::query_pointer(&conn, root)
            .map_err(|e| DriverError::Platform(format!("query_pointer: {e}")))?
            .reply()
            .map_err(|e| DriverError::Platform(format!("query_pointer reply: {e}")))?;
        Ok(MouseLocation {
            x: i32::from(reply.root_x),
            y: i32::from(reply.root_y),
        })
    }

    fn set_mouse_location(&self, x: i32, y: i32) -> Result<(), DriverError> {
        let (conn, root) = self.connect()?;
        x11rb::protocol::xproto::warp_pointer(&conn, x11rb::NONE, root, 0, 0, 0, 0, x as i16, y as i16)
            .map_err(|e| DriverError::Platform(format!("warp_pointer: {e}")))?;
        conn.flush()
            .map_err(|e| DriverError::Platform(format!("flush: {e}")))?;
        Ok(())
    }

    fn editor_state_fallback(&self, paragraph: bool) -> Result<EditorState, DriverError> {
        let (conn, root) = self.connect()?;
        let map = KeyMap::fetch(&conn)?;
        editor::editor_state_fallback(&conn, root, &map, paragraph, &self.config.timing)
    }
}
