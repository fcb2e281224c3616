//! macOS platform backend.
//!
//! Synthesis: CGEvent at the HID tap. Introspection: the accessibility API
//! (AXUIElement), which requires the Accessibility permission under
//! System Settings > Privacy & Security; without it the editor-state reads
//! degrade to `unreadable` and the dialog detection is skipped, but
//! synthesis and window queries keep working.

mod ax;
mod editor;
mod input;
mod keymap;
mod pasteboard;
mod quirks;
mod winctl;

use crate::config::DriverConfig;
use crate::driver::Driver;
use crate::error::DriverError;
use crate::key;
use crate::types::{EditorState, MouseButton, MouseLocation, WindowBounds};

pub(crate) struct MacDriver {
    config: DriverConfig,
}

impl MacDriver {
    pub(crate) fn new(config: DriverConfig) -> Self {
        MacDriver { config }
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

impl Driver for MacDriver {
    fn click(&self, button: MouseButton, count: i32) -> Result<(), DriverError> {
        input::click(button, count, &self.config.timing)
    }

    fn mouse_down(&self, button: MouseButton) -> Result<(), DriverError> {
        input::button_event(button, true, &self.config.timing)
    }

    fn mouse_up(&self, button: MouseButton) -> Result<(), DriverError> {
        input::button_event(button, false, &self.config.timing)
    }

    fn press_key(
        &self,
        key_token: &str,
        modifiers: &[String],
        sticky: &[String],
        count: i32,
    ) -> Result<(), DriverError> {
        input::press_key(
            &key::normalize(key_token),
            &normalized(modifiers),
            &sticky_modifiers(sticky),
            count,
            &self.config.timing,
        )
    }

    fn toggle_key(&self, key_token: &str, sticky: &[String], down: bool) -> Result<(), DriverError> {
        input::toggle_key(
            &key::normalize(key_token),
            &sticky_modifiers(sticky),
            down,
            &self.config.timing,
        )
    }

    fn type_text(&self, text: &str, sticky: &[String]) -> Result<(), DriverError> {
        input::type_text(text, &sticky_modifiers(sticky), &self.config.timing)
    }

    fn focus_application(&self, name: &str) -> Result<(), DriverError> {
        winctl::focus_application(name)
    }

    fn active_application(&self) -> Result<String, DriverError> {
        winctl::active_application()
    }

    fn active_window_bounds(&self) -> Result<WindowBounds, DriverError> {
        winctl::active_window_bounds()
    }

    fn running_applications(&self) -> Result<Vec<String>, DriverError> {
        winctl::running_applications()
    }

    fn clickable_buttons(&self) -> Result<Vec<String>, DriverError> {
        editor::clickable_buttons()
    }

    fn click_button(&self, label: &str, count: i32) -> Result<(), DriverError> {
        if count < 1 {
            return Ok(());
        }
        editor::click_button(label, count)
    }

    fn mouse_location(&self) -> Result<MouseLocation, DriverError> {
        Ok(input::mouse_location())
    }

    fn set_mouse_location(&self, x: i32, y: i32) -> Result<(), DriverError> {
        input::set_mouse_location(x, y, &self.config.timing)
    }

    fn editor_state(&self) -> Result<EditorState, DriverError> {
        editor::editor_state()
    }

    fn editor_state_fallback(&self, paragraph: bool) -> Result<EditorState, DriverError> {
        editor::editor_state_fallback(paragraph, &self.config.timing)
    }

    fn set_editor_state(
        &self,
        text: &str,
        cursor_start: usize,
        cursor_end: Option<usize>,
    ) -> Result<(), DriverError> {
        editor::set_editor_state(text, cursor_start, cursor_end)
    }
}
