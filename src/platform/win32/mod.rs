//! Windows platform backend.
//!
//! Synthesis: `SendInput`. Window control: `EnumWindows` plus the
//! foreground-window APIs. Introspection: COM UI Automation behind a
//! process-wide once-initialized handle (the crate's only state that
//! outlives a call).

mod automation;
mod clipboard;
mod editor;
mod input;
mod keymap;
mod winctl;

use crate::config::DriverConfig;
use crate::driver::Driver;
use crate::error::DriverError;
use crate::key;
use crate::types::{EditorState, MouseButton, MouseLocation, WindowBounds};

pub(crate) struct WindowsDriver {
    config: DriverConfig,
}

impl WindowsDriver {
    pub(crate) fn new(config: DriverConfig) -> Self {
        WindowsDriver { config }
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

impl Driver for WindowsDriver {
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

    fn mouse_location(&self) -> Result<MouseLocation, DriverError> {
        winctl::mouse_location()
    }

    fn set_mouse_location(&self, x: i32, y: i32) -> Result<(), DriverError> {
        winctl::set_mouse_location(x, y)
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
