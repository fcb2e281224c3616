//! The driver facade.
//!
//! One trait, three platform implementations selected at compile time. The
//! binding layer calls these methods from worker threads and surfaces its
//! own completion signal; methods here are plain synchronous calls.
//!
//! Error policy (see `error`): platform-limited operations resolve
//! successfully with a neutral result -- the trait encodes that with default
//! method bodies so each backend only overrides what its platform can
//! actually do. `Err` is reserved for transport-level failures.

use crate::config::DriverConfig;
use crate::error::DriverError;
use crate::platform;
use crate::types::{EditorState, MouseButton, MouseLocation, WindowBounds};

// ---------------------------------------------------------------------------
// Facade trait
// ---------------------------------------------------------------------------

pub trait Driver: Send {
    /// Presses and releases `button` `count` times at the current pointer
    /// location. `count < 1` is a no-op. Multi-click counts carry native
    /// click multiplicity where the platform has such a field (macOS).
    fn click(&self, button: MouseButton, count: i32) -> Result<(), DriverError>;

    fn mouse_down(&self, button: MouseButton) -> Result<(), DriverError>;

    fn mouse_up(&self, button: MouseButton) -> Result<(), DriverError>;

    /// Performs `count` full down+up presses of `key` with `modifiers` held
    /// around each press. Modifiers in `sticky` are pressed once up front
    /// and left held; releasing them is the caller's explicit
    /// [`Driver::toggle_key`]. `count < 1` is a no-op. Unresolvable keys are
    /// skipped silently.
    fn press_key(
        &self,
        key: &str,
        modifiers: &[String],
        sticky: &[String],
        count: i32,
    ) -> Result<(), DriverError>;

    /// Single down or up transition of `key`, including layout-required
    /// shift/altgr companions. Companions named in `sticky` are assumed
    /// already held and left untouched.
    fn toggle_key(&self, key: &str, sticky: &[String], down: bool) -> Result<(), DriverError>;

    /// Types `text` one character at a time as unmodified presses (sticky
    /// modifiers aside). Characters are iterated independently; compound
    /// glyphs built from several code points are typed as their parts.
    fn type_text(&self, text: &str, sticky: &[String]) -> Result<(), DriverError>;

    /// Raises the first window whose process identity contains `name`
    /// (case-insensitive, whitespace-stripped). A miss leaves the current
    /// foreground window unchanged and is not an error.
    fn focus_application(&self, name: &str) -> Result<(), DriverError>;

    /// Normalized identity of the foreground application, or the sentinel
    /// `"system dialog"` when a modal system dialog or sheet holds focus.
    fn active_application(&self) -> Result<String, DriverError>;

    /// Frame of the foreground window; zero bounds when there is none.
    fn active_window_bounds(&self) -> Result<WindowBounds, DriverError> {
        Ok(WindowBounds::default())
    }

    /// Sorted, deduplicated identities of applications with windows.
    fn running_applications(&self) -> Result<Vec<String>, DriverError>;

    /// Labels of actionable buttons in the active window. Platform-limited:
    /// only the macOS backend can enumerate these.
    fn clickable_buttons(&self) -> Result<Vec<String>, DriverError> {
        Ok(Vec::new())
    }

    /// Presses the button labeled `label` in the active window.
    /// Platform-limited like [`Driver::clickable_buttons`]; `count < 1` is a
    /// no-op everywhere.
    fn click_button(&self, _label: &str, _count: i32) -> Result<(), DriverError> {
        Ok(())
    }

    fn mouse_location(&self) -> Result<MouseLocation, DriverError>;

    fn set_mouse_location(&self, x: i32, y: i32) -> Result<(), DriverError>;

    /// Text and caret of the focused control via direct accessibility
    /// introspection. Platforms without such an API report
    /// [`EditorState::unreadable`].
    fn editor_state(&self) -> Result<EditorState, DriverError> {
        Ok(EditorState::unreadable())
    }

    /// Clipboard-driven editor state probe for applications whose
    /// accessibility tree is absent or lies about caret positions.
    /// `paragraph` widens the probed span from the line to the containing
    /// paragraph.
    fn editor_state_fallback(&self, paragraph: bool) -> Result<EditorState, DriverError>;

    /// Replaces the focused control's text and selection
    /// (`cursor_start ..= cursor_end`, collapsed when `cursor_end` is
    /// `None`). No-ops where accessibility writes are unavailable or the
    /// target is sandboxed against them.
    fn set_editor_state(
        &self,
        _text: &str,
        _cursor_start: usize,
        _cursor_end: Option<usize>,
    ) -> Result<(), DriverError> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Factory
// ---------------------------------------------------------------------------

/// Returns the driver for the compiled target platform.
pub fn create_driver(config: DriverConfig) -> Result<Box<dyn Driver>, DriverError> {
    platform::create_driver(config)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    /// A backend that overrides nothing optional, standing in for a platform
    /// without button enumeration or direct editor introspection.
    struct BareDriver;

    impl Driver for BareDriver {
        fn click(&self, _button: MouseButton, _count: i32) -> Result<(), DriverError> {
            Ok(())
        }
        fn mouse_down(&self, _button: MouseButton) -> Result<(), DriverError> {
            Ok(())
        }
        fn mouse_up(&self, _button: MouseButton) -> Result<(), DriverError> {
            Ok(())
        }
        fn press_key(
            &self,
            _key: &str,
            _modifiers: &[String],
            _sticky: &[String],
            _count: i32,
        ) -> Result<(), DriverError> {
            Ok(())
        }
        fn toggle_key(&self, _key: &str, _sticky: &[String], _down: bool) -> Result<(), DriverError> {
            Ok(())
        }
        fn type_text(&self, _text: &str, _sticky: &[String]) -> Result<(), DriverError> {
            Ok(())
        }
        fn focus_application(&self, _name: &str) -> Result<(), DriverError> {
            Ok(())
        }
        fn active_application(&self) -> Result<String, DriverError> {
            Ok(String::new())
        }
        fn running_applications(&self) -> Result<Vec<String>, DriverError> {
            Ok(Vec::new())
        }
        fn mouse_location(&self) -> Result<MouseLocation, DriverError> {
            Ok(MouseLocation::default())
        }
        fn set_mouse_location(&self, _x: i32, _y: i32) -> Result<(), DriverError> {
            Ok(())
        }
        fn editor_state_fallback(&self, _paragraph: bool) -> Result<EditorState, DriverError> {
            Ok(EditorState::unreadable())
        }
    }

    /// Platform-limited operations resolve with neutral results instead of
    /// errors, keeping the facade contract platform-uniform.
    #[test]
    fn unsupported_operations_resolve_neutrally() {
        let driver = BareDriver;
        assert_eq!(driver.clickable_buttons().unwrap(), Vec::<String>::new());
        assert!(driver.click_button("ok", 1).is_ok());
        assert!(driver.set_editor_state("x", 0, None).is_ok());
        assert_eq!(driver.active_window_bounds().unwrap(), WindowBounds::default());
        assert!(driver.editor_state().unwrap().unreadable);
    }
}
