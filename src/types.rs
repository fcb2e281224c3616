//! Call-scoped value types shared by the facade and the platform backends.

// ---------------------------------------------------------------------------
// Mouse
// ---------------------------------------------------------------------------

/// A physical mouse button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

impl MouseButton {
    /// Parses a button name. Unrecognized or empty names mean the left
    /// button, matching the facade contract.
    pub fn from_name(name: &str) -> Self {
        match name {
            "middle" => MouseButton::Middle,
            "right" => MouseButton::Right,
            _ => MouseButton::Left,
        }
    }
}

/// Pointer position in screen coordinates, top-left origin on every
/// platform. The macOS backend flips from AppKit's bottom-left convention
/// before reporting, so hit testing against window bounds works unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MouseLocation {
    pub x: i32,
    pub y: i32,
}

// ---------------------------------------------------------------------------
// Windows
// ---------------------------------------------------------------------------

/// Frame of a top-level window, top-left origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WindowBounds {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

// ---------------------------------------------------------------------------
// Editor state
// ---------------------------------------------------------------------------

/// Text and caret position of the focused text control.
///
/// `unreadable` is an expected outcome, not an error: it is set whenever no
/// focused text control exists, the element is not a text-bearing role, or
/// the platform denies introspection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EditorState {
    pub text: String,
    /// Caret offset in code units of `text`.
    pub cursor: usize,
    pub unreadable: bool,
}

impl EditorState {
    /// The degraded result: nothing could be read.
    pub fn unreadable() -> Self {
        EditorState {
            text: String::new(),
            cursor: 0,
            unreadable: true,
        }
    }

    pub fn new(text: impl Into<String>, cursor: usize) -> Self {
        EditorState {
            text: text.into(),
            cursor,
            unreadable: false,
        }
    }

    /// Assembles the result of a clipboard fallback probe: `left` is the
    /// text before the caret, `right` the text after, so the caret offset is
    /// the length of `left`.
    pub fn from_halves(left: &str, right: &str) -> Self {
        EditorState {
            text: format!("{left}{right}"),
            cursor: left.chars().count(),
            unreadable: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_button_defaults_to_left() {
        assert_eq!(MouseButton::from_name("left"), MouseButton::Left);
        assert_eq!(MouseButton::from_name(""), MouseButton::Left);
        assert_eq!(MouseButton::from_name("wheel"), MouseButton::Left);
    }

    #[test]
    fn named_buttons_parse() {
        assert_eq!(MouseButton::from_name("middle"), MouseButton::Middle);
        assert_eq!(MouseButton::from_name("right"), MouseButton::Right);
    }

    #[test]
    fn unreadable_state_is_empty() {
        let state = EditorState::unreadable();
        assert!(state.unreadable);
        assert!(state.text.is_empty());
        assert_eq!(state.cursor, 0);
    }

    #[test]
    fn readable_state_keeps_fields() {
        let state = EditorState::new("hello", 3);
        assert!(!state.unreadable);
        assert_eq!(state.text, "hello");
        assert_eq!(state.cursor, 3);
    }

    #[test]
    fn halves_concatenate_with_cursor_at_the_seam() {
        let state = EditorState::from_halves("hel", "lo");
        assert_eq!(state.text, "hello");
        assert_eq!(state.cursor, 3);
        assert!(!state.unreadable);
    }

    #[test]
    fn empty_halves_make_an_empty_readable_state() {
        let state = EditorState::from_halves("", "");
        assert_eq!(state.text, "");
        assert_eq!(state.cursor, 0);
        assert!(!state.unreadable);
    }

    #[test]
    fn cursor_counts_characters_not_bytes() {
        let state = EditorState::from_halves("héllo ", "wörld");
        assert_eq!(state.cursor, 6);
    }
}
