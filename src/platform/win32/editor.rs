//! Windows editor-state access.
//!
//! The direct path reads the focused UI Automation element's text pattern:
//! the element must be keyboard-focusable, actually focused, and carry an
//! automation id -- anonymous elements are overwhelmingly browser content
//! whose text pattern lies about offsets. Every precondition failure reads
//! as `unreadable`. The fallback path mirrors the X11 one over the Win32
//! clipboard.

use windows::core::Interface;
use windows::Win32::UI::Accessibility::{
    IUIAutomationElement, IUIAutomationTextPattern2, IUIAutomationValuePattern,
    TextPatternRangeEndpoint_Start, UIA_TextPattern2Id, UIA_ValuePatternId,
};

use super::automation;
use super::clipboard::{self, ClipboardRestore};
use super::input;
use crate::config::TimingConfig;
use crate::error::DriverError;
use crate::types::EditorState;

// ---------------------------------------------------------------------------
// Direct path
// ---------------------------------------------------------------------------

fn focused_text_element() -> Option<IUIAutomationElement> {
    let automation = automation::instance()?;

    unsafe {
        let focused = automation.GetFocusedElement().ok()?;

        if !focused.CurrentIsKeyboardFocusable().ok()?.as_bool() {
            return None;
        }
        if !focused.CurrentHasKeyboardFocus().ok()?.as_bool() {
            return None;
        }
        if focused.CurrentAutomationId().ok()?.is_empty() {
            return None;
        }

        Some(focused)
    }
}

pub(super) fn editor_state() -> Result<EditorState, DriverError> {
    let Some(element) = focused_text_element() else {
        return Ok(EditorState::unreadable());
    };

    unsafe {
        let Some(pattern) = element
            .GetCurrentPattern(UIA_TextPattern2Id)
            .ok()
            .and_then(|p| p.cast::<IUIAutomationTextPattern2>().ok())
        else {
            return Ok(EditorState::unreadable());
        };

        let Ok(document) = pattern.DocumentRange() else {
            return Ok(EditorState::unreadable());
        };

        let mut caret_active = windows::Win32::Foundation::BOOL(0);
        let Ok(caret) = pattern.GetCaretRange(&mut caret_active) else {
            return Ok(EditorState::unreadable());
        };

        let Ok(text) = document.GetText(-1) else {
            return Ok(EditorState::unreadable());
        };

        let position = caret
            .CompareEndpoints(
                TextPatternRangeEndpoint_Start,
                &document,
                TextPatternRangeEndpoint_Start,
            )
            .unwrap_or(0)
            .max(0);

        Ok(EditorState::new(text.to_string(), position as usize))
    }
}

/// Writes the focused element's value. Elements without a value pattern
/// (read-only content, canvases) are left untouched; UIA places the caret
/// at the end after a value write, which is as close as the platform gets
/// to an explicit selection.
pub(super) fn set_editor_state(
    text: &str,
    _cursor_start: usize,
    _cursor_end: Option<usize>,
) -> Result<(), DriverError> {
    let Some(element) = focused_text_element() else {
        return Ok(());
    };

    unsafe {
        let Some(pattern) = element
            .GetCurrentPattern(UIA_ValuePatternId)
            .ok()
            .and_then(|p| p.cast::<IUIAutomationValuePattern>().ok())
        else {
            log::debug!("focused element has no value pattern, leaving unchanged");
            return Ok(());
        };

        if let Err(e) = pattern.SetValue(&windows::core::BSTR::from(text)) {
            log::debug!("value write rejected: {e}");
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Clipboard fallback
// ---------------------------------------------------------------------------

pub(super) fn editor_state_fallback(
    paragraph: bool,
    timing: &TimingConfig,
) -> Result<EditorState, DriverError> {
    let _restore = ClipboardRestore::snapshot();

    // Plain mode probes the whole document via ctrl+home/end; paragraph
    // mode probes ctrl+up/down for editors whose home/end commands cover a
    // different span than the editable region.
    let (to_start, to_end) = if paragraph { ("up", "down") } else { ("home", "end") };
    let extend = [String::from("control"), String::from("shift")];
    let copy = [String::from("control")];

    input::press_key(to_start, &extend, &[], 1, timing)?;
    input::press_key("c", &copy, &[], 1, timing)?;
    std::thread::sleep(timing.clipboard_settle());
    input::press_key("right", &[], &[], 1, timing)?;
    let left = clipboard::read();

    input::press_key(to_end, &extend, &[], 1, timing)?;
    input::press_key("c", &copy, &[], 1, timing)?;
    std::thread::sleep(timing.clipboard_settle());
    input::press_key("left", &[], &[], 1, timing)?;
    let right = clipboard::read();

    if left.is_none() && right.is_none() {
        return Ok(EditorState::unreadable());
    }

    Ok(EditorState::from_halves(
        &left.unwrap_or_default(),
        &right.unwrap_or_default(),
    ))
}
