//! macOS editor-state access.
//!
//! The direct path reads the focused text element through the accessibility
//! API. The fallback path drives select/copy keystrokes through the
//! synthesizer and measures the halves off the pasteboard, for applications
//! whose accessibility tree is missing or misreports caret positions. The
//! pasteboard is snapshotted before the first probe and restored on every
//! exit path.

use super::ax;
use super::input;
use super::pasteboard::{self, PasteboardRestore};
use super::quirks;
use super::winctl;
use crate::config::TimingConfig;
use crate::error::DriverError;
use crate::types::EditorState;

// ---------------------------------------------------------------------------
// Direct path
// ---------------------------------------------------------------------------

pub(super) fn editor_state() -> Result<EditorState, DriverError> {
    let Some(field) = ax::focused_text_field() else {
        return Ok(EditorState::unreadable());
    };

    let text = field.title();
    // The caret sits at the end of the selection range; a collapsed
    // selection makes that the insertion point itself.
    let cursor = field
        .selected_text_range()
        .map(|(location, length)| location + length)
        .unwrap_or(0);

    Ok(EditorState::new(text, cursor))
}

pub(super) fn set_editor_state(
    text: &str,
    cursor_start: usize,
    cursor_end: Option<usize>,
) -> Result<(), DriverError> {
    let Some(field) = ax::focused_text_field() else {
        return Ok(());
    };

    // Sandboxed applications silently refuse accessibility writes; a failed
    // set is a no-op, never an error.
    let written = if field.has_value_attribute() {
        field.set_string_attribute("AXValue", text)
    } else {
        field.set_string_attribute("AXTitle", text)
    };
    if !written {
        log::debug!("accessibility write rejected, leaving control unchanged");
        return Ok(());
    }

    let length = cursor_end
        .map(|end| end.saturating_sub(cursor_start))
        .unwrap_or(0);
    field.set_selected_text_range(cursor_start, length);
    Ok(())
}

// ---------------------------------------------------------------------------
// Clipboard fallback
// ---------------------------------------------------------------------------

pub(super) fn editor_state_fallback(
    paragraph: bool,
    timing: &TimingConfig,
) -> Result<EditorState, DriverError> {
    let app_quirks = quirks::for_bundle(&winctl::frontmost_bundle_id());
    let _restore = PasteboardRestore::snapshot();

    // Plain mode probes the whole document (cmd+shift+up/down). Paragraph
    // mode probes the containing paragraph (option+shift+up/down) for
    // editors whose document-start command overshoots the editable span.
    let select_modifiers: &[String] = if paragraph {
        &[String::from("alt"), String::from("shift")]
    } else {
        &[String::from("command"), String::from("shift")]
    };
    let copy_modifiers = [String::from("command")];

    input::press_key("up", select_modifiers, &[], 1, timing)?;
    input::press_key("c", &copy_modifiers, &[], 1, timing)?;
    std::thread::sleep(timing.clipboard_settle());
    if !app_quirks.skip_cursor_restore {
        input::press_key("right", &[], &[], 1, timing)?;
    }
    let left = pasteboard::read();

    input::press_key("down", select_modifiers, &[], 1, timing)?;
    input::press_key("c", &copy_modifiers, &[], 1, timing)?;
    std::thread::sleep(timing.clipboard_settle());
    if !app_quirks.skip_cursor_restore {
        input::press_key("left", &[], &[], 1, timing)?;
    }
    let right = pasteboard::read();

    if left.is_none() && right.is_none() {
        return Ok(EditorState::unreadable());
    }

    let mut left = left.unwrap_or_default();
    let mut right = right.unwrap_or_default();
    if app_quirks.strip_bullets {
        left = quirks::strip_bullet_prefixes(&left);
        right = quirks::strip_bullet_prefixes(&right);
    }

    Ok(EditorState::from_halves(&left, &right))
}

// ---------------------------------------------------------------------------
// Button search
// ---------------------------------------------------------------------------

const PRESS_ACTION: &str = "AXPress";
const OPEN_ACTION: &str = "AXOpen";

fn is_button(element: &ax::AxElement) -> bool {
    (element.role_description() == "button" && !element.title().is_empty())
        || element.actions().iter().any(|a| a == OPEN_ACTION)
}

fn collect_buttons(element: &ax::AxElement, result: &mut Vec<String>) {
    for child in element.children().into_iter().take(ax::MAX_SIBLINGS) {
        if is_button(&child) {
            result.push(child.title().to_lowercase());
        } else {
            collect_buttons(&child, result);
        }
    }
}

pub(super) fn clickable_buttons() -> Result<Vec<String>, DriverError> {
    let Some(window) = ax::focused_window() else {
        return Ok(Vec::new());
    };

    let mut buttons = Vec::new();
    collect_buttons(&window, &mut buttons);
    Ok(buttons)
}

fn press_button(element: &ax::AxElement, label: &str) -> bool {
    for child in element.children().into_iter().take(ax::MAX_SIBLINGS) {
        if is_button(&child) {
            if child.title().to_lowercase() == label {
                let actions = child.actions();
                if actions.iter().any(|a| a == PRESS_ACTION) {
                    return child.perform_action(PRESS_ACTION);
                }
                if actions.iter().any(|a| a == OPEN_ACTION) {
                    return child.perform_action(OPEN_ACTION);
                }
            }
        } else if press_button(&child, label) {
            return true;
        }
    }
    false
}

pub(super) fn click_button(label: &str, count: i32) -> Result<(), DriverError> {
    let Some(window) = ax::focused_window() else {
        return Ok(());
    };

    let wanted = label.to_lowercase();
    for _ in 0..count.max(0) {
        if !press_button(&window, &wanted) {
            log::debug!("no clickable button labeled {wanted:?}");
            return Ok(());
        }
    }
    Ok(())
}
