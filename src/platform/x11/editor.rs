//! X11 editor-state probing.
//!
//! X11 exposes no portable accessibility tree, so the direct read reports
//! `unreadable` and state is measured through the clipboard instead: select
//! to the document (or paragraph) start, copy, collapse the selection back,
//! and the clipboard now holds everything left of the caret; the mirror
//! sequence yields the right half. The user's clipboard is snapshotted
//! before the first probe and restored on every exit path.

use x11rb::protocol::xproto::Window;
use x11rb::rust_connection::RustConnection;

use super::clipboard::{self, ClipboardRestore};
use super::input;
use super::keymap::KeyMap;
use crate::config::TimingConfig;
use crate::error::DriverError;
use crate::types::EditorState;

pub(super) fn editor_state_fallback(
    conn: &RustConnection,
    root: Window,
    map: &KeyMap,
    paragraph: bool,
    timing: &TimingConfig,
) -> Result<EditorState, DriverError> {
    let _restore = ClipboardRestore::snapshot(conn, root);

    // Plain mode probes the whole document via ctrl+home/end. Paragraph mode
    // probes ctrl+up/down for editors whose home/end commands cover a
    // different span than the editable region (chat inputs, especially).
    let (to_start, to_end) = if paragraph { ("up", "down") } else { ("home", "end") };
    let extend = [String::from("control"), String::from("shift")];
    let copy = [String::from("control")];

    input::press_key(conn, map, to_start, &extend, &[], 1, timing)?;
    input::press_key(conn, map, "c", &copy, &[], 1, timing)?;
    std::thread::sleep(timing.clipboard_settle());
    input::press_key(conn, map, "right", &[], &[], 1, timing)?;
    let left = clipboard::read(conn, root)?;

    input::press_key(conn, map, to_end, &extend, &[], 1, timing)?;
    input::press_key(conn, map, "c", &copy, &[], 1, timing)?;
    std::thread::sleep(timing.clipboard_settle());
    input::press_key(conn, map, "left", &[], &[], 1, timing)?;
    let right = clipboard::read(conn, root)?;

    if left.is_none() && right.is_none() {
        // Neither probe landed in the clipboard; there is nothing to report.
        return Ok(EditorState::unreadable());
    }

    Ok(EditorState::from_halves(
        &left.unwrap_or_default(),
        &right.unwrap_or_default(),
    ))
}
