//! X11 input synthesis via the XTest extension.
//!
//! Key and button events are faked with `xtest::fake_input` and flushed
//! immediately; a short settle delay follows each event because focused
//! clients drop or misorder back-to-back synthetic input.

use x11rb::connection::Connection;
use x11rb::protocol::xproto::{
    BUTTON_PRESS_EVENT, BUTTON_RELEASE_EVENT, KEY_PRESS_EVENT, KEY_RELEASE_EVENT,
};
use x11rb::protocol::xtest;
use x11rb::rust_connection::RustConnection;

use super::keymap::KeyMap;
use crate::config::TimingConfig;
use crate::error::DriverError;
use crate::key::{self, ResolvedKey};
use crate::sequence::{self, SeqKey, SeqStep};
use crate::types::MouseButton;

// ---------------------------------------------------------------------------
// Raw events
// ---------------------------------------------------------------------------

fn fake(conn: &RustConnection, event_type: u8, detail: u8) -> Result<(), DriverError> {
    xtest::fake_input(conn, event_type, detail, x11rb::CURRENT_TIME, x11rb::NONE, 0, 0, 0)
        .map_err(|e| DriverError::Platform(format!("fake_input: {e}")))?;
    conn.flush()
        .map_err(|e| DriverError::Platform(format!("flush: {e}")))?;
    Ok(())
}

fn key_event(
    conn: &RustConnection,
    keycode: u32,
    down: bool,
    timing: &TimingConfig,
) -> Result<(), DriverError> {
    let event_type = if down { KEY_PRESS_EVENT } else { KEY_RELEASE_EVENT };
    fake(conn, event_type, keycode as u8)?;
    std::thread::sleep(timing.key_settle());
    Ok(())
}

fn button_code(button: MouseButton) -> u8 {
    match button {
        MouseButton::Left => 1,
        MouseButton::Middle => 2,
        MouseButton::Right => 3,
    }
}

pub(super) fn button_event(
    conn: &RustConnection,
    button: MouseButton,
    down: bool,
    timing: &TimingConfig,
) -> Result<(), DriverError> {
    let event_type = if down { BUTTON_PRESS_EVENT } else { BUTTON_RELEASE_EVENT };
    fake(conn, event_type, button_code(button))?;
    std::thread::sleep(timing.click_settle());
    Ok(())
}

/// X11 has no native click-multiplicity field; double and triple clicks are
/// inferred by clients from event timing, so repeated pairs suffice.
pub(super) fn click(
    conn: &RustConnection,
    button: MouseButton,
    count: i32,
    timing: &TimingConfig,
) -> Result<(), DriverError> {
    for _ in 0..count.max(0) {
        button_event(conn, button, true, timing)?;
        button_event(conn, button, false, timing)?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Key sequences
// ---------------------------------------------------------------------------

/// Walks a step list, resolving companion and modifier tokens against the
/// same live mapping as the main key. Modifiers that fail to resolve are
/// skipped silently, per the facade contract.
fn run_steps(
    conn: &RustConnection,
    map: &KeyMap,
    main: ResolvedKey,
    steps: &[SeqStep<'_>],
    timing: &TimingConfig,
) -> Result<(), DriverError> {
    for step in steps {
        let code = match step.key {
            SeqKey::Main => Some(main.code),
            SeqKey::Shift => map.resolve("shift").map(|k| k.code),
            SeqKey::AltGr => map.resolve("altgr").map(|k| k.code),
            SeqKey::Modifier(name) => map.resolve(name).map(|k| k.code),
        };

        let Some(code) = code else {
            log::debug!("no keycode for {:?}, skipping", step.key);
            continue;
        };

        key_event(conn, code, step.down, timing)?;

        // End of one full press bracket; give the client time to commit it.
        if step.key == SeqKey::Main && !step.down {
            std::thread::sleep(timing.press_settle());
        }
    }
    Ok(())
}

pub(super) fn press_key(
    conn: &RustConnection,
    map: &KeyMap,
    token: &str,
    modifiers: &[String],
    sticky: &[String],
    count: i32,
    timing: &TimingConfig,
) -> Result<(), DriverError> {
    let Some(main) = map.resolve(token) else {
        log::debug!("no keycode produces {token:?} under the current layout");
        return Ok(());
    };

    let steps = sequence::press_key_steps(main.shift, main.altgr, modifiers, sticky, count);
    run_steps(conn, map, main, &steps, timing)
}

pub(super) fn toggle_key(
    conn: &RustConnection,
    map: &KeyMap,
    token: &str,
    sticky: &[String],
    down: bool,
    timing: &TimingConfig,
) -> Result<(), DriverError> {
    let Some(main) = map.resolve(token) else {
        log::debug!("no keycode produces {token:?} under the current layout");
        return Ok(());
    };

    let steps = sequence::toggle_steps(main.shift, main.altgr, sticky, down);
    run_steps(conn, map, main, &steps, timing)
}

pub(super) fn type_text(
    conn: &RustConnection,
    map: &KeyMap,
    text: &str,
    sticky: &[String],
    timing: &TimingConfig,
) -> Result<(), DriverError> {
    for c in text.chars() {
        let token = key::normalize(&c.to_string());
        press_key(conn, map, &token, &[], sticky, 1, timing)?;
    }
    Ok(())
}
