//! Windows input synthesis via SendInput.
//!
//! Keyboard events carry virtual keys where the layout can produce the
//! character and KEYEVENTF_UNICODE payloads where it cannot. AltGr has no
//! virtual key of its own; it is synthesized as the Alt+Control pair the
//! scan-code level would generate.

use windows_sys::Win32::UI::Input::KeyboardAndMouse::{
    SendInput, INPUT, INPUT_0, INPUT_KEYBOARD, INPUT_MOUSE, KEYBDINPUT, KEYEVENTF_EXTENDEDKEY,
    KEYEVENTF_KEYUP, KEYEVENTF_UNICODE, MOUSEEVENTF_LEFTDOWN, MOUSEEVENTF_LEFTUP,
    MOUSEEVENTF_MIDDLEDOWN, MOUSEEVENTF_MIDDLEUP, MOUSEEVENTF_RIGHTDOWN, MOUSEEVENTF_RIGHTUP,
    MOUSEINPUT, VK_CONTROL, VK_MENU, VK_SHIFT,
};

use super::keymap;
use crate::config::TimingConfig;
use crate::error::DriverError;
use crate::key::{self, ResolvedKey};
use crate::sequence::{self, SeqKey, SeqStep};
use crate::types::MouseButton;

// ---------------------------------------------------------------------------
// Raw events
// ---------------------------------------------------------------------------

fn send(input: INPUT) -> Result<(), DriverError> {
    let sent = unsafe { SendInput(1, &input, std::mem::size_of::<INPUT>() as i32) };
    if sent == 0 {
        return Err(DriverError::Platform("SendInput returned 0".into()));
    }
    Ok(())
}

fn keyboard_input(vk: u16, scan: u16, flags: u32) -> INPUT {
    INPUT {
        r#type: INPUT_KEYBOARD,
        Anonymous: INPUT_0 {
            ki: KEYBDINPUT {
                wVk: vk,
                wScan: scan,
                dwFlags: flags,
                time: 0,
                dwExtraInfo: 0,
            },
        },
    }
}

fn key_event(code: u16, extended: bool, down: bool, timing: &TimingConfig) -> Result<(), DriverError> {
    let mut flags = 0;
    if extended {
        flags |= KEYEVENTF_EXTENDEDKEY;
    }
    if !down {
        flags |= KEYEVENTF_KEYUP;
    }
    send(keyboard_input(code, 0, flags))?;
    std::thread::sleep(timing.key_settle());
    Ok(())
}

/// Injects a literal character; surrogate pairs go out as two consecutive
/// UNICODE events, which the message loop reassembles.
fn unicode_event(c: char, down: bool, timing: &TimingConfig) -> Result<(), DriverError> {
    let mut units = [0u16; 2];
    let flags = KEYEVENTF_UNICODE | if down { 0 } else { KEYEVENTF_KEYUP };
    for unit in c.encode_utf16(&mut units) {
        send(keyboard_input(0, *unit, flags))?;
    }
    std::thread::sleep(timing.key_settle());
    Ok(())
}

// ---------------------------------------------------------------------------
// Key sequences
// ---------------------------------------------------------------------------

/// The main key of a sequence: a resolved virtual key, or a literal
/// character for layouts that cannot type it.
enum MainKey {
    Virtual(ResolvedKey),
    Unicode(char),
}

fn resolve_for_synthesis(token: &str) -> Option<MainKey> {
    if let Some(resolved) = keymap::resolve(token) {
        return Some(MainKey::Virtual(resolved));
    }

    let mut chars = token.chars();
    let c = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    Some(MainKey::Unicode(c))
}

fn run_steps(
    main: &MainKey,
    steps: &[SeqStep<'_>],
    timing: &TimingConfig,
) -> Result<(), DriverError> {
    for step in steps {
        match step.key {
            SeqKey::Main => match main {
                MainKey::Virtual(resolved) => {
                    key_event(resolved.code as u16, resolved.extended, step.down, timing)?;
                }
                MainKey::Unicode(c) => unicode_event(*c, step.down, timing)?,
            },
            SeqKey::Shift => key_event(VK_SHIFT, false, step.down, timing)?,
            // AltGr is the Alt+Control chord; release order mirrors press.
            SeqKey::AltGr => {
                if step.down {
                    key_event(VK_MENU, false, true, timing)?;
                    key_event(VK_CONTROL, false, true, timing)?;
                } else {
                    key_event(VK_CONTROL, false, false, timing)?;
                    key_event(VK_MENU, false, false, timing)?;
                }
            }
            SeqKey::Modifier(name) => match keymap::resolve(name) {
                Some(resolved) => key_event(resolved.code as u16, resolved.extended, step.down, timing)?,
                None => log::debug!("no virtual key for modifier {name:?}, skipping"),
            },
        }

        if step.key == SeqKey::Main && !step.down {
            std::thread::sleep(timing.press_settle());
        }
    }
    Ok(())
}

pub(super) fn press_key(
    token: &str,
    modifiers: &[String],
    sticky: &[String],
    count: i32,
    timing: &TimingConfig,
) -> Result<(), DriverError> {
    let Some(main) = resolve_for_synthesis(token) else {
        log::debug!("cannot synthesize {token:?}, skipping");
        return Ok(());
    };

    let (shift, altgr) = match &main {
        MainKey::Virtual(resolved) => (resolved.shift, resolved.altgr),
        MainKey::Unicode(_) => (false, false),
    };
    let steps = sequence::press_key_steps(shift, altgr, modifiers, sticky, count);
    run_steps(&main, &steps, timing)
}

pub(super) fn toggle_key(
    token: &str,
    sticky: &[String],
    down: bool,
    timing: &TimingConfig,
) -> Result<(), DriverError> {
    let Some(main) = resolve_for_synthesis(token) else {
        log::debug!("cannot synthesize {token:?}, skipping");
        return Ok(());
    };

    let (shift, altgr) = match &main {
        MainKey::Virtual(resolved) => (resolved.shift, resolved.altgr),
        MainKey::Unicode(_) => (false, false),
    };
    let steps = sequence::toggle_steps(shift, altgr, sticky, down);
    run_steps(&main, &steps, timing)
}

pub(super) fn type_text(
    text: &str,
    sticky: &[String],
    timing: &TimingConfig,
) -> Result<(), DriverError> {
    for c in text.chars() {
        let token = key::normalize(&c.to_string());
        press_key(&token, &[], sticky, 1, timing)?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Mouse events
// ---------------------------------------------------------------------------

fn button_flags(button: MouseButton, down: bool) -> u32 {
    match (button, down) {
        (MouseButton::Left, true) => MOUSEEVENTF_LEFTDOWN,
        (MouseButton::Left, false) => MOUSEEVENTF_LEFTUP,
        (MouseButton::Middle, true) => MOUSEEVENTF_MIDDLEDOWN,
        (MouseButton::Middle, false) => MOUSEEVENTF_MIDDLEUP,
        (MouseButton::Right, true) => MOUSEEVENTF_RIGHTDOWN,
        (MouseButton::Right, false) => MOUSEEVENTF_RIGHTUP,
    }
}

pub(super) fn button_event(
    button: MouseButton,
    down: bool,
    timing: &TimingConfig,
) -> Result<(), DriverError> {
    let input = INPUT {
        r#type: INPUT_MOUSE,
        Anonymous: INPUT_0 {
            mi: MOUSEINPUT {
                dx: 0,
                dy: 0,
                mouseData: 0,
                dwFlags: button_flags(button, down),
                time: 0,
                dwExtraInfo: 0,
            },
        },
    };
    send(input)?;
    std::thread::sleep(timing.click_settle());
    Ok(())
}

/// Windows infers multi-clicks from event timing; repeated pairs within the
/// double-click interval register as double/triple clicks.
pub(super) fn click(button: MouseButton, count: i32, timing: &TimingConfig) -> Result<(), DriverError> {
    for _ in 0..count.max(0) {
        button_event(button, true, timing)?;
        button_event(button, false, timing)?;
    }
    Ok(())
}
