//! macOS input synthesis via CGEvent.
//!
//! Keyboard events are posted at the HID tap with modifier state expressed
//! as event flags -- the native convention -- rather than as separate
//! modifier key events. Keys the layout cannot produce are injected as
//! literal Unicode payloads on the key event. Mouse events are posted at
//! the current pointer location with the click-multiplicity field set so
//! double and triple clicks register as such in the target application.

use std::ffi::c_void;

use super::keymap;
use crate::config::TimingConfig;
use crate::error::DriverError;
use crate::key;
use crate::types::{MouseButton, MouseLocation};

// ---------------------------------------------------------------------------
// Raw FFI
// ---------------------------------------------------------------------------

type CGEventRef = *mut c_void;
type CGEventSourceRef = *mut c_void;

#[repr(C)]
#[derive(Debug, Clone, Copy)]
struct CGPoint {
    x: f64,
    y: f64,
}

/// kCGEventSourceStateHIDSystemState.
const EVENT_SOURCE_HID_SYSTEM_STATE: i32 = 1;
/// kCGHIDEventTap.
const HID_EVENT_TAP: u32 = 0;

/// CGEventType values.
const EVENT_LEFT_MOUSE_DOWN: u32 = 1;
const EVENT_LEFT_MOUSE_UP: u32 = 2;
const EVENT_RIGHT_MOUSE_DOWN: u32 = 3;
const EVENT_RIGHT_MOUSE_UP: u32 = 4;
const EVENT_MOUSE_MOVED: u32 = 5;
const EVENT_OTHER_MOUSE_DOWN: u32 = 25;
const EVENT_OTHER_MOUSE_UP: u32 = 26;

/// CGMouseButton values.
const MOUSE_BUTTON_LEFT: u32 = 0;
const MOUSE_BUTTON_RIGHT: u32 = 1;
const MOUSE_BUTTON_CENTER: u32 = 2;

/// kCGMouseEventClickState.
const MOUSE_EVENT_CLICK_STATE: u32 = 1;

/// CGEventFlags modifier masks.
const FLAG_SHIFT: u64 = 1 << 17;
const FLAG_CONTROL: u64 = 1 << 18;
const FLAG_ALTERNATE: u64 = 1 << 19;
const FLAG_COMMAND: u64 = 1 << 20;
const FLAG_SECONDARY_FN: u64 = 1 << 23;

#[link(name = "ApplicationServices", kind = "framework")]
extern "C" {
    fn CGEventSourceCreate(state_id: i32) -> CGEventSourceRef;
    fn CGEventCreate(source: CGEventSourceRef) -> CGEventRef;
    fn CGEventCreateKeyboardEvent(
        source: CGEventSourceRef,
        virtual_key: u16,
        key_down: bool,
    ) -> CGEventRef;
    fn CGEventCreateMouseEvent(
        source: CGEventSourceRef,
        mouse_type: u32,
        location: CGPoint,
        button: u32,
    ) -> CGEventRef;
    fn CGEventGetLocation(event: CGEventRef) -> CGPoint;
    fn CGEventPost(tap: u32, event: CGEventRef);
    fn CGEventSetType(event: CGEventRef, event_type: u32);
    fn CGEventSetFlags(event: CGEventRef, flags: u64);
    fn CGEventSetIntegerValueField(event: CGEventRef, field: u32, value: i64);
    fn CGEventKeyboardSetUnicodeString(
        event: CGEventRef,
        string_length: usize,
        unicode_string: *const u16,
    );
}

#[link(name = "CoreFoundation", kind = "framework")]
extern "C" {
    fn CFRelease(cf: *const c_void);
}

// ---------------------------------------------------------------------------
// Modifier flags
// ---------------------------------------------------------------------------

fn modifier_flag(token: &str) -> Option<u64> {
    match token {
        "shift" => Some(FLAG_SHIFT),
        "control" => Some(FLAG_CONTROL),
        "alt" | "altgr" => Some(FLAG_ALTERNATE),
        "command" | "meta" | "commandorcontrol" => Some(FLAG_COMMAND),
        "function" => Some(FLAG_SECONDARY_FN),
        _ => None,
    }
}

fn flags_for(detected_shift: bool, detected_option: bool, held: &[&[String]]) -> u64 {
    let mut flags = 0;
    if detected_shift {
        flags |= FLAG_SHIFT;
    }
    if detected_option {
        flags |= FLAG_ALTERNATE;
    }
    for group in held {
        for token in *group {
            if let Some(flag) = modifier_flag(token) {
                flags |= flag;
            }
        }
    }
    flags
}

// ---------------------------------------------------------------------------
// Keyboard events
// ---------------------------------------------------------------------------

/// Posts one keyboard transition. `unicode` carries the literal character
/// for keys the layout cannot produce; flags apply on the down edge only.
fn key_event(
    code: u32,
    unicode: Option<char>,
    down: bool,
    flags: u64,
    timing: &TimingConfig,
) -> Result<(), DriverError> {
    unsafe {
        let source = CGEventSourceCreate(EVENT_SOURCE_HID_SYSTEM_STATE);
        if source.is_null() {
            return Err(DriverError::Platform("CGEventSourceCreate returned null".into()));
        }

        let event = CGEventCreateKeyboardEvent(source, code as u16, down);
        if event.is_null() {
            CFRelease(source.cast());
            return Err(DriverError::Platform(
                "CGEventCreateKeyboardEvent returned null".into(),
            ));
        }

        if let Some(c) = unicode {
            let mut units = [0u16; 2];
            let encoded = c.encode_utf16(&mut units);
            CGEventKeyboardSetUnicodeString(event, encoded.len(), encoded.as_ptr());
        }

        CGEventSetFlags(event, if down { flags } else { 0 });
        CGEventPost(HID_EVENT_TAP, event);
        CFRelease(event.cast());
        CFRelease(source.cast());
    }

    std::thread::sleep(timing.key_settle());
    Ok(())
}

/// Resolves a token for synthesis. Unmapped printable characters fall back
/// to Unicode injection on virtual key 0; anything else unmapped is skipped.
fn resolve_for_synthesis(token: &str) -> Option<(u32, Option<char>, bool, bool)> {
    if let Some(resolved) = keymap::resolve(token) {
        return Some((resolved.code, None, resolved.shift, resolved.altgr));
    }

    let mut chars = token.chars();
    let c = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    Some((0, Some(c), false, false))
}

fn press_once(
    token: &str,
    modifiers: &[String],
    sticky: &[String],
    timing: &TimingConfig,
) -> Result<(), DriverError> {
    let Some((code, unicode, shift, option)) = resolve_for_synthesis(token) else {
        log::debug!("no virtual key produces {token:?}, skipping");
        return Ok(());
    };

    let flags = flags_for(shift, option, &[modifiers, sticky]);
    key_event(code, unicode, true, flags, timing)?;
    key_event(code, unicode, false, flags, timing)?;
    std::thread::sleep(timing.press_settle());
    Ok(())
}

pub(super) fn press_key(
    token: &str,
    modifiers: &[String],
    sticky: &[String],
    count: i32,
    timing: &TimingConfig,
) -> Result<(), DriverError> {
    if count < 1 {
        return Ok(());
    }

    // Sticky modifiers go physically down once and stay down; the caller
    // releases them with an explicit toggle. Their flag still rides on every
    // key event so the target sees a consistent modifier state.
    for token in sticky {
        toggle_key(token, &[], true, timing)?;
    }

    for _ in 0..count {
        press_once(token, modifiers, sticky, timing)?;
    }
    Ok(())
}

pub(super) fn toggle_key(
    token: &str,
    sticky: &[String],
    down: bool,
    timing: &TimingConfig,
) -> Result<(), DriverError> {
    let Some((code, unicode, shift, option)) = resolve_for_synthesis(token) else {
        log::debug!("no virtual key produces {token:?}, skipping");
        return Ok(());
    };

    let flags = flags_for(shift, option, &[sticky]);
    key_event(code, unicode, down, flags, timing)
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

fn button_constants(button: MouseButton) -> (u32, u32, u32) {
    match button {
        MouseButton::Left => (EVENT_LEFT_MOUSE_DOWN, EVENT_LEFT_MOUSE_UP, MOUSE_BUTTON_LEFT),
        MouseButton::Right => (EVENT_RIGHT_MOUSE_DOWN, EVENT_RIGHT_MOUSE_UP, MOUSE_BUTTON_RIGHT),
        MouseButton::Middle => (EVENT_OTHER_MOUSE_DOWN, EVENT_OTHER_MOUSE_UP, MOUSE_BUTTON_CENTER),
    }
}

fn current_location() -> CGPoint {
    unsafe {
        let event = CGEventCreate(std::ptr::null_mut());
        if event.is_null() {
            return CGPoint { x: 0.0, y: 0.0 };
        }
        let location = CGEventGetLocation(event);
        CFRelease(event.cast());
        location
    }
}

/// HID-tap mouse coordinates are already top-left-origin global coordinates.
pub(super) fn mouse_location() -> MouseLocation {
    let location = current_location();
    MouseLocation {
        x: location.x as i32,
        y: location.y as i32,
    }
}

pub(super) fn button_event(button: MouseButton, down: bool, timing: &TimingConfig) -> Result<(), DriverError> {
    let (down_type, up_type, button_code) = button_constants(button);
    let event_type = if down { down_type } else { up_type };

    unsafe {
        let event = CGEventCreateMouseEvent(
            std::ptr::null_mut(),
            event_type,
            current_location(),
            button_code,
        );
        if event.is_null() {
            return Err(DriverError::Platform("CGEventCreateMouseEvent returned null".into()));
        }
        CGEventPost(HID_EVENT_TAP, event);
        CFRelease(event.cast());
    }

    std::thread::sleep(timing.click_settle());
    Ok(())
}

/// One pointer location is read up front; repeat pairs carry click state
/// 2, 3, ... so the target application recognizes double and triple clicks.
pub(super) fn click(button: MouseButton, count: i32, timing: &TimingConfig) -> Result<(), DriverError> {
    if count < 1 {
        return Ok(());
    }

    let (down_type, up_type, button_code) = button_constants(button);
    let location = current_location();

    unsafe {
        let event = CGEventCreateMouseEvent(std::ptr::null_mut(), down_type, location, button_code);
        if event.is_null() {
            return Err(DriverError::Platform("CGEventCreateMouseEvent returned null".into()));
        }

        CGEventPost(HID_EVENT_TAP, event);
        CGEventSetType(event, up_type);
        CGEventPost(HID_EVENT_TAP, event);

        for repeat in 1..count {
            CGEventSetIntegerValueField(event, MOUSE_EVENT_CLICK_STATE, i64::from(repeat) + 1);

            CGEventSetType(event, down_type);
            CGEventPost(HID_EVENT_TAP, event);

            CGEventSetType(event, up_type);
            CGEventPost(HID_EVENT_TAP, event);
        }

        CFRelease(event.cast());
    }

    std::thread::sleep(timing.click_settle());
    Ok(())
}

pub(super) fn set_mouse_location(x: i32, y: i32, timing: &TimingConfig) -> Result<(), DriverError> {
    let location = CGPoint {
        x: f64::from(x),
        y: f64::from(y),
    };

    unsafe {
        let event = CGEventCreateMouseEvent(
            std::ptr::null_mut(),
            EVENT_MOUSE_MOVED,
            location,
            MOUSE_BUTTON_LEFT,
        );
        if event.is_null() {
            return Err(DriverError::Platform("CGEventCreateMouseEvent returned null".into()));
        }
        CGEventPost(HID_EVENT_TAP, event);
        CFRelease(event.cast());
    }

    // The window server applies the warp asynchronously; queries issued
    // immediately afterwards would still see the old position.
    std::thread::sleep(timing.warp_settle());
    Ok(())
}
