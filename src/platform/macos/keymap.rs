//! macOS key resolution against the live keyboard layout.
//!
//! Symbolic keys map straight to Carbon virtual key constants. Printable
//! characters are resolved by probing every virtual key code (0..128) under
//! each modifier combination through `UCKeyTranslate` against the layout of
//! the current keyboard input source -- fetched fresh per resolution, since
//! the user can switch layouts between calls. The probe order (plain first,
//! then shift, then option levels) doubles as the shifted-punctuation
//! check: a character only reports `shift` after the unshifted scan proved
//! no code produces it plainly.

use std::ffi::c_void;

use crate::key::ResolvedKey;

// ---------------------------------------------------------------------------
// Carbon virtual keys (HIToolbox/Events.h)
// ---------------------------------------------------------------------------

const KVK_RETURN: u32 = 0x24;
const KVK_TAB: u32 = 0x30;
const KVK_SPACE: u32 = 0x31;
const KVK_DELETE: u32 = 0x33;
const KVK_ESCAPE: u32 = 0x35;
const KVK_COMMAND: u32 = 0x37;
const KVK_SHIFT: u32 = 0x38;
const KVK_CAPS_LOCK: u32 = 0x39;
const KVK_OPTION: u32 = 0x3a;
const KVK_CONTROL: u32 = 0x3b;
const KVK_FUNCTION: u32 = 0x3f;
const KVK_F1: u32 = 0x7a;
const KVK_F2: u32 = 0x78;
const KVK_F3: u32 = 0x63;
const KVK_F4: u32 = 0x76;
const KVK_F5: u32 = 0x60;
const KVK_F6: u32 = 0x61;
const KVK_F7: u32 = 0x62;
const KVK_F8: u32 = 0x64;
const KVK_F9: u32 = 0x65;
const KVK_F10: u32 = 0x6d;
const KVK_F11: u32 = 0x67;
const KVK_F12: u32 = 0x6f;
const KVK_HOME: u32 = 0x73;
const KVK_PAGE_UP: u32 = 0x74;
const KVK_FORWARD_DELETE: u32 = 0x75;
const KVK_END: u32 = 0x77;
const KVK_PAGE_DOWN: u32 = 0x79;
const KVK_LEFT_ARROW: u32 = 0x7b;
const KVK_RIGHT_ARROW: u32 = 0x7c;
const KVK_DOWN_ARROW: u32 = 0x7d;
const KVK_UP_ARROW: u32 = 0x7e;

// ---------------------------------------------------------------------------
// Carbon text input source FFI
// ---------------------------------------------------------------------------

// The Carbon text-input-source and key-translation calls have no coverage in
// the objc2 framework crates; bind the handful we need directly.

type CFTypeRef = *const c_void;

const UC_KEY_ACTION_DISPLAY: u16 = 3;
const UC_KEY_TRANSLATE_NO_DEAD_KEYS_MASK: u32 = 1;

/// Carbon modifier-key-state bits: (EventModifiers >> 8) & 0xff.
const MODIFIER_SHIFT: u32 = 1 << 1;
const MODIFIER_OPTION: u32 = 1 << 3;

#[link(name = "Carbon", kind = "framework")]
extern "C" {
    static kTISPropertyUnicodeKeyLayoutData: CFTypeRef;

    fn TISCopyCurrentKeyboardInputSource() -> CFTypeRef;
    fn TISGetInputSourceProperty(source: CFTypeRef, key: CFTypeRef) -> CFTypeRef;
    fn LMGetKbdType() -> u8;
    fn UCKeyTranslate(
        key_layout_ptr: *const c_void,
        virtual_key_code: u16,
        key_action: u16,
        modifier_key_state: u32,
        keyboard_type: u32,
        key_translate_options: u32,
        dead_key_state: *mut u32,
        max_string_length: usize,
        actual_string_length: *mut usize,
        unicode_string: *mut u16,
    ) -> i32;
}

#[link(name = "CoreFoundation", kind = "framework")]
extern "C" {
    fn CFDataGetBytePtr(the_data: CFTypeRef) -> *const u8;
    fn CFRelease(cf: CFTypeRef);
}

/// The current keyboard input source's 'uchr' layout, held for the duration
/// of one resolution. Releases the input source on drop.
struct KeyboardLayout {
    source: CFTypeRef,
    layout: *const c_void,
    kbd_type: u32,
}

impl KeyboardLayout {
    fn current() -> Option<Self> {
        unsafe {
            let source = TISCopyCurrentKeyboardInputSource();
            if source.is_null() {
                return None;
            }
            let data = TISGetInputSourceProperty(source, kTISPropertyUnicodeKeyLayoutData);
            if data.is_null() {
                CFRelease(source);
                return None;
            }
            Some(KeyboardLayout {
                source,
                layout: CFDataGetBytePtr(data).cast(),
                kbd_type: u32::from(LMGetKbdType()),
            })
        }
    }

    /// The character typing `code` with the given modifiers would currently
    /// produce, if any.
    fn produced_char(&self, code: u16, shift: bool, option: bool) -> Option<char> {
        let mut modifiers = 0;
        if shift {
            modifiers |= MODIFIER_SHIFT;
        }
        if option {
            modifiers |= MODIFIER_OPTION;
        }

        let mut dead_keys: u32 = 0;
        let mut chars = [0u16; 4];
        let mut length: usize = 0;
        let status = unsafe {
            UCKeyTranslate(
                self.layout,
                code,
                UC_KEY_ACTION_DISPLAY,
                modifiers,
                self.kbd_type,
                UC_KEY_TRANSLATE_NO_DEAD_KEYS_MASK,
                &mut dead_keys,
                chars.len(),
                &mut length,
                chars.as_mut_ptr(),
            )
        };
        if status != 0 || length == 0 {
            return None;
        }

        char::decode_utf16(chars[..length].iter().copied())
            .next()
            .and_then(|c| c.ok())
    }
}

impl Drop for KeyboardLayout {
    fn drop(&mut self) {
        unsafe { CFRelease(self.source) };
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

fn symbolic_key(token: &str) -> Option<u32> {
    let code = match token {
        "enter" => KVK_RETURN,
        "tab" => KVK_TAB,
        "space" => KVK_SPACE,
        "backspace" | "delete" => KVK_DELETE,
        "forwarddelete" => KVK_FORWARD_DELETE,
        "escape" => KVK_ESCAPE,
        // commandorcontrol resolves to Command on macOS.
        "command" | "commandorcontrol" | "meta" => KVK_COMMAND,
        "caps" => KVK_CAPS_LOCK,
        "shift" => KVK_SHIFT,
        "alt" | "altgr" => KVK_OPTION,
        "control" => KVK_CONTROL,
        "function" => KVK_FUNCTION,
        "home" => KVK_HOME,
        "end" => KVK_END,
        "pageup" => KVK_PAGE_UP,
        "pagedown" => KVK_PAGE_DOWN,
        "left" => KVK_LEFT_ARROW,
        "right" => KVK_RIGHT_ARROW,
        "up" => KVK_UP_ARROW,
        "down" => KVK_DOWN_ARROW,
        "f1" => KVK_F1,
        "f2" => KVK_F2,
        "f3" => KVK_F3,
        "f4" => KVK_F4,
        "f5" => KVK_F5,
        "f6" => KVK_F6,
        "f7" => KVK_F7,
        "f8" => KVK_F8,
        "f9" => KVK_F9,
        "f10" => KVK_F10,
        "f11" => KVK_F11,
        "f12" => KVK_F12,
        _ => return None,
    };
    Some(code)
}

/// Resolves a normalized token to a virtual key plus required modifiers.
///
/// `altgr` carries the Option requirement (macOS's third character level).
/// Returns `None` when no code produces the character; the synthesizer then
/// falls back to direct Unicode injection.
pub(super) fn resolve(token: &str) -> Option<ResolvedKey> {
    if let Some(code) = symbolic_key(token) {
        return Some(ResolvedKey::plain(code));
    }

    let mut chars = token.chars();
    let wanted = chars.next()?;
    if chars.next().is_some() {
        return None;
    }

    let layout = KeyboardLayout::current()?;
    for (shift, option) in [(false, false), (true, false), (false, true), (true, true)] {
        for code in 0..128u16 {
            if layout.produced_char(code, shift, option) == Some(wanted) {
                return Some(ResolvedKey {
                    code: u32::from(code),
                    shift,
                    altgr: option,
                    extended: false,
                });
            }
        }
    }

    None
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbolic_keys_need_no_modifiers() {
        for token in ["enter", "escape", "f5", "home", "left", "command"] {
            let resolved = resolve(token).unwrap();
            assert!(!resolved.shift, "{token} should not need shift");
            assert!(!resolved.altgr, "{token} should not need option");
        }
    }

    #[test]
    fn command_aliases_share_a_code() {
        assert_eq!(resolve("command"), resolve("meta"));
        assert_eq!(resolve("command"), resolve("commandorcontrol"));
    }

    #[test]
    fn multi_char_unknown_tokens_fail() {
        assert_eq!(resolve("nosuchkey"), None);
        assert_eq!(resolve("f13"), None);
    }
}
