//! X11 key resolution against the live keyboard layout.
//!
//! Tokens resolve to keysyms first (symbolic names through a fixed table,
//! printable characters through the X keysym numbering convention), then to
//! physical keycodes by scanning the server's current keyboard mapping.
//! The mapping is fetched fresh for every facade call -- the user can switch
//! layouts between calls, so caching would serve stale keycodes.

use x11rb::protocol::xproto;
use x11rb::rust_connection::RustConnection;

use crate::error::DriverError;
use crate::key::ResolvedKey;

// ---------------------------------------------------------------------------
// Keysym constants (X11/keysymdef.h)
// ---------------------------------------------------------------------------

const XK_BACKSPACE: u32 = 0xff08;
const XK_TAB: u32 = 0xff09;
const XK_RETURN: u32 = 0xff0d;
const XK_ESCAPE: u32 = 0xff1b;
const XK_HOME: u32 = 0xff50;
const XK_LEFT: u32 = 0xff51;
const XK_UP: u32 = 0xff52;
const XK_RIGHT: u32 = 0xff53;
const XK_DOWN: u32 = 0xff54;
const XK_PRIOR: u32 = 0xff55;
const XK_NEXT: u32 = 0xff56;
const XK_END: u32 = 0xff57;
const XK_INSERT: u32 = 0xff63;
const XK_F1: u32 = 0xffbe;
const XK_SHIFT_L: u32 = 0xffe1;
const XK_CONTROL_L: u32 = 0xffe3;
const XK_CAPS_LOCK: u32 = 0xffe5;
const XK_ALT_L: u32 = 0xffe9;
const XK_SUPER_L: u32 = 0xffeb;
const XK_DELETE: u32 = 0xffff;
const XK_ISO_LEVEL3_SHIFT: u32 = 0xfe03;

/// Keysyms for codepoints above Latin-1 are the codepoint with this bit set
/// (the X protocol Unicode keysym convention).
const UNICODE_KEYSYM_BASE: u32 = 0x0100_0000;

// ---------------------------------------------------------------------------
// Token -> keysym
// ---------------------------------------------------------------------------

/// Maps a normalized token to the keysym it should produce.
///
/// Returns `None` for tokens with no X11 representation (e.g. `function`,
/// which exists only as a hardware-level Fn key); callers skip those
/// silently.
fn token_to_keysym(token: &str) -> Option<u32> {
    let keysym = match token {
        "backspace" => XK_BACKSPACE,
        "tab" => XK_TAB,
        "enter" => XK_RETURN,
        "escape" => XK_ESCAPE,
        "home" => XK_HOME,
        "end" => XK_END,
        "left" => XK_LEFT,
        "up" => XK_UP,
        "right" => XK_RIGHT,
        "down" => XK_DOWN,
        "pageup" => XK_PRIOR,
        "pagedown" => XK_NEXT,
        "insert" => XK_INSERT,
        "delete" => XK_DELETE,
        "caps" => XK_CAPS_LOCK,
        "shift" => XK_SHIFT_L,
        // commandorcontrol resolves to Control away from macOS.
        "control" | "commandorcontrol" => XK_CONTROL_L,
        "alt" => XK_ALT_L,
        "altgr" => XK_ISO_LEVEL3_SHIFT,
        // There is no distinct Command key under X11; Super is the closest.
        "meta" | "command" => XK_SUPER_L,
        "space" => 0x20,
        "function" => return None,
        _ => {
            if let Some(n) = token.strip_prefix('f').and_then(|r| r.parse::<u32>().ok()) {
                if (1..=12).contains(&n) && token.len() > 1 {
                    return Some(XK_F1 + n - 1);
                }
            }

            let mut chars = token.chars();
            let c = chars.next()?;
            if chars.next().is_some() {
                return None;
            }
            let cp = c as u32;
            if (0x20..=0xff).contains(&cp) {
                cp
            } else {
                UNICODE_KEYSYM_BASE | cp
            }
        }
    };
    Some(keysym)
}

// ---------------------------------------------------------------------------
// Live keyboard mapping
// ---------------------------------------------------------------------------

/// A snapshot of the server's keycode -> keysym table, valid for the
/// duration of one facade call.
pub(super) struct KeyMap {
    min_keycode: u8,
    keysyms_per_keycode: usize,
    keysyms: Vec<u32>,
}

impl KeyMap {
    /// Fetches the current mapping from the server.
    pub(super) fn fetch(conn: &RustConnection) -> Result<Self, DriverError> {
        let setup = x11rb::connection::Connection::setup(conn);
        let min_keycode = setup.min_keycode;
        let count = setup.max_keycode - min_keycode + 1;

        let reply = xproto::get_keyboard_mapping(conn, min_keycode, count)
            .map_err(|e| DriverError::Platform(format!("get_keyboard_mapping: {e}")))?
            .reply()
            .map_err(|e| DriverError::Platform(format!("get_keyboard_mapping reply: {e}")))?;

        Ok(KeyMap {
            min_keycode,
            keysyms_per_keycode: reply.keysyms_per_keycode as usize,
            keysyms: reply.keysyms,
        })
    }

    /// Resolves a normalized token to a physical keycode plus the modifier
    /// state required to produce it under this mapping.
    pub(super) fn resolve(&self, token: &str) -> Option<ResolvedKey> {
        let keysym = token_to_keysym(token)?;
        scan_mapping(
            &self.keysyms,
            self.keysyms_per_keycode,
            self.min_keycode,
            keysym,
        )
    }
}

/// Scans a keysym table for the first keycode producing `keysym`.
///
/// Shift-level columns follow the core-protocol convention for a
/// single-group layout: 0 = plain, 1 = shift, 2 = altgr (level three),
/// 3 = shift+altgr. Higher columns belong to other groups and are ignored.
fn scan_mapping(keysyms: &[u32], per_keycode: usize, min_keycode: u8, keysym: u32) -> Option<ResolvedKey> {
    if per_keycode == 0 {
        return None;
    }

    for (index, columns) in keysyms.chunks(per_keycode).enumerate() {
        for (level, &sym) in columns.iter().take(4).enumerate() {
            if sym == keysym {
                return Some(ResolvedKey {
                    code: u32::from(min_keycode) + index as u32,
                    shift: level & 1 == 1,
                    altgr: level >= 2,
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
    fn symbolic_tokens_map_to_keysyms() {
        assert_eq!(token_to_keysym("enter"), Some(XK_RETURN));
        assert_eq!(token_to_keysym("shift"), Some(XK_SHIFT_L));
        assert_eq!(token_to_keysym("altgr"), Some(XK_ISO_LEVEL3_SHIFT));
        assert_eq!(token_to_keysym("pageup"), Some(XK_PRIOR));
        assert_eq!(token_to_keysym("f1"), Some(XK_F1));
        assert_eq!(token_to_keysym("f12"), Some(XK_F1 + 11));
    }

    #[test]
    fn latin1_characters_are_their_own_keysym() {
        assert_eq!(token_to_keysym("a"), Some(0x61));
        assert_eq!(token_to_keysym("A"), Some(0x41));
        assert_eq!(token_to_keysym("!"), Some(0x21));
        assert_eq!(token_to_keysym("ß"), Some(0xdf));
    }

    #[test]
    fn wide_characters_use_the_unicode_keysym_range() {
        assert_eq!(token_to_keysym("€"), Some(UNICODE_KEYSYM_BASE | 0x20ac));
        assert_eq!(token_to_keysym("д"), Some(UNICODE_KEYSYM_BASE | 0x0434));
    }

    #[test]
    fn unmappable_tokens_return_none() {
        assert_eq!(token_to_keysym("function"), None);
        assert_eq!(token_to_keysym("f13"), None);
        assert_eq!(token_to_keysym("nosuchkey"), None);
    }

    /// A miniature US-style mapping: keycode 38 = a/A, keycode 10 = 1/!,
    /// keycode 24 = q/Q with @ on the altgr level.
    fn sample_mapping() -> Vec<u32> {
        vec![
            0x31, 0x21, 0, 0, // keycode 10: '1', '!'
            0x71, 0x51, 0x40, 0, // keycode 11: 'q', 'Q', altgr '@'
            0x61, 0x41, 0, 0, // keycode 12: 'a', 'A'
        ]
    }

    #[test]
    fn plain_character_resolves_without_modifiers() {
        let resolved = scan_mapping(&sample_mapping(), 4, 10, 0x61).unwrap();
        assert_eq!(resolved.code, 12);
        assert!(!resolved.shift);
        assert!(!resolved.altgr);
    }

    #[test]
    fn shifted_character_sets_shift() {
        let resolved = scan_mapping(&sample_mapping(), 4, 10, 0x21).unwrap();
        assert_eq!(resolved.code, 10);
        assert!(resolved.shift);
        assert!(!resolved.altgr);
    }

    #[test]
    fn third_level_character_sets_altgr() {
        let resolved = scan_mapping(&sample_mapping(), 4, 10, 0x40).unwrap();
        assert_eq!(resolved.code, 11);
        assert!(!resolved.shift);
        assert!(resolved.altgr);
    }

    #[test]
    fn absent_keysym_resolves_to_none() {
        assert_eq!(scan_mapping(&sample_mapping(), 4, 10, 0x7a), None);
        assert_eq!(scan_mapping(&[], 4, 10, 0x61), None);
        assert_eq!(scan_mapping(&sample_mapping(), 0, 10, 0x61), None);
    }
}
