//! Windows key resolution.
//!
//! Symbolic keys map to fixed virtual-key constants; Home and End
//! additionally need the extended-key flag on their `KEYBDINPUT` or the
//! navigation cluster is misread as numpad keys. Printable characters go
//! through `VkKeyScanW`, which consults the active keyboard layout on every
//! call and reports the required shift/altgr state in its high byte.

use windows_sys::Win32::UI::Input::KeyboardAndMouse::{
    VkKeyScanW, VK_BACK, VK_CAPITAL, VK_CONTROL, VK_DELETE, VK_DOWN, VK_END, VK_ESCAPE, VK_F1,
    VK_F10, VK_F11, VK_F12, VK_F2, VK_F3, VK_F4, VK_F5, VK_F6, VK_F7, VK_F8, VK_F9, VK_HOME,
    VK_INSERT, VK_LEFT, VK_LWIN, VK_MENU, VK_NEXT, VK_PRIOR, VK_RETURN, VK_RIGHT, VK_SHIFT,
    VK_SPACE, VK_TAB, VK_UP,
};

use crate::key::ResolvedKey;

fn symbolic_key(token: &str) -> Option<(u16, bool)> {
    let (code, extended) = match token {
        "left" => (VK_LEFT, false),
        "right" => (VK_RIGHT, false),
        "up" => (VK_UP, false),
        "down" => (VK_DOWN, false),
        // commandorcontrol resolves to Control away from macOS; there is no
        // Command key, and command itself is closest to the Windows key.
        "control" | "commandorcontrol" => (VK_CONTROL, false),
        "alt" => (VK_MENU, false),
        "shift" => (VK_SHIFT, false),
        "backspace" => (VK_BACK, false),
        "delete" => (VK_DELETE, false),
        "insert" => (VK_INSERT, false),
        "tab" => (VK_TAB, false),
        "space" => (VK_SPACE, false),
        "caps" => (VK_CAPITAL, false),
        "meta" | "command" => (VK_LWIN, false),
        "escape" => (VK_ESCAPE, false),
        "enter" => (VK_RETURN, false),
        "pageup" => (VK_PRIOR, false),
        "pagedown" => (VK_NEXT, false),
        "home" => (VK_HOME, true),
        "end" => (VK_END, true),
        "f1" => (VK_F1, false),
        "f2" => (VK_F2, false),
        "f3" => (VK_F3, false),
        "f4" => (VK_F4, false),
        "f5" => (VK_F5, false),
        "f6" => (VK_F6, false),
        "f7" => (VK_F7, false),
        "f8" => (VK_F8, false),
        "f9" => (VK_F9, false),
        "f10" => (VK_F10, false),
        "f11" => (VK_F11, false),
        "f12" => (VK_F12, false),
        _ => return None,
    };
    Some((code, extended))
}

/// Resolves a normalized token to a virtual key plus required modifiers.
///
/// Returns `None` when the active layout cannot type the character (or for
/// characters outside the BMP); the synthesizer then falls back to direct
/// Unicode injection.
pub(super) fn resolve(token: &str) -> Option<ResolvedKey> {
    if let Some((code, extended)) = symbolic_key(token) {
        return Some(ResolvedKey {
            code: u32::from(code),
            shift: false,
            altgr: false,
            extended,
        });
    }

    let mut chars = token.chars();
    let wanted = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    let unit = u16::try_from(wanted as u32).ok()?;

    // Low byte: virtual key. High byte: bit 0 = shift, bits 1-2 both set =
    // ctrl+alt, i.e. AltGr on layouts that use it.
    let scan = unsafe { VkKeyScanW(unit) };
    if scan == -1 {
        return None;
    }

    let high = (scan >> 8) & 0xff;
    Some(ResolvedKey {
        code: u32::from((scan & 0xff) as u16),
        shift: high & 1 == 1,
        altgr: (high >> 1) & 3 == 3,
        extended: false,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn navigation_cluster_carries_the_extended_flag() {
        assert!(resolve("home").unwrap().extended);
        assert!(resolve("end").unwrap().extended);
        assert!(!resolve("left").unwrap().extended);
    }

    #[test]
    fn symbolic_keys_resolve_plain() {
        let enter = resolve("enter").unwrap();
        assert_eq!(enter.code, u32::from(VK_RETURN));
        assert!(!enter.shift && !enter.altgr);
    }

    #[test]
    fn meta_aliases_resolve_to_the_windows_key() {
        assert_eq!(resolve("meta"), resolve("command"));
    }

    #[test]
    fn unknown_tokens_fail() {
        assert_eq!(resolve("nosuchkey"), None);
        assert_eq!(resolve("f13"), None);
    }
}
