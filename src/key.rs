//! Key token vocabulary.
//!
//! Facade callers name keys with loose, human-facing tokens ("ctrl", "cmd",
//! "return", a literal punctuation character, a raw Unicode character).
//! `normalize` folds those onto the canonical vocabulary the per-platform
//! resolvers consume. Resolution itself is always dynamic against the live
//! keyboard layout and lives in each platform's `keymap` module.

// ---------------------------------------------------------------------------
// Resolved key
// ---------------------------------------------------------------------------

/// A physical key plus the modifier state required to produce the requested
/// character under the current layout.
///
/// `code` is an opaque platform keycode (X11 keycode, Carbon virtual key,
/// Windows virtual key). `extended` carries the Windows extended-key flag
/// alongside the code; the other platforms leave it false.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedKey {
    pub code: u32,
    pub shift: bool,
    pub altgr: bool,
    pub extended: bool,
}

impl ResolvedKey {
    pub fn plain(code: u32) -> Self {
        ResolvedKey {
            code,
            shift: false,
            altgr: false,
            extended: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Token normalization
// ---------------------------------------------------------------------------

/// Normalizes a caller-facing key token to the canonical vocabulary.
///
/// Single printable characters pass through untouched (their case carries
/// meaning: "A" requires shift, "a" does not). Multi-character names are
/// lowercased and folded through the alias table. `commandorcontrol` stays
/// canonical here; the platform resolvers map it to Command on macOS and
/// Control elsewhere.
pub fn normalize(token: &str) -> String {
    match token {
        "\n" => return "enter".into(),
        "\t" => return "tab".into(),
        " " => return "space".into(),
        _ => {}
    }

    if token.chars().count() == 1 {
        return token.into();
    }

    let lower = token.to_lowercase();
    match lower.as_str() {
        "ctrl" => "control".into(),
        "cmd" => "command".into(),
        "win" | "windows" | "super" => "meta".into(),
        "option" => "alt".into(),
        "fn" => "function".into(),
        "esc" => "escape".into(),
        "return" => "enter".into(),
        "caps" | "capslock" => "caps".into(),
        "pgup" => "pageup".into(),
        "pgdown" | "pgdn" => "pagedown".into(),
        _ => lower,
    }
}

/// True for tokens that act as held modifiers in a compound press.
pub fn is_modifier(token: &str) -> bool {
    matches!(
        token,
        "control" | "shift" | "alt" | "altgr" | "command" | "meta" | "function" | "commandorcontrol"
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modifier_aliases_normalize() {
        assert_eq!(normalize("ctrl"), "control");
        assert_eq!(normalize("Ctrl"), "control");
        assert_eq!(normalize("cmd"), "command");
        assert_eq!(normalize("win"), "meta");
        assert_eq!(normalize("windows"), "meta");
        assert_eq!(normalize("option"), "alt");
        assert_eq!(normalize("fn"), "function");
    }

    #[test]
    fn editing_key_aliases_normalize() {
        assert_eq!(normalize("return"), "enter");
        assert_eq!(normalize("esc"), "escape");
        assert_eq!(normalize("pgup"), "pageup");
        assert_eq!(normalize("pgdn"), "pagedown");
    }

    #[test]
    fn literal_whitespace_maps_to_named_keys() {
        assert_eq!(normalize("\n"), "enter");
        assert_eq!(normalize("\t"), "tab");
        assert_eq!(normalize(" "), "space");
    }

    #[test]
    fn single_characters_keep_case() {
        assert_eq!(normalize("a"), "a");
        assert_eq!(normalize("A"), "A");
        assert_eq!(normalize("!"), "!");
        assert_eq!(normalize("ß"), "ß");
    }

    #[test]
    fn symbolic_names_lowercase() {
        assert_eq!(normalize("Enter"), "enter");
        assert_eq!(normalize("F5"), "f5");
        assert_eq!(normalize("PageDown"), "pagedown");
    }

    #[test]
    fn commandorcontrol_stays_canonical() {
        assert_eq!(normalize("commandOrControl"), "commandorcontrol");
        assert!(is_modifier("commandorcontrol"));
    }

    #[test]
    fn modifier_classification() {
        for m in ["control", "shift", "alt", "altgr", "command", "meta", "function"] {
            assert!(is_modifier(m), "{m} should be a modifier");
        }
        assert!(!is_modifier("a"));
        assert!(!is_modifier("enter"));
    }
}
