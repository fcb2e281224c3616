//! Per-application quirks for the clipboard fallback.
//!
//! A few applications need deviations from the general fallback algorithm.
//! These are app-specific observations, not general rules -- keep them in
//! this table rather than folding them into the algorithm, and do not
//! assume they transfer to other applications.

/// Deviations applied while probing one specific application.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(super) struct AppQuirks {
    /// Slack's message box copies list items with a literal bullet prefix
    /// that is not part of the editable text.
    pub strip_bullets: bool,
    /// Sandboxed builds reject the synthesized arrow keys used to collapse
    /// the probe selection; skip the collapse and accept that the caret
    /// ends up at the probed boundary.
    pub skip_cursor_restore: bool,
}

/// Quirks for the application owning the focused control, looked up by
/// bundle identifier.
pub(super) fn for_bundle(bundle_id: &str) -> AppQuirks {
    match bundle_id {
        "com.tinyspeck.slackmacgap" => AppQuirks {
            strip_bullets: true,
            skip_cursor_restore: false,
        },
        // App Store (sandboxed) Slack build.
        "com.tinyspeck.slackmacgap.mas" => AppQuirks {
            strip_bullets: true,
            skip_cursor_restore: true,
        },
        _ => AppQuirks::default(),
    }
}

/// Strips the copied-bullet artifacts Slack prepends to list items.
pub(super) fn strip_bullet_prefixes(text: &str) -> String {
    text.lines()
        .map(|line| line.strip_prefix("\u{2022} ").unwrap_or(line))
        .collect::<Vec<_>>()
        .join("\n")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_bundles_get_no_quirks() {
        assert_eq!(for_bundle("com.apple.TextEdit"), AppQuirks::default());
        assert_eq!(for_bundle(""), AppQuirks::default());
    }

    #[test]
    fn slack_strips_bullets() {
        assert!(for_bundle("com.tinyspeck.slackmacgap").strip_bullets);
    }

    #[test]
    fn bullet_prefixes_are_removed_per_line() {
        let copied = "\u{2022} first\n\u{2022} second\nplain";
        assert_eq!(strip_bullet_prefixes(copied), "first\nsecond\nplain");
    }

    #[test]
    fn text_without_bullets_is_untouched() {
        assert_eq!(strip_bullet_prefixes("hello world"), "hello world");
    }
}
