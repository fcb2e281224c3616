//! Ordered key-event sequencing.
//!
//! A compound press is a strict bracket: layout-required shift, then
//! layout-required altgr, then the caller's modifiers go down; the main key
//! goes down and up; everything is released in exactly reverse order. The
//! X11 and Windows synthesizers walk the step list and emit one (or, for
//! Windows AltGr, two) native events per step; macOS folds caller modifiers
//! into CGEvent flag masks but follows the same sticky rules.
//!
//! Sticky modifiers are modifiers the caller holds across several calls via
//! an explicit `toggle_key`. A sticky modifier is never synthesized inside a
//! press bracket -- emitting its up-transition there would silently break
//! the caller's hold.

// ---------------------------------------------------------------------------
// Step types
// ---------------------------------------------------------------------------

/// What a sequence step toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeqKey<'a> {
    /// Shift companion required by the layout to produce the character.
    Shift,
    /// AltGr companion required by the layout (third-level character).
    AltGr,
    /// A caller-supplied modifier token, already normalized.
    Modifier(&'a str),
    /// The key being pressed.
    Main,
}

/// A single down or up transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeqStep<'a> {
    pub key: SeqKey<'a>,
    pub down: bool,
}

impl<'a> SeqStep<'a> {
    const fn down(key: SeqKey<'a>) -> Self {
        SeqStep { key, down: true }
    }

    const fn up(key: SeqKey<'a>) -> Self {
        SeqStep { key, down: false }
    }
}

fn holds(sticky: &[String], token: &str) -> bool {
    sticky.iter().any(|s| s == token)
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

/// One full press of the main key bracketed by its modifiers.
///
/// `shift`/`altgr` are the layout-required companions reported by the key
/// resolver. Modifiers named in `sticky` are assumed held by the caller and
/// produce no steps.
pub fn press_steps<'a>(
    shift: bool,
    altgr: bool,
    modifiers: &'a [String],
    sticky: &'a [String],
) -> Vec<SeqStep<'a>> {
    let mut steps = Vec::new();

    if shift && !holds(sticky, "shift") {
        steps.push(SeqStep::down(SeqKey::Shift));
    }
    if altgr && !holds(sticky, "altgr") {
        steps.push(SeqStep::down(SeqKey::AltGr));
    }
    for modifier in modifiers {
        if !holds(sticky, modifier) {
            steps.push(SeqStep::down(SeqKey::Modifier(modifier.as_str())));
        }
    }

    steps.push(SeqStep::down(SeqKey::Main));
    steps.push(SeqStep::up(SeqKey::Main));

    for modifier in modifiers.iter().rev() {
        if !holds(sticky, modifier) {
            steps.push(SeqStep::up(SeqKey::Modifier(modifier.as_str())));
        }
    }
    if altgr && !holds(sticky, "altgr") {
        steps.push(SeqStep::up(SeqKey::AltGr));
    }
    if shift && !holds(sticky, "shift") {
        steps.push(SeqStep::up(SeqKey::Shift));
    }

    steps
}

/// A `count`-press sequence. Sticky modifiers go down once up front and stay
/// down; their release is the caller's explicit `toggle_key`. `count < 1`
/// yields no steps at all (the documented no-op).
pub fn press_key_steps<'a>(
    shift: bool,
    altgr: bool,
    modifiers: &'a [String],
    sticky: &'a [String],
    count: i32,
) -> Vec<SeqStep<'a>> {
    if count < 1 {
        return Vec::new();
    }

    let mut steps: Vec<SeqStep<'a>> = sticky
        .iter()
        .map(|s| SeqStep::down(SeqKey::Modifier(s.as_str())))
        .collect();

    for _ in 0..count {
        steps.extend(press_steps(shift, altgr, modifiers, sticky));
    }

    steps
}

/// A single down or up transition of the main key with its layout
/// companions. Down brackets open (shift, altgr, main); up brackets close in
/// reverse (main, altgr, shift).
pub fn toggle_steps<'a>(shift: bool, altgr: bool, sticky: &'a [String], down: bool) -> Vec<SeqStep<'a>> {
    let mut steps = Vec::new();

    if down {
        if shift && !holds(sticky, "shift") {
            steps.push(SeqStep::down(SeqKey::Shift));
        }
        if altgr && !holds(sticky, "altgr") {
            steps.push(SeqStep::down(SeqKey::AltGr));
        }
        steps.push(SeqStep::down(SeqKey::Main));
    } else {
        steps.push(SeqStep::up(SeqKey::Main));
        if altgr && !holds(sticky, "altgr") {
            steps.push(SeqStep::up(SeqKey::AltGr));
        }
        if shift && !holds(sticky, "shift") {
            steps.push(SeqStep::up(SeqKey::Shift));
        }
    }

    steps
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn mods(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    /// Downs and ups mirror each other exactly: reversing the up half and
    /// flipping its direction reproduces the down half.
    #[test]
    fn press_is_symmetric() {
        let modifiers = mods(&["control", "alt"]);
        let steps = press_steps(true, true, &modifiers, &[]);

        let downs: Vec<_> = steps.iter().filter(|s| s.down).map(|s| s.key).collect();
        let mut ups: Vec<_> = steps.iter().filter(|s| !s.down).map(|s| s.key).collect();
        ups.reverse();

        assert_eq!(downs, ups);
    }

    #[test]
    fn press_order_brackets_main_key() {
        let modifiers = mods(&["control"]);
        let steps = press_steps(true, false, &modifiers, &[]);

        assert_eq!(
            steps,
            vec![
                SeqStep::down(SeqKey::Shift),
                SeqStep::down(SeqKey::Modifier("control")),
                SeqStep::down(SeqKey::Main),
                SeqStep::up(SeqKey::Main),
                SeqStep::up(SeqKey::Modifier("control")),
                SeqStep::up(SeqKey::Shift),
            ]
        );
    }

    #[test]
    fn zero_and_negative_counts_produce_nothing() {
        let sticky = mods(&["shift"]);
        assert!(press_key_steps(false, false, &[], &sticky, 0).is_empty());
        assert!(press_key_steps(false, false, &[], &sticky, -3).is_empty());
    }

    #[test]
    fn count_presses_main_exactly_count_times() {
        let steps = press_key_steps(false, false, &[], &[], 3);
        let main_downs = steps
            .iter()
            .filter(|s| s.key == SeqKey::Main && s.down)
            .count();
        let main_ups = steps
            .iter()
            .filter(|s| s.key == SeqKey::Main && !s.down)
            .count();
        assert_eq!(main_downs, 3);
        assert_eq!(main_ups, 3);
    }

    #[test]
    fn sticky_modifier_goes_down_once_and_never_up() {
        let sticky = mods(&["shift"]);
        let steps = press_key_steps(false, false, &[], &sticky, 2);

        let shift_downs = steps
            .iter()
            .filter(|s| s.key == SeqKey::Modifier("shift") && s.down)
            .count();
        let shift_ups = steps
            .iter()
            .filter(|s| s.key == SeqKey::Modifier("shift") && !s.down)
            .count();
        assert_eq!(shift_downs, 1);
        assert_eq!(shift_ups, 0);
    }

    /// A layout-detected shift companion must not be synthesized while the
    /// caller holds shift sticky -- its up edge would end the hold.
    #[test]
    fn detected_shift_skipped_while_sticky() {
        let sticky = mods(&["shift"]);
        let steps = press_steps(true, false, &[], &sticky);
        assert!(steps.iter().all(|s| s.key != SeqKey::Shift));
    }

    #[test]
    fn caller_modifier_skipped_while_sticky() {
        let modifiers = mods(&["control"]);
        let sticky = mods(&["control"]);
        let steps = press_steps(false, false, &modifiers, &sticky);
        assert_eq!(
            steps,
            vec![SeqStep::down(SeqKey::Main), SeqStep::up(SeqKey::Main)]
        );
    }

    #[test]
    fn toggle_down_then_up_releases_in_reverse() {
        let down = toggle_steps(true, true, &[], true);
        let up = toggle_steps(true, true, &[], false);

        assert_eq!(
            down,
            vec![
                SeqStep::down(SeqKey::Shift),
                SeqStep::down(SeqKey::AltGr),
                SeqStep::down(SeqKey::Main),
            ]
        );
        assert_eq!(
            up,
            vec![
                SeqStep::up(SeqKey::Main),
                SeqStep::up(SeqKey::AltGr),
                SeqStep::up(SeqKey::Shift),
            ]
        );
    }
}
