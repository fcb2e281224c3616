//! X11 window and application control.
//!
//! Window discovery goes through the EWMH root-window properties
//! (`_NET_CLIENT_LIST`, `_NET_ACTIVE_WINDOW`); a window's owning process is
//! resolved via `_NET_WM_PID` and `/proc/<pid>/cmdline`. Windows that do not
//! set these properties simply drop out of the results -- a missing property
//! is an empty result, never an error.

use x11rb::connection::Connection;
use x11rb::protocol::xproto::{self, Atom, AtomEnum, ClientMessageEvent, EventMask, Window};
use x11rb::rust_connection::RustConnection;

use crate::error::DriverError;
use crate::types::WindowBounds;

// ---------------------------------------------------------------------------
// Property plumbing
// ---------------------------------------------------------------------------

pub(super) fn intern(conn: &RustConnection, name: &str) -> Result<Atom, DriverError> {
    Ok(xproto::intern_atom(conn, false, name.as_bytes())
        .map_err(|e| DriverError::Platform(format!("intern_atom {name}: {e}")))?
        .reply()
        .map_err(|e| DriverError::Platform(format!("intern_atom {name} reply: {e}")))?
        .atom)
}

/// Reads a 32-bit-format property as a list of u32 values. Missing or
/// malformed properties read as empty.
fn property_u32s(conn: &RustConnection, window: Window, property: Atom, r#type: AtomEnum) -> Vec<u32> {
    let reply = xproto::get_property(conn, false, window, property, r#type, 0, 1024)
        .ok()
        .and_then(|cookie| cookie.reply().ok());

    match reply {
        Some(reply) if reply.format == 32 => reply
            .value32()
            .map(|values| values.collect())
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

// ---------------------------------------------------------------------------
// Window discovery
// ---------------------------------------------------------------------------

/// All client windows known to the window manager, in stacking-list order.
pub(super) fn client_list(conn: &RustConnection, root: Window) -> Result<Vec<Window>, DriverError> {
    let atom = intern(conn, "_NET_CLIENT_LIST")?;
    Ok(property_u32s(conn, root, atom, AtomEnum::WINDOW))
}

/// The window currently holding input focus, if the window manager exposes
/// one.
pub(super) fn active_window(conn: &RustConnection, root: Window) -> Result<Option<Window>, DriverError> {
    let atom = intern(conn, "_NET_ACTIVE_WINDOW")?;
    Ok(property_u32s(conn, root, atom, AtomEnum::WINDOW)
        .first()
        .copied()
        .filter(|&w| w != 0))
}

/// Normalized identity of the process owning `window`: argv[0] of its
/// command line, lowercased with whitespace stripped.
pub(super) fn process_identity(conn: &RustConnection, window: Window) -> Option<String> {
    let pid_atom = intern(conn, "_NET_WM_PID").ok()?;
    let pid = *property_u32s(conn, window, pid_atom, AtomEnum::CARDINAL).first()?;

    let cmdline = std::fs::read(format!("/proc/{pid}/cmdline")).ok()?;
    let argv0 = cmdline.split(|&b| b == 0).next()?;
    if argv0.is_empty() {
        return None;
    }

    Some(normalize_identity(&String::from_utf8_lossy(argv0)))
}

/// Lowercases and strips whitespace; both the active-application result and
/// the focus-by-name membership test use this form.
pub(super) fn normalize_identity(raw: &str) -> String {
    raw.to_lowercase().split_whitespace().collect()
}

// ---------------------------------------------------------------------------
// Facade operations
// ---------------------------------------------------------------------------

pub(super) fn running_applications(
    conn: &RustConnection,
    root: Window,
) -> Result<Vec<String>, DriverError> {
    let mut identities: Vec<String> = client_list(conn, root)?
        .into_iter()
        .filter_map(|window| process_identity(conn, window))
        .collect();

    identities.sort();
    identities.dedup();
    Ok(identities)
}

pub(super) fn active_application(conn: &RustConnection, root: Window) -> Result<String, DriverError> {
    Ok(active_window(conn, root)?
        .and_then(|window| process_identity(conn, window))
        .unwrap_or_default())
}

pub(super) fn active_window_bounds(
    conn: &RustConnection,
    root: Window,
) -> Result<WindowBounds, DriverError> {
    let Some(window) = active_window(conn, root)? else {
        return Ok(WindowBounds::default());
    };

    let Some(geometry) = xproto::get_geometry(conn, window)
        .ok()
        .and_then(|cookie| cookie.reply().ok())
    else {
        return Ok(WindowBounds::default());
    };

    // Window coordinates are parent-relative; translate to root space.
    let origin = xproto::translate_coordinates(conn, window, root, 0, 0)
        .ok()
        .and_then(|cookie| cookie.reply().ok());

    let (x, y) = match origin {
        Some(t) => (i32::from(t.dst_x), i32::from(t.dst_y)),
        None => (i32::from(geometry.x), i32::from(geometry.y)),
    };

    Ok(WindowBounds {
        x,
        y,
        width: i32::from(geometry.width),
        height: i32::from(geometry.height),
    })
}

/// True when the window has non-degenerate geometry; windows collapsed to a
/// line or point are not focus candidates.
fn has_visible_geometry(conn: &RustConnection, window: Window) -> bool {
    xproto::get_geometry(conn, window)
        .ok()
        .and_then(|cookie| cookie.reply().ok())
        .map(|g| g.width > 1 && g.height > 1)
        .unwrap_or(false)
}

/// Asks the window manager to raise the first window whose identity
/// contains `name`. The `_NET_ACTIVE_WINDOW` client message (source
/// indication 1 = application) makes the WM handle unmapping, stacking, and
/// focus itself, so no focus-stealing workaround is needed here.
pub(super) fn focus_application(
    conn: &RustConnection,
    root: Window,
    name: &str,
) -> Result<(), DriverError> {
    let needle = normalize_identity(name);
    if needle.is_empty() {
        return Ok(());
    }

    let active_atom = intern(conn, "_NET_ACTIVE_WINDOW")?;

    for window in client_list(conn, root)? {
        let Some(identity) = process_identity(conn, window) else {
            continue;
        };
        if !identity.contains(&needle) || !has_visible_geometry(conn, window) {
            continue;
        }

        let event = ClientMessageEvent::new(
            32,
            window,
            active_atom,
            [1, x11rb::CURRENT_TIME, 0, 0, 0],
        );
        xproto::send_event(
            conn,
            false,
            root,
            EventMask::SUBSTRUCTURE_REDIRECT | EventMask::SUBSTRUCTURE_NOTIFY,
            event,
        )
        .map_err(|e| DriverError::Platform(format!("send_event: {e}")))?;
        conn.flush()
            .map_err(|e| DriverError::Platform(format!("flush: {e}")))?;
        return Ok(());
    }

    log::debug!("focus_application: no window matches {needle:?}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_normalization_lowercases_and_strips() {
        assert_eq!(normalize_identity("/usr/bin/Code --no-sandbox"), "/usr/bin/code--no-sandbox");
        assert_eq!(normalize_identity("Google Chrome"), "googlechrome");
        assert_eq!(normalize_identity(""), "");
    }
}
