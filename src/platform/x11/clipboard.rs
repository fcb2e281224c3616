//! X11 clipboard access.
//!
//! Reading is a native selection transfer: a throwaway window requests
//! `CLIPBOARD` as `UTF8_STRING` and waits (bounded) for the owner's
//! `SelectionNotify`. Writing goes through `xclip`, which forks and keeps
//! serving the selection after this process moves on -- an X11 client
//! cannot restore a clipboard it does not keep owning.

use std::io::Write;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use x11rb::connection::Connection;
use x11rb::protocol::xproto::{self, AtomEnum, CreateWindowAux, Window, WindowClass};
use x11rb::protocol::Event;
use x11rb::rust_connection::RustConnection;

use super::winctl::intern;
use crate::error::DriverError;

/// How long to wait for the selection owner to answer before giving up.
const SELECTION_TIMEOUT: Duration = Duration::from_millis(500);

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// Reads the clipboard as UTF-8 text. An unowned selection, a non-text
/// owner, or an unresponsive owner all read as `None`.
pub(super) fn read(conn: &RustConnection, root: Window) -> Result<Option<String>, DriverError> {
    let clipboard = intern(conn, "CLIPBOARD")?;
    let utf8_string = intern(conn, "UTF8_STRING")?;
    let transfer = intern(conn, "XSEL_DATA")?;
    let incr = intern(conn, "INCR")?;

    let window = conn
        .generate_id()
        .map_err(|e| DriverError::Platform(format!("generate_id: {e}")))?;
    xproto::create_window(
        conn,
        x11rb::COPY_DEPTH_FROM_PARENT,
        window,
        root,
        0,
        0,
        1,
        1,
        0,
        WindowClass::INPUT_OUTPUT,
        x11rb::COPY_FROM_PARENT,
        &CreateWindowAux::new(),
    )
    .map_err(|e| DriverError::Platform(format!("create_window: {e}")))?;

    let result = transfer_selection(conn, window, clipboard, utf8_string, transfer, incr);

    // Tear the requestor window down on every path before surfacing the
    // transfer outcome.
    let _ = xproto::destroy_window(conn, window);
    let _ = conn.flush();

    result
}

fn transfer_selection(
    conn: &RustConnection,
    window: Window,
    clipboard: u32,
    utf8_string: u32,
    transfer: u32,
    incr: u32,
) -> Result<Option<String>, DriverError> {
    xproto::convert_selection(conn, window, clipboard, utf8_string, transfer, x11rb::CURRENT_TIME)
        .map_err(|e| DriverError::Platform(format!("convert_selection: {e}")))?;
    conn.flush()
        .map_err(|e| DriverError::Platform(format!("flush: {e}")))?;

    let deadline = Instant::now() + SELECTION_TIMEOUT;
    let notify = loop {
        match conn.poll_for_event() {
            Ok(Some(Event::SelectionNotify(event))) if event.selection == clipboard => break event,
            Ok(_) => {}
            Err(e) => return Err(DriverError::Platform(format!("poll_for_event: {e}"))),
        }
        if Instant::now() >= deadline {
            log::debug!("clipboard owner did not answer within {SELECTION_TIMEOUT:?}");
            return Ok(None);
        }
        std::thread::sleep(Duration::from_millis(2));
    };

    if notify.property == x11rb::NONE {
        // Owner refused the target (e.g. image-only clipboard).
        return Ok(None);
    }

    let reply = xproto::get_property(conn, false, window, transfer, AtomEnum::ANY, 0, u32::MAX / 4)
        .map_err(|e| DriverError::Platform(format!("get_property: {e}")))?
        .reply()
        .map_err(|e| DriverError::Platform(format!("get_property reply: {e}")))?;

    // Incremental transfers are larger than any editor state we probe for;
    // treat them like an unreadable clipboard.
    if reply.type_ == incr {
        log::debug!("clipboard owner offered an INCR transfer, skipping");
        return Ok(None);
    }

    Ok(Some(String::from_utf8_lossy(&reply.value).into_owned()))
}

// ---------------------------------------------------------------------------
// Writing / restore
// ---------------------------------------------------------------------------

/// Hands `content` to `xclip`, which takes selection ownership and serves it
/// after we return. Best-effort: a missing `xclip` downgrades the clipboard
/// restore, it does not fail the operation that triggered it.
fn write_via_xclip(content: &str) -> std::io::Result<()> {
    let mut child = Command::new("xclip")
        .args(["-selection", "clipboard"])
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(content.as_bytes())?;
        // Drop stdin to close the pipe so xclip can finish.
    }

    child.wait().map(|_| ())
}

/// Snapshot of the clipboard taken before a fallback probe mutates it.
/// Restores on drop, so every exit path -- including early returns -- puts
/// the user's clipboard back.
pub(super) struct ClipboardRestore {
    saved: Option<String>,
}

impl ClipboardRestore {
    pub(super) fn snapshot(conn: &RustConnection, root: Window) -> Self {
        let saved = read(conn, root).unwrap_or_default();
        ClipboardRestore { saved }
    }
}

impl Drop for ClipboardRestore {
    fn drop(&mut self) {
        let Some(saved) = self.saved.take() else {
            return;
        };
        if let Err(e) = write_via_xclip(&saved) {
            log::debug!("clipboard restore via xclip failed: {e}");
        }
    }
}
