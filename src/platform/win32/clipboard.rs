//! Win32 clipboard access for the editor-state fallback.
//!
//! The clipboard is a process-global lock: `OpenClipboard` must be paired
//! with `CloseClipboard` on every path, so the open handle is a guard type.
//! Text moves as CF_UNICODETEXT in a movable global allocation owned by the
//! clipboard after `SetClipboardData` succeeds.

use windows_sys::Win32::Foundation::{GlobalFree, HGLOBAL};
use windows_sys::Win32::System::DataExchange::{
    CloseClipboard, EmptyClipboard, GetClipboardData, IsClipboardFormatAvailable, OpenClipboard,
    SetClipboardData,
};
use windows_sys::Win32::System::Memory::{GlobalAlloc, GlobalLock, GlobalUnlock, GMEM_MOVEABLE};
use windows_sys::Win32::System::Ole::CF_UNICODETEXT;

/// Open clipboard handle; closes on drop.
struct OpenedClipboard;

impl OpenedClipboard {
    fn open() -> Option<Self> {
        if unsafe { OpenClipboard(std::ptr::null_mut()) } == 0 {
            return None;
        }
        Some(OpenedClipboard)
    }
}

impl Drop for OpenedClipboard {
    fn drop(&mut self) {
        unsafe { CloseClipboard() };
    }
}

// ---------------------------------------------------------------------------
// Read / write
// ---------------------------------------------------------------------------

pub(super) fn read() -> Option<String> {
    let _clipboard = OpenedClipboard::open()?;

    if unsafe { IsClipboardFormatAvailable(CF_UNICODETEXT as u32) } == 0 {
        return None;
    }

    let data = unsafe { GetClipboardData(CF_UNICODETEXT as u32) };
    if data.is_null() {
        return None;
    }

    unsafe {
        let text = GlobalLock(data as HGLOBAL).cast::<u16>();
        if text.is_null() {
            return None;
        }

        let mut length = 0;
        while *text.add(length) != 0 {
            length += 1;
        }
        let result = String::from_utf16_lossy(std::slice::from_raw_parts(text, length));

        GlobalUnlock(data as HGLOBAL);
        Some(result)
    }
}

fn write(text: &str) -> bool {
    let Some(_clipboard) = OpenedClipboard::open() else {
        return false;
    };

    let units: Vec<u16> = text.encode_utf16().chain(std::iter::once(0)).collect();
    let byte_len = units.len() * std::mem::size_of::<u16>();

    unsafe {
        if EmptyClipboard() == 0 {
            return false;
        }

        let allocation = GlobalAlloc(GMEM_MOVEABLE, byte_len);
        if allocation.is_null() {
            return false;
        }

        let target = GlobalLock(allocation).cast::<u16>();
        if target.is_null() {
            GlobalFree(allocation);
            return false;
        }
        std::ptr::copy_nonoverlapping(units.as_ptr(), target, units.len());
        GlobalUnlock(allocation);

        // On success the clipboard owns the allocation; on failure it is
        // still ours to free.
        if SetClipboardData(CF_UNICODETEXT as u32, allocation as _).is_null() {
            GlobalFree(allocation);
            return false;
        }
    }

    true
}

// ---------------------------------------------------------------------------
// Restore guard
// ---------------------------------------------------------------------------

/// Snapshot of the clipboard taken before a fallback probe mutates it.
/// Restores on drop so every exit path puts the user's clipboard back.
pub(super) struct ClipboardRestore {
    saved: Option<String>,
}

impl ClipboardRestore {
    pub(super) fn snapshot() -> Self {
        ClipboardRestore { saved: read() }
    }
}

impl Drop for ClipboardRestore {
    fn drop(&mut self) {
        if let Some(saved) = self.saved.take() {
            if !write(&saved) {
                log::debug!("clipboard restore failed");
            }
        }
    }
}
