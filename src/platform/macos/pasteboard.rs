//! NSPasteboard access for the clipboard fallback.

use objc2_app_kit::{NSPasteboard, NSPasteboardTypeString};
use objc2_foundation::NSString;

pub(super) fn read() -> Option<String> {
    let pasteboard = unsafe { NSPasteboard::generalPasteboard() };
    let contents = unsafe { pasteboard.stringForType(NSPasteboardTypeString) }?;
    Some(contents.to_string())
}

fn write(text: &str) {
    let pasteboard = unsafe { NSPasteboard::generalPasteboard() };
    unsafe {
        pasteboard.clearContents();
        pasteboard.setString_forType(&NSString::from_str(text), NSPasteboardTypeString);
    }
}

/// Snapshot of the pasteboard taken before a fallback probe mutates it.
/// Restores on drop so every exit path puts the user's clipboard back.
pub(super) struct PasteboardRestore {
    saved: Option<String>,
}

impl PasteboardRestore {
    pub(super) fn snapshot() -> Self {
        PasteboardRestore { saved: read() }
    }
}

impl Drop for PasteboardRestore {
    fn drop(&mut self) {
        if let Some(saved) = self.saved.take() {
            write(&saved);
        }
    }
}
