//! macOS window and application control.
//!
//! Applications are discovered through the window server: every on-screen
//! window's owner PID maps to an `NSRunningApplication`, whose bundle path
//! is the process identity. Activation goes through AppKit rather than the
//! accessibility API -- `NSRunningApplication` activation is exempt from
//! the focus-stealing rules that bind ordinary processes.

use objc2_app_kit::{NSApplicationActivationOptions, NSRunningApplication, NSWorkspace};
use objc2_core_foundation::{CFArray, CFDictionary, CFNumber, CFNumberType, CFRetained, CFString};
use objc2_core_graphics::{kCGNullWindowID, CGWindowListCopyWindowInfo, CGWindowListOption};

use super::ax;
use crate::error::DriverError;
use crate::types::WindowBounds;

// ---------------------------------------------------------------------------
// CFDictionary plumbing
// ---------------------------------------------------------------------------

fn dictionary_number(dict: &CFDictionary, key: &str) -> i32 {
    let key = CFString::from_str(key);
    let key_ref = key.as_ref() as *const CFString;
    unsafe {
        if !CFDictionary::contains_ptr_key(dict, key_ref.cast()) {
            return 0;
        }
        let value = CFDictionary::value(dict, key_ref.cast()).cast::<CFNumber>();
        let mut number: i32 = 0;
        CFNumber::value(
            &*value,
            CFNumberType::IntType,
            (&raw mut number).cast::<std::ffi::c_void>(),
        );
        number
    }
}

/// Owner PIDs of every on-screen, non-desktop window, deduplicated in
/// z-order.
fn on_screen_owner_pids() -> Vec<i32> {
    let mut pids: Vec<i32> = Vec::new();

    let option =
        CGWindowListOption::OptionOnScreenOnly | CGWindowListOption::ExcludeDesktopElements;
    let Some(window_list) = CGWindowListCopyWindowInfo(option, kCGNullWindowID) else {
        return pids;
    };

    for index in 0..CFArray::count(&window_list) {
        let dict_ref =
            unsafe { CFArray::value_at_index(&window_list, index).cast::<CFDictionary>() };
        if dict_ref.is_null() {
            continue;
        }
        let dict = unsafe { CFRetained::retain(std::ptr::NonNull::from(&*dict_ref)) };

        let pid = dictionary_number(&dict, "kCGWindowOwnerPID");
        if pid != 0 && !pids.contains(&pid) {
            pids.push(pid);
        }
    }

    pids
}

fn running_application(pid: i32) -> Option<&'static NSRunningApplication> {
    let app: *mut NSRunningApplication = unsafe {
        objc2::msg_send![
            objc2::class!(NSRunningApplication),
            runningApplicationWithProcessIdentifier: pid
        ]
    };
    if app.is_null() {
        None
    } else {
        Some(unsafe { &*app })
    }
}

fn bundle_path(app: &NSRunningApplication) -> Option<String> {
    let url = unsafe { app.bundleURL() }?;
    let path = unsafe { url.path() }?;
    Some(path.to_string())
}

pub(super) fn normalize_identity(raw: &str) -> String {
    raw.to_lowercase().split_whitespace().collect()
}

// ---------------------------------------------------------------------------
// Facade operations
// ---------------------------------------------------------------------------

pub(super) fn running_applications() -> Result<Vec<String>, DriverError> {
    let mut identities: Vec<String> = objc2::rc::autoreleasepool(|_pool| {
        on_screen_owner_pids()
            .into_iter()
            .filter_map(running_application)
            .filter_map(bundle_path)
            .map(|path| normalize_identity(&path))
            .collect()
    });

    identities.sort();
    identities.dedup();
    Ok(identities)
}

/// Bundle path plus bundle identifier of the frontmost application, or the
/// `"system dialog"` sentinel when a modal dialog or sheet holds focus --
/// callers treat those as not belonging to any application.
pub(super) fn active_application() -> Result<String, DriverError> {
    objc2::rc::autoreleasepool(|_pool| {
        let workspace = unsafe { NSWorkspace::sharedWorkspace() };
        let Some(app) = (unsafe { workspace.frontmostApplication() }) else {
            return Ok(String::new());
        };

        if ax::accessibility_trusted() {
            if let Some(window) = ax::focused_window() {
                let role = window.role_description();
                if role == "dialog" || role == "sheet" {
                    return Ok("system dialog".into());
                }
            }
        }

        let path = bundle_path(&app).unwrap_or_default();
        let bundle_id = unsafe { app.bundleIdentifier() }
            .map(|s| s.to_string())
            .unwrap_or_default();
        Ok(normalize_identity(&format!("{path} {bundle_id}")))
    })
}

pub(super) fn active_window_bounds() -> Result<WindowBounds, DriverError> {
    let Some(window) = ax::focused_window() else {
        return Ok(WindowBounds::default());
    };
    let Some((origin, size)) = window.position_and_size() else {
        return Ok(WindowBounds::default());
    };

    Ok(WindowBounds {
        x: origin.x as i32,
        y: origin.y as i32,
        width: size.width as i32,
        height: size.height as i32,
    })
}

/// Unhides and activates every on-screen application whose bundle path
/// contains `name`. Activation ignores other apps so focus moves even when
/// this process is in the background.
pub(super) fn focus_application(name: &str) -> Result<(), DriverError> {
    let needle = normalize_identity(name);
    if needle.is_empty() {
        return Ok(());
    }

    objc2::rc::autoreleasepool(|_pool| {
        for pid in on_screen_owner_pids() {
            let Some(app) = running_application(pid) else {
                continue;
            };
            let Some(path) = bundle_path(app) else {
                continue;
            };
            if !normalize_identity(&path).contains(&needle) {
                continue;
            }

            unsafe {
                app.unhide();
                app.activateWithOptions(
                    NSApplicationActivationOptions::ActivateIgnoringOtherApps,
                );
            }
            return Ok(());
        }

        log::debug!("focus_application: no running application matches {needle:?}");
        Ok(())
    })
}

/// Bundle identifier of the frontmost application, for quirk lookup.
pub(super) fn frontmost_bundle_id() -> String {
    let workspace = unsafe { NSWorkspace::sharedWorkspace() };
    unsafe { workspace.frontmostApplication() }
        .and_then(|app| unsafe { app.bundleIdentifier() }.map(|s| s.to_string()))
        .unwrap_or_default()
}
