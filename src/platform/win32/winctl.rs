//! Windows window and application control.
//!
//! Windows are discovered with `EnumWindows`; a window's identity is its
//! owning process image path, lowercased with whitespace stripped. Focus
//! changes work around the foreground-lock rules with the thread-input
//! attachment dance -- without it `SetForegroundWindow` from a background
//! process only flashes the taskbar button.

use windows_sys::Win32::Foundation::{CloseHandle, HWND, LPARAM, RECT};
use windows_sys::Win32::System::Threading::{
    GetCurrentThreadId, OpenProcess, QueryFullProcessImageNameW,
    PROCESS_QUERY_LIMITED_INFORMATION,
};
use windows_sys::Win32::UI::Input::KeyboardAndMouse::AttachThreadInput;
use windows_sys::Win32::UI::WindowsAndMessaging::{
    AllowSetForegroundWindow, EnumWindows, GetCursorPos, GetForegroundWindow, GetWindowPlacement,
    GetWindowRect, GetWindowThreadProcessId, IsWindowVisible, SetCursorPos, SetForegroundWindow,
    ShowWindow, ASFW_ANY, SW_RESTORE, SW_SHOWMAXIMIZED, SW_SHOWMINIMIZED, SW_SHOWNORMAL,
    WINDOWPLACEMENT,
};

use crate::error::DriverError;
use crate::types::{MouseLocation, WindowBounds};

// ---------------------------------------------------------------------------
// Process identity
// ---------------------------------------------------------------------------

pub(super) fn normalize_identity(raw: &str) -> String {
    raw.to_lowercase().split_whitespace().collect()
}

/// Image path of the process owning `window`, normalized. Handles are
/// closed before returning on every path.
pub(super) fn process_identity(window: HWND) -> Option<String> {
    let mut pid = 0u32;
    unsafe { GetWindowThreadProcessId(window, &mut pid) };
    if pid == 0 {
        return None;
    }

    let process = unsafe { OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, 0, pid) };
    if process.is_null() {
        return None;
    }

    let mut path = [0u16; 1024];
    let mut length = path.len() as u32;
    let ok = unsafe { QueryFullProcessImageNameW(process, 0, path.as_mut_ptr(), &mut length) };
    unsafe { CloseHandle(process) };

    if ok == 0 || length == 0 {
        return None;
    }
    Some(normalize_identity(&String::from_utf16_lossy(
        &path[..length as usize],
    )))
}

// ---------------------------------------------------------------------------
// Enumeration
// ---------------------------------------------------------------------------

fn top_level_windows() -> Vec<HWND> {
    unsafe extern "system" fn collect(window: HWND, data: LPARAM) -> i32 {
        let windows = unsafe { &mut *(data as *mut Vec<HWND>) };
        windows.push(window);
        1
    }

    let mut windows: Vec<HWND> = Vec::new();
    unsafe {
        EnumWindows(Some(collect), &mut windows as *mut Vec<HWND> as LPARAM);
    }
    windows
}

pub(super) fn running_applications() -> Result<Vec<String>, DriverError> {
    let mut identities: Vec<String> = top_level_windows()
        .into_iter()
        .filter_map(process_identity)
        // Installer stubs leave transient ".tmp" processes with windows;
        // they are not applications anyone can focus.
        .filter(|identity| !identity.ends_with(".tmp"))
        .collect();

    identities.sort();
    identities.dedup();
    Ok(identities)
}

pub(super) fn active_application() -> Result<String, DriverError> {
    let foreground = unsafe { GetForegroundWindow() };
    if foreground.is_null() {
        return Ok(String::new());
    }
    Ok(process_identity(foreground).unwrap_or_default())
}

pub(super) fn active_window_bounds() -> Result<WindowBounds, DriverError> {
    let foreground = unsafe { GetForegroundWindow() };
    if foreground.is_null() {
        return Ok(WindowBounds::default());
    }

    let mut rect = RECT {
        left: 0,
        top: 0,
        right: 0,
        bottom: 0,
    };
    if unsafe { GetWindowRect(foreground, &mut rect) } == 0 {
        return Ok(WindowBounds::default());
    }

    Ok(WindowBounds {
        x: rect.left,
        y: rect.top,
        width: rect.right - rect.left,
        height: rect.bottom - rect.top,
    })
}

// ---------------------------------------------------------------------------
// Focus
// ---------------------------------------------------------------------------

fn has_visible_geometry(window: HWND) -> bool {
    let mut rect = RECT {
        left: 0,
        top: 0,
        right: 0,
        bottom: 0,
    };
    if unsafe { GetWindowRect(window, &mut rect) } == 0 {
        return false;
    }
    rect.top != rect.bottom && rect.left != rect.right && unsafe { IsWindowVisible(window) } != 0
}

fn raise_window(window: HWND) {
    unsafe {
        // Attach to the current foreground thread's input state; only the
        // thread owning foreground input may hand focus to another window.
        let foreground_thread =
            GetWindowThreadProcessId(GetForegroundWindow(), std::ptr::null_mut());
        AttachThreadInput(foreground_thread, GetCurrentThreadId(), 1);

        let mut placement: WINDOWPLACEMENT = std::mem::zeroed();
        placement.length = std::mem::size_of::<WINDOWPLACEMENT>() as u32;
        GetWindowPlacement(window, &mut placement);
        if placement.showCmd == SW_SHOWMAXIMIZED as u32 {
            // Raising must not un-maximize an already maximized window.
            ShowWindow(window, SW_SHOWMAXIMIZED);
        } else if placement.showCmd == SW_SHOWMINIMIZED as u32 {
            ShowWindow(window, SW_RESTORE);
        } else {
            ShowWindow(window, SW_SHOWNORMAL);
        }

        AllowSetForegroundWindow(ASFW_ANY);
        SetForegroundWindow(window);

        AttachThreadInput(
            GetWindowThreadProcessId(GetForegroundWindow(), std::ptr::null_mut()),
            GetCurrentThreadId(),
            0,
        );
    }
}

pub(super) fn focus_application(name: &str) -> Result<(), DriverError> {
    let needle = normalize_identity(name);
    if needle.is_empty() {
        return Ok(());
    }

    for window in top_level_windows() {
        let Some(identity) = process_identity(window) else {
            continue;
        };
        if !identity.contains(&needle) || !has_visible_geometry(window) {
            continue;
        }

        raise_window(window);
        return Ok(());
    }

    log::debug!("focus_application: no window matches {needle:?}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Pointer
// ---------------------------------------------------------------------------

pub(super) fn mouse_location() -> Result<MouseLocation, DriverError> {
    let mut point = windows_sys::Win32::Foundation::POINT { x: 0, y: 0 };
    if unsafe { GetCursorPos(&mut point) } == 0 {
        return Err(DriverError::Platform("GetCursorPos failed".into()));
    }
    Ok(MouseLocation {
        x: point.x,
        y: point.y,
    })
}

pub(super) fn set_mouse_location(x: i32, y: i32) -> Result<(), DriverError> {
    if unsafe { SetCursorPos(x, y) } == 0 {
        return Err(DriverError::Platform("SetCursorPos failed".into()));
    }
    Ok(())
}
