//! AXUIElement helpers.
//!
//! Thin safe wrappers over the accessibility C API. Every element reference
//! is a `CFRetained` so releases happen on all exit paths, including the
//! bounded recursive walks in the button search.

#![allow(non_upper_case_globals)]

use std::ffi::c_void;
use std::ptr::NonNull;

use objc2_app_kit::NSWorkspace;
use objc2_application_services::{
    AXError, AXIsProcessTrusted, AXUIElement, AXValue, AXValueType,
};
use objc2_core_foundation::{CFArray, CFBoolean, CFRange, CFRetained, CFString, CFType, CGPoint, CGSize};

/// Non-constant attributes the headers do not export.
const MANUAL_ACCESSIBILITY_ATTRIBUTE: &str = "AXManualAccessibility";

/// Sibling scan cap for recursive walks. Accessibility trees of complex
/// windows can be enormous; twenty siblings per level bounds the walk while
/// covering every dialog layout seen in practice.
pub(super) const MAX_SIBLINGS: usize = 20;

pub(super) fn accessibility_trusted() -> bool {
    unsafe { AXIsProcessTrusted() }
}

// ---------------------------------------------------------------------------
// Element wrapper
// ---------------------------------------------------------------------------

pub(super) struct AxElement {
    inner: CFRetained<AXUIElement>,
}

impl AxElement {
    pub(super) fn application(pid: i32) -> AxElement {
        AxElement {
            inner: unsafe { AXUIElement::new_application(pid) },
        }
    }

    fn attribute(&self, name: &str) -> Option<CFRetained<CFType>> {
        let attr = CFString::from_str(name);
        unsafe {
            let mut value: *const CFType = std::ptr::null();
            let result = self
                .inner
                .copy_attribute_value(&attr, NonNull::new(&mut value)?);
            if result != AXError::Success || value.is_null() {
                return None;
            }
            Some(CFRetained::from_raw(NonNull::new_unchecked(value.cast_mut())))
        }
    }

    fn set_attribute(&self, name: &str, value: &CFType) -> bool {
        let attr = CFString::from_str(name);
        unsafe { self.inner.set_attribute_value(&attr, value) == AXError::Success }
    }

    pub(super) fn string_attribute(&self, name: &str) -> Option<String> {
        let value = self.attribute(name)?;
        Some(value.downcast_ref::<CFString>()?.to_string())
    }

    pub(super) fn element_attribute(&self, name: &str) -> Option<AxElement> {
        let value = self.attribute(name)?;
        let element = value.downcast::<AXUIElement>().ok()?;
        Some(AxElement { inner: element })
    }

    pub(super) fn children(&self) -> Vec<AxElement> {
        let Some(value) = self.attribute("AXChildren") else {
            return Vec::new();
        };
        let Ok(array) = value.downcast::<CFArray>() else {
            return Vec::new();
        };
        // AXChildren always holds AXUIElements.
        let typed: CFRetained<CFArray<AXUIElement>> = unsafe { CFRetained::cast_unchecked(array) };

        let len = typed.len();
        let mut children = Vec::with_capacity(len);
        for i in 0..len {
            if let Some(child) = typed.get(i) {
                children.push(AxElement { inner: child });
            }
        }
        children
    }

    pub(super) fn actions(&self) -> Vec<String> {
        unsafe {
            let mut names: *const CFArray<CFString> = std::ptr::null();
            let result = self.inner.copy_action_names(
                NonNull::new((&raw mut names).cast::<*const CFArray>()).expect("actions out ptr"),
            );
            if result != AXError::Success || names.is_null() {
                return Vec::new();
            }
            let names = CFRetained::<CFArray<CFString>>::from_raw(NonNull::new_unchecked(
                names.cast_mut(),
            ));
            let mut result = Vec::with_capacity(names.len());
            for i in 0..names.len() {
                if let Some(name) = names.get(i) {
                    result.push(name.to_string());
                }
            }
            result
        }
    }

    pub(super) fn perform_action(&self, name: &str) -> bool {
        let action = CFString::from_str(name);
        unsafe { self.inner.perform_action(&action) == AXError::Success }
    }

    pub(super) fn role_description(&self) -> String {
        self.string_attribute("AXRoleDescription").unwrap_or_default()
    }

    /// The element's own text: AXValue when it is a string, AXTitle
    /// otherwise.
    pub(super) fn raw_title(&self) -> String {
        if let Some(value) = self.attribute("AXValue") {
            if let Some(s) = value.downcast_ref::<CFString>() {
                return s.to_string();
            }
        }
        self.string_attribute("AXTitle").unwrap_or_default()
    }

    /// Like `raw_title`, but peeking into the first two children when the
    /// element itself is blank -- container controls often hang their label
    /// off a static-text child.
    pub(super) fn title(&self) -> String {
        let own = self.raw_title();
        if !own.is_empty() {
            return own;
        }
        for child in self.children().into_iter().take(2) {
            let inner = child.raw_title();
            if !inner.is_empty() {
                return inner;
            }
        }
        String::new()
    }

    /// True when AXValue exists on this element (settable text lives there
    /// rather than in AXTitle).
    pub(super) fn has_value_attribute(&self) -> bool {
        self.attribute("AXValue").is_some()
    }

    pub(super) fn set_string_attribute(&self, name: &str, value: &str) -> bool {
        let cf_value = CFString::from_str(value);
        self.set_attribute(name, &cf_value)
    }

    pub(super) fn selected_text_range(&self) -> Option<(usize, usize)> {
        let value = self.attribute("AXSelectedTextRange")?;
        let ax_value = value.downcast_ref::<AXValue>()?;

        unsafe {
            let mut range = CFRange { location: 0, length: 0 };
            if ax_value.value(
                AXValueType::CFRange,
                NonNull::new((&raw mut range).cast::<c_void>())?,
            ) {
                Some((range.location as usize, range.length as usize))
            } else {
                None
            }
        }
    }

    pub(super) fn set_selected_text_range(&self, location: usize, length: usize) -> bool {
        let mut range = CFRange {
            location: location as isize,
            length: length as isize,
        };
        let Some(ptr) = NonNull::new((&raw mut range).cast::<c_void>()) else {
            return false;
        };
        let Some(value) = (unsafe { AXValue::new(AXValueType::CFRange, ptr) }) else {
            return false;
        };
        self.set_attribute("AXSelectedTextRange", &value)
    }

    pub(super) fn position_and_size(&self) -> Option<(CGPoint, CGSize)> {
        let pos_value = self.attribute("AXPosition")?;
        let size_value = self.attribute("AXSize")?;
        let pos = pos_value.downcast_ref::<AXValue>()?;
        let size = size_value.downcast_ref::<AXValue>()?;

        unsafe {
            let mut point = CGPoint { x: 0.0, y: 0.0 };
            let mut extent = CGSize {
                width: 0.0,
                height: 0.0,
            };
            if !pos.value(
                AXValueType::CGPoint,
                NonNull::new((&raw mut point).cast::<c_void>())?,
            ) {
                return None;
            }
            if !size.value(
                AXValueType::CGSize,
                NonNull::new((&raw mut extent).cast::<c_void>())?,
            ) {
                return None;
            }
            Some((point, extent))
        }
    }
}

// ---------------------------------------------------------------------------
// Focused element lookup
// ---------------------------------------------------------------------------

fn frontmost_pid() -> Option<i32> {
    let workspace = unsafe { NSWorkspace::sharedWorkspace() };
    let app = unsafe { workspace.frontmostApplication() }?;
    Some(unsafe { app.processIdentifier() })
}

/// The focused window of the frontmost application.
pub(super) fn focused_window() -> Option<AxElement> {
    let app = AxElement::application(frontmost_pid()?);
    app.element_attribute("AXFocusedWindow")
}

/// The focused UI element of the frontmost application, accepted only when
/// it reports a text-editing role. Enables the manual-accessibility switch
/// first so Chromium- and Electron-based applications build their tree.
pub(super) fn focused_text_field() -> Option<AxElement> {
    let app = AxElement::application(frontmost_pid()?);

    let enable = CFBoolean::new(true);
    app.set_attribute(MANUAL_ACCESSIBILITY_ATTRIBUTE, &enable);

    let field = app.element_attribute("AXFocusedUIElement")?;
    match field.role_description().as_str() {
        "text field" | "text entry area" => Some(field),
        _ => None,
    }
}
