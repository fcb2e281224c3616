//! Process-wide UI Automation handle.
//!
//! The only piece of state that outlives a facade call. COM is entered once
//! in the multithreaded apartment and the `IUIAutomation` instance is built
//! behind a `OnceLock`, so concurrent first calls race safely and the
//! handle is never torn down -- UIA teardown at process exit is handled by
//! COM itself.

use std::sync::OnceLock;

use windows::Win32::System::Com::{
    CoCreateInstance, CoInitializeEx, CLSCTX_ALL, COINIT_MULTITHREADED,
};
use windows::Win32::UI::Accessibility::{CUIAutomation, IUIAutomation};

/// MTA-created UIA pointers may be marshalled freely between threads.
struct SharedAutomation(IUIAutomation);

unsafe impl Send for SharedAutomation {}
unsafe impl Sync for SharedAutomation {}

static AUTOMATION: OnceLock<Option<SharedAutomation>> = OnceLock::new();

/// The process-wide `IUIAutomation` instance, or `None` when COM refused to
/// produce one (introspection then degrades to `unreadable`, it never
/// fails the call).
pub(super) fn instance() -> Option<&'static IUIAutomation> {
    AUTOMATION
        .get_or_init(|| unsafe {
            // S_FALSE (already initialized on this thread) is fine.
            let _ = CoInitializeEx(None, COINIT_MULTITHREADED);
            let created: windows::core::Result<IUIAutomation> =
                CoCreateInstance(&CUIAutomation, None, CLSCTX_ALL);
            match created {
                Ok(automation) => Some(SharedAutomation(automation)),
                Err(e) => {
                    log::warn!("UI Automation unavailable: {e}");
                    None
                }
            }
        })
        .as_ref()
        .map(|shared| &shared.0)
}
