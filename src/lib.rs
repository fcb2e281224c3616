//! deskdriver -- cross-platform input synthesis and accessibility
//! introspection.
//!
//! The crate exposes a single [`Driver`] facade with three compiled-in
//! platform implementations (X11, macOS, Windows) selected by target OS.
//! Every operation is a self-contained unit of work: native resources
//! (window-system connections, accessibility element references, clipboard
//! locks) are acquired at the start of a call and released on every exit
//! path. The sole process-wide exception is the Windows UI Automation
//! handle, a once-initialized singleton.
//!
//! The facade is synchronous and `Send`. Host bindings are expected to
//! dispatch calls onto worker threads and surface their own completion
//! signal; nothing here blocks on anything but short settle delays and the
//! platform APIs themselves. Concurrent synthesis calls interleave at the
//! OS level with undefined combined ordering -- serializing them is the
//! caller's job.

pub mod config;
pub mod driver;
pub mod error;
pub mod key;
pub mod sequence;
pub mod types;

mod platform;

pub use config::{DriverConfig, TimingConfig};
pub use driver::{create_driver, Driver};
pub use error::DriverError;
pub use types::{EditorState, MouseButton, MouseLocation, WindowBounds};
