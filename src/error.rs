//! Driver error type.
//!
//! Expected degradations (no focused text control, missing window property,
//! unmapped key) are modeled as values -- empty results or
//! `EditorState::unreadable()` -- not as errors. `DriverError` is reserved
//! for transport-level failures the facade cannot paper over: the X11
//! connection cannot be opened, COM initialization fails, a config file is
//! malformed.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DriverError {
    /// The operation has no implementation for the current session
    /// (e.g. no display server detected).
    #[error("unavailable: {0}")]
    Unavailable(String),

    /// The OS denied access to the required subsystem
    /// (e.g. macOS Accessibility permission not granted).
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// A platform API call failed in a way that is not an expected
    /// degradation.
    #[error("platform error: {0}")]
    Platform(String),

    /// The timing configuration file could not be read or parsed.
    #[error("config error: {0}")]
    Config(String),
}
