//! Platform backends.
//!
//! One module per target OS, each implementing the `Driver` facade trait.
//! Selection happens at compile time; `create_driver` returns the single
//! backend built for this target.

use crate::config::DriverConfig;
use crate::driver::Driver;
use crate::error::DriverError;

#[cfg(target_os = "linux")]
mod x11;

#[cfg(target_os = "macos")]
mod macos;

#[cfg(target_os = "windows")]
mod win32;

// ---------------------------------------------------------------------------
// Factory
// ---------------------------------------------------------------------------

#[cfg(target_os = "linux")]
pub(crate) fn create_driver(config: DriverConfig) -> Result<Box<dyn Driver>, DriverError> {
    Ok(Box::new(x11::X11Driver::new(config)?))
}

#[cfg(target_os = "macos")]
pub(crate) fn create_driver(config: DriverConfig) -> Result<Box<dyn Driver>, DriverError> {
    Ok(Box::new(macos::MacDriver::new(config)))
}

#[cfg(target_os = "windows")]
pub(crate) fn create_driver(config: DriverConfig) -> Result<Box<dyn Driver>, DriverError> {
    Ok(Box::new(win32::WindowsDriver::new(config)))
}

#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
pub(crate) fn create_driver(_config: DriverConfig) -> Result<Box<dyn Driver>, DriverError> {
    Err(DriverError::Unavailable(
        "no input driver for this platform".into(),
    ))
}
