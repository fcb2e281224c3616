//! Timing configuration.
//!
//! Every settle delay the synthesizers and the clipboard fallback rely on is
//! tunable here. Delays exist because downstream consumers (focused text
//! fields, layout engines, clipboard owners) drop or misorder events
//! delivered back-to-back; the defaults match the values the platform
//! backends were tuned with and rarely need changing.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::DriverError;

// ---------------------------------------------------------------------------
// Timing
// ---------------------------------------------------------------------------

/// Settle delays, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimingConfig {
    /// After each synthesized key event.
    pub key_settle_ms: u64,
    /// After each full press (down+up pair) in a multi-press sequence.
    pub press_settle_ms: u64,
    /// After each mouse button transition.
    pub click_settle_ms: u64,
    /// After a pointer warp, before the new position is observable.
    pub warp_settle_ms: u64,
    /// Between a synthesized copy keystroke and the clipboard read; the
    /// target application populates the clipboard asynchronously.
    pub clipboard_settle_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        TimingConfig {
            key_settle_ms: 1,
            press_settle_ms: 3,
            click_settle_ms: 10,
            warp_settle_ms: 100,
            clipboard_settle_ms: 10,
        }
    }
}

impl TimingConfig {
    pub fn key_settle(&self) -> Duration {
        Duration::from_millis(self.key_settle_ms)
    }

    pub fn press_settle(&self) -> Duration {
        Duration::from_millis(self.press_settle_ms)
    }

    pub fn click_settle(&self) -> Duration {
        Duration::from_millis(self.click_settle_ms)
    }

    pub fn warp_settle(&self) -> Duration {
        Duration::from_millis(self.warp_settle_ms)
    }

    pub fn clipboard_settle(&self) -> Duration {
        Duration::from_millis(self.clipboard_settle_ms)
    }
}

// ---------------------------------------------------------------------------
// Driver config
// ---------------------------------------------------------------------------

/// Top-level configuration handed to [`crate::create_driver`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DriverConfig {
    pub timing: TimingConfig,
}

impl DriverConfig {
    /// Loads configuration from a TOML file. Missing keys fall back to
    /// their defaults; unknown keys are rejected so typos surface early.
    pub fn load(path: &Path) -> Result<Self, DriverError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| DriverError::Config(format!("{}: {e}", path.display())))?;
        toml::from_str(&raw).map_err(|e| DriverError::Config(format!("{}: {e}", path.display())))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_sane() {
        let config = DriverConfig::default();
        assert_eq!(config.timing.key_settle_ms, 1);
        assert_eq!(config.timing.warp_settle_ms, 100);
        assert_eq!(config.timing.clipboard_settle(), Duration::from_millis(10));
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[timing]\nclipboard_settle_ms = 50").unwrap();

        let config = DriverConfig::load(file.path()).unwrap();
        assert_eq!(config.timing.clipboard_settle_ms, 50);
        assert_eq!(config.timing.key_settle_ms, 1);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[timing]\nclipbaord_settle_ms = 50").unwrap();

        assert!(DriverConfig::load(file.path()).is_err());
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let result = DriverConfig::load(Path::new("/nonexistent/deskdriver.toml"));
        assert!(matches!(result, Err(DriverError::Config(_))));
    }
}
