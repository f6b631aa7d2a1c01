//! Driver configuration
//!
//! Plain data with defaults matching the board's safe power-on setup.
//! With the `serde` feature the struct can be loaded from a host config
//! file (TOML, JSON, postcard).

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default brightness applied after init
pub const DEFAULT_BRIGHTNESS: f32 = 0.2;

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Initial brightness not a number in 0.0-1.0
    BrightnessOutOfRange,
    /// Buttons enabled but the controller was never initialised
    ButtonsNotConfigured,
}

/// Matrix driver options
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DisplayConfig {
    /// Host should exit its process after `shutdown()`
    ///
    /// The driver only reports this; process lifecycle stays with the host.
    pub exit_on_teardown: bool,
    /// Brightness (0.0-1.0) applied once init completes
    pub initial_brightness: f32,
    /// Configure the four buttons and deliver their events
    pub enable_buttons: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            exit_on_teardown: true,
            initial_brightness: DEFAULT_BRIGHTNESS,
            enable_buttons: true,
        }
    }
}

impl DisplayConfig {
    /// Defaults with buttons disabled
    pub fn display_only() -> Self {
        Self {
            enable_buttons: false,
            ..Self::default()
        }
    }

    /// Check option ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.initial_brightness) {
            return Err(ConfigError::BrightnessOutOfRange);
        }
        Ok(())
    }
}
