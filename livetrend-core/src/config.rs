//! Buffer configuration
//!
//! Injected by the host application; the core never reads files, process
//! environment or other global state.

use alloc::string::String;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_WINDOW_SECS;

/// How a multi-variable telemetry payload maps onto series keys
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "mode", rename_all = "snake_case"))]
pub enum SeriesKeyMode {
    /// One series per device, charting a single named variable
    Device {
        /// Variable plotted for every device
        variable: String,
    },
    /// One series per `device/variable` pair
    #[default]
    PerVariable,
}

/// Window buffer settings
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WindowConfig {
    /// Trailing retention window in seconds
    pub window_secs: u64,
    /// Mapping from payload variables to series keys
    pub key_mode: SeriesKeyMode,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            window_secs: DEFAULT_WINDOW_SECS,
            key_mode: SeriesKeyMode::default(),
        }
    }
}

impl WindowConfig {
    /// Default configuration (300 s window, per-variable keys)
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the retention window in seconds
    pub fn with_window_secs(mut self, secs: u64) -> Self {
        self.window_secs = secs;
        self
    }

    /// Set the payload key mapping
    pub fn with_key_mode(mut self, key_mode: SeriesKeyMode) -> Self {
        self.key_mode = key_mode;
        self
    }

    /// Chart a single variable per device
    pub fn chart_variable(self, variable: impl Into<String>) -> Self {
        self.with_key_mode(SeriesKeyMode::Device {
            variable: variable.into(),
        })
    }
}
