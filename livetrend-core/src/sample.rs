//! Telemetry samples and retained readings
//!
//! A [`Sample`] is one reading as delivered by a poller or a push update. Once
//! it is merged into a [`Window`](crate::window::Window) only its
//! [`Reading`] (timestamp and value) is kept under the series key.

use alloc::string::String;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::time::Timestamp;

/// One timestamped value retained inside a series
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Reading {
    /// Milliseconds since the Unix epoch
    pub timestamp: Timestamp,
    /// Measured value
    pub value: f64,
}

impl Reading {
    /// Create a reading
    pub const fn new(timestamp: Timestamp, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// One telemetry reading from a device
///
/// Samples are immutable. Their identity is `(series_key, timestamp)`: a
/// second sample with the same identity is a duplicate whatever its value.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Sample {
    /// Identifier of the originating series (device)
    pub series_key: String,
    /// Milliseconds since the Unix epoch
    pub timestamp: Timestamp,
    /// Measured value
    pub value: f64,
}

impl Sample {
    /// Create a sample
    pub fn new(series_key: impl Into<String>, timestamp: Timestamp, value: f64) -> Self {
        Self {
            series_key: series_key.into(),
            timestamp,
            value,
        }
    }

    /// Deduplication identity
    pub fn identity(&self) -> (&str, Timestamp) {
        (&self.series_key, self.timestamp)
    }

    /// The part of the sample kept in a window
    pub fn reading(&self) -> Reading {
        Reading::new(self.timestamp, self.value)
    }
}
