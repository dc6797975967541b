//! Feed configuration

use std::time::Duration;

use livetrend_core::constants::DEFAULT_TICK_SECS;
use livetrend_core::WindowConfig;
use serde::{Deserialize, Serialize};

/// Default capacity of the batch channel between pollers and the buffer task
pub const DEFAULT_CHANNEL_CAPACITY: usize = 16;

/// Refresh loop settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Seconds between refresh ticks
    pub tick_secs: u64,
    /// Batches that may queue before pollers wait on the buffer task
    pub channel_capacity: usize,
    /// Buffer retention and key mapping
    pub window: WindowConfig,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            tick_secs: DEFAULT_TICK_SECS,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            window: WindowConfig::default(),
        }
    }
}

impl FeedConfig {
    /// Default configuration (30 s tick, 300 s window)
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the refresh tick in seconds
    pub fn tick_secs(mut self, secs: u64) -> Self {
        self.tick_secs = secs;
        self
    }

    /// Set the batch channel capacity
    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    /// Set the buffer configuration
    pub fn window(mut self, window: WindowConfig) -> Self {
        self.window = window;
        self
    }

    /// Tick as a `Duration`, never zero
    pub fn tick(&self) -> Duration {
        Duration::from_secs(self.tick_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = FeedConfig::new()
            .tick_secs(5)
            .channel_capacity(4)
            .window(WindowConfig::new().with_window_secs(60));

        assert_eq!(config.tick(), Duration::from_secs(5));
        assert_eq!(config.channel_capacity, 4);
        assert_eq!(config.window.window_secs, 60);
    }

    #[test]
    fn test_zero_tick_is_clamped() {
        assert_eq!(FeedConfig::new().tick_secs(0).tick(), Duration::from_secs(1));
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: FeedConfig =
            serde_json::from_str(r#"{"tick_secs": 10, "window": {"window_secs": 120}}"#).unwrap();

        assert_eq!(config.tick_secs, 10);
        assert_eq!(config.channel_capacity, DEFAULT_CHANNEL_CAPACITY);
        assert_eq!(config.window.window_secs, 120);
        assert_eq!(config.window.key_mode, livetrend_core::SeriesKeyMode::PerVariable);
    }

    #[test]
    fn test_deserialize_key_mode() {
        let config: FeedConfig = serde_json::from_str(
            r#"{"window": {"key_mode": {"mode": "device", "variable": "temperature"}}}"#,
        )
        .unwrap();

        assert_eq!(
            config.window.key_mode,
            livetrend_core::SeriesKeyMode::Device {
                variable: "temperature".into()
            }
        );
        assert_eq!(config.window.window_secs, 300);
    }
}
