//! Constants for livetrend Core
//!
//! Centralized numeric values used by the window buffer, the trend
//! classifier and the ingestion boundary. Every constant carries its unit in
//! the name.
//!
//! ## Organization
//!
//! - **Time**: unit conversions and refresh cadence
//! - **Window**: retention and series key limits
//! - **Trend**: classification thresholds

/// Time-related constants for unit conversion and refresh cadence.
pub mod time;

/// Retention window defaults and series key limits.
pub mod window;

/// Trend classification thresholds.
pub mod trend;

// Re-export commonly used constants for convenience
pub use time::{MS_PER_SECOND, DEFAULT_TICK_SECS};

pub use window::{DEFAULT_WINDOW_SECS, ESTIMATED_KB_PER_POINT, MAX_SERIES_KEY_LEN};

pub use trend::{TREND_THRESHOLD_PERCENT, MIN_TREND_POINTS};
