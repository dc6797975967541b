//! Time-Related Constants
//!
//! Conversion factors and the refresh cadence used by the live feed.

// ===== TIME UNIT CONVERSIONS =====

/// Milliseconds per second.
pub const MS_PER_SECOND: u64 = 1000;

// ===== REFRESH CADENCE =====

/// Default refresh tick of the presentation layer (seconds).
///
/// Independent of the retention window: a 30 s tick against a 300 s window
/// keeps roughly ten batches visible per series.
pub const DEFAULT_TICK_SECS: u64 = 30;
