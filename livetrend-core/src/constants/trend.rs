//! Trend Classification Constants

/// Insensitivity band of the trend classifier (percent).
///
/// A change must exceed ±1 % before the direction leaves `Stable`, so sensor
/// jitter does not flip the trend badge on every refresh.
pub const TREND_THRESHOLD_PERCENT: f64 = 1.0;

/// Minimum number of values needed to compute a change.
pub const MIN_TREND_POINTS: usize = 2;

/// Scale factor from a ratio to a percentage.
pub const PERCENT_SCALE: f64 = 100.0;
