//! Retention Window Constants
//!
//! Defaults for the trailing window kept per series and the limits applied
//! to series identifiers at the ingestion boundary.

/// Default trailing retention window (seconds).
///
/// Five minutes of history is what the live chart widget displays; older
/// readings are evicted on every update.
pub const DEFAULT_WINDOW_SECS: u64 = 300;

/// Longest accepted series key (bytes).
///
/// Device identifiers are capped at 255 characters by the ingestion API.
pub const MAX_SERIES_KEY_LEN: usize = 255;

/// Separator between device id and variable name in per-variable keys.
pub const SERIES_KEY_SEPARATOR: char = '/';

/// Rough memory held per retained reading (KB), for monitoring figures.
///
/// Counts the key, timestamp and value together with map and vector overhead.
pub const ESTIMATED_KB_PER_POINT: u64 = 1;
