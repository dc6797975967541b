//! Time Source Abstraction
//!
//! The buffer never reads the clock itself; the caller passes `now` into
//! every update. `TimeSource` is how hosts and replays provide that value.
//!
//! ## Common Implementations
//!
//! - `SystemTime`: wall clock milliseconds since the Unix epoch
//! - `FixedTime`: controllable time for tests and replays

use crate::time::Timestamp;

/// Source of time for the buffer
///
/// ```rust
/// use livetrend_core::traits::TimeSource;
/// use livetrend_core::time::Timestamp;
///
/// struct GatewayClock {
///     offset_ms: Timestamp,
/// }
///
/// impl TimeSource for GatewayClock {
///     fn now(&self) -> Timestamp {
///         self.offset_ms
///     }
///
///     fn is_wall_clock(&self) -> bool {
///         true
///     }
/// }
/// ```
pub trait TimeSource: Send {
    /// Current timestamp in milliseconds since the Unix epoch
    ///
    /// Successive calls should not decrease; the buffer clamps a clock that
    /// steps backwards to its last update time.
    fn now(&self) -> Timestamp;

    /// Whether this source tracks the time of day (vs. a synthetic clock)
    fn is_wall_clock(&self) -> bool;
}

impl<T: TimeSource + Sync> TimeSource for &T {
    fn now(&self) -> Timestamp {
        (**self).now()
    }

    fn is_wall_clock(&self) -> bool {
        (**self).is_wall_clock()
    }
}
