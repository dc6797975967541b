//! Time handling for the window buffer
//!
//! Eviction is measured against an explicit `now`, never against a clock read
//! hidden inside the buffer. Callers pick the source:
//! - System clock (the live feed)
//! - Fixed clock (tests and replays)

use crate::constants::MS_PER_SECOND;
pub use crate::traits::TimeSource;

/// Timestamp in milliseconds since the Unix epoch
pub type Timestamp = u64;

/// Convert whole seconds to a millisecond span
pub const fn secs_to_ms(secs: u64) -> u64 {
    secs.saturating_mul(MS_PER_SECOND)
}

/// Age of `timestamp` at `now`; samples stamped in the future have age zero
#[inline]
pub const fn age_ms(now: Timestamp, timestamp: Timestamp) -> u64 {
    now.saturating_sub(timestamp)
}

/// Wall clock time source (requires std)
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTime;

#[cfg(feature = "std")]
impl TimeSource for SystemTime {
    fn now(&self) -> Timestamp {
        use std::time::{SystemTime as StdSystemTime, UNIX_EPOCH};

        StdSystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as Timestamp
    }

    fn is_wall_clock(&self) -> bool {
        true
    }
}

/// Fixed time source for testing and replay
#[derive(Debug, Clone)]
pub struct FixedTime {
    timestamp: Timestamp,
}

impl FixedTime {
    /// Clock frozen at `timestamp`
    pub fn new(timestamp: Timestamp) -> Self {
        Self { timestamp }
    }

    /// Jump to an absolute timestamp
    pub fn set(&mut self, timestamp: Timestamp) {
        self.timestamp = timestamp;
    }

    /// Move forward by `ms` milliseconds
    pub fn advance(&mut self, ms: u64) {
        self.timestamp = self.timestamp.saturating_add(ms);
    }

    /// Move forward by whole seconds
    pub fn advance_secs(&mut self, secs: u64) {
        self.advance(secs_to_ms(secs));
    }
}

impl TimeSource for FixedTime {
    fn now(&self) -> Timestamp {
        self.timestamp
    }

    fn is_wall_clock(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_time_advances() {
        let mut time = FixedTime::new(1000);
        assert_eq!(time.now(), 1000);

        time.advance(500);
        assert_eq!(time.now(), 1500);

        time.advance_secs(2);
        assert_eq!(time.now(), 3500);
    }

    #[test]
    fn fixed_time_saturates() {
        let mut time = FixedTime::new(u64::MAX - 10);
        time.advance(1_000);
        assert_eq!(time.now(), u64::MAX);

        time.advance_secs(u64::MAX);
        assert_eq!(time.now(), u64::MAX);
    }

    #[test]
    fn future_samples_have_zero_age() {
        assert_eq!(age_ms(1_000, 5_000), 0);
        assert_eq!(age_ms(5_000, 1_000), 4_000);
    }

    #[test]
    fn seconds_conversion_saturates() {
        assert_eq!(secs_to_ms(300), 300_000);
        assert_eq!(secs_to_ms(u64::MAX), u64::MAX);
    }

    #[cfg(feature = "std")]
    #[test]
    fn system_time_is_wall_clock() {
        let clock = SystemTime;
        assert!(clock.is_wall_clock());
        assert!(clock.now() > 1_600_000_000_000);
    }
}
