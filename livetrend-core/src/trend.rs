//! Trend classification over a retained series
//!
//! Compares only the first and last value of the window. This is not a
//! regression: it is cheap enough to recompute on every refresh tick and
//! matches what the trend badge shows (where the series started versus where
//! it is now).
//!
//! ```text
//! percent = (last - first) / |first| * 100
//!
//!   percent >  1  →  Up
//!   percent < -1  →  Down
//!   otherwise     →  Stable
//! ```
//!
//! A zero first value has no defined percent change; the direction is taken
//! from the sign of the last value and the magnitude is reported as zero.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::constants::trend::{MIN_TREND_POINTS, PERCENT_SCALE, TREND_THRESHOLD_PERCENT};

/// Direction shown by the trend badge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum TrendDirection {
    /// Rose by more than the threshold
    Up,
    /// Fell by more than the threshold
    Down,
    /// Within the threshold, or not enough data
    #[default]
    Stable,
}

impl TrendDirection {
    /// Lowercase name used in payloads
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Stable => "stable",
        }
    }

    /// Arrow glyph for badges
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Up => "↑",
            Self::Down => "↓",
            Self::Stable => "→",
        }
    }
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction plus signed percent change
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct TrendResult {
    /// Classified direction
    pub direction: TrendDirection,
    /// Signed change from first to last value, in percent
    pub percent_change: f64,
}

impl TrendResult {
    /// Result for series too short to compare
    pub const STABLE: Self = Self {
        direction: TrendDirection::Stable,
        percent_change: 0.0,
    };

    const fn new(direction: TrendDirection, percent_change: f64) -> Self {
        Self {
            direction,
            percent_change,
        }
    }
}

/// Classify an ordered sequence by its first and last value
///
/// Total for finite input: never panics and never returns NaN or infinity.
pub fn classify(values: &[f64]) -> TrendResult {
    if values.len() < MIN_TREND_POINTS {
        return TrendResult::STABLE;
    }

    let first = values[0];
    let last = values[values.len() - 1];

    if first == 0.0 {
        let direction = if last > 0.0 {
            TrendDirection::Up
        } else {
            TrendDirection::Stable
        };
        return TrendResult::new(direction, 0.0);
    }

    let mut percent_change = (last - first) / libm::fabs(first) * PERCENT_SCALE;
    // Extreme magnitudes overflow; keep the sign.
    if !percent_change.is_finite() {
        percent_change = if last > first { f64::MAX } else { f64::MIN };
    }

    TrendResult::new(direction_of(percent_change), percent_change)
}

fn direction_of(percent_change: f64) -> TrendDirection {
    if percent_change > TREND_THRESHOLD_PERCENT {
        TrendDirection::Up
    } else if percent_change < -TREND_THRESHOLD_PERCENT {
        TrendDirection::Down
    } else {
        TrendDirection::Stable
    }
}
