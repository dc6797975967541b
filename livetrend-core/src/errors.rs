//! Error Types for Rejected Raw Samples
//!
//! The window buffer and the trend classifier are total: they never fail for
//! structurally valid input. Filtering malformed readings is the caller's
//! job, and this module describes what that filtering can reject.
//!
//! Errors are small, `Copy`, and carry only `&'static str` messages so they
//! can be counted and logged on the refresh path without allocating.
//!
//! ## Error Categories
//!
//! - `EmptySeriesKey` / `SeriesKeyTooLong`: the device identifier is unusable
//! - `NonFiniteValue`: NaN or infinity would poison the trend computation
//! - `InvalidTimestamp`: the timestamp cannot be resolved to an instant
//! - `UnknownVariable`: a payload does not carry the variable being charted
//!
//! ```rust
//! use livetrend_core::ingest::{RawSample, RawTimestamp};
//! use livetrend_core::IngestError;
//!
//! let raw = RawSample::new("pump-07", RawTimestamp::Millis(1_000), f64::NAN);
//! match raw.resolve() {
//!     Ok(_sample) => {}
//!     Err(IngestError::NonFiniteValue { .. }) => {
//!         // drop the reading, keep the rest of the batch
//!     }
//!     Err(_) => {}
//! }
//! ```

use thiserror_no_std::Error;

/// Result type for ingestion operations
pub type IngestResult<T> = Result<T, IngestError>;

/// Reasons a raw sample is refused at the ingestion boundary
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum IngestError {
    /// Series key is empty or whitespace
    #[error("Series key is empty")]
    EmptySeriesKey,

    /// Series key exceeds the accepted length
    #[error("Series key length {len} exceeds {max}")]
    SeriesKeyTooLong {
        /// Length of the offending key in bytes
        len: usize,
        /// Maximum accepted length
        max: usize,
    },

    /// Value is NaN or infinite
    #[error("Value {value} is not finite")]
    NonFiniteValue {
        /// The rejected value
        value: f64,
    },

    /// Timestamp could not be resolved to epoch milliseconds
    #[error("Invalid timestamp: {reason}")]
    InvalidTimestamp {
        /// Why parsing failed
        reason: &'static str,
    },

    /// Payload does not contain the requested variable
    #[error("Payload has no variable selected for charting")]
    UnknownVariable,
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;

    #[test]
    fn error_messages() {
        let err = IngestError::SeriesKeyTooLong { len: 300, max: 255 };
        assert_eq!(format!("{}", err), "Series key length 300 exceeds 255");

        let err = IngestError::InvalidTimestamp { reason: "not ISO 8601" };
        assert_eq!(format!("{}", err), "Invalid timestamp: not ISO 8601");
    }
}
