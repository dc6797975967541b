//! Core of the livetrend telemetry buffer
//!
//! Keeps a trailing time window of readings per series for a live chart and
//! derives the trend badge from it. Batches arrive unordered and, after a
//! reconnect, with repeats; the window drops duplicates (first seen wins),
//! evicts readings older than the window and keeps every series sorted.
//!
//! Key properties:
//! - Pure merge: `update` returns a new window, the old one stays valid
//! - Total: no input within the sample contract produces an error
//! - `no_std` + `alloc` capable
//!
//! ```rust
//! use livetrend_core::{classify, update, values_for, Sample, TrendDirection, Window};
//!
//! let window = update(
//!     &Window::new(),
//!     &[Sample::new("d1", 0, 100.0), Sample::new("d1", 30_000, 50.0)],
//!     30_000,
//!     300,
//! );
//!
//! let trend = classify(&values_for(&window, "d1"));
//! assert_eq!(trend.direction, TrendDirection::Down);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

extern crate alloc;

#[macro_use]
mod macros;

pub mod buffer;
pub mod config;
pub mod constants;
pub mod errors;
pub mod ingest;
pub mod sample;
pub mod snapshot;
pub mod stream;
pub mod time;
pub mod traits;
pub mod trend;
pub mod window;

// Public API
pub use buffer::{BufferStatistics, WindowedSeriesBuffer};
pub use config::{SeriesKeyMode, WindowConfig};
pub use errors::{IngestError, IngestResult};
pub use sample::{Reading, Sample};
pub use snapshot::SeriesSnapshot;
pub use traits::{Stream, TimeSource};
pub use trend::{classify, TrendDirection, TrendResult};
pub use window::{update, update_with_report, values_for, MergeReport, Window};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
