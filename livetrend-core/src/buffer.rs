//! Rolling Telemetry Buffer
//!
//! ## Overview
//!
//! [`WindowedSeriesBuffer`] owns the live [`Window`] of a dashboard and is the
//! single updater of it. Each tick it folds the new batch in with
//! [`window::update`](crate::window::update) and swaps the shared window for
//! the result. Readers hold an `Arc<Window>`; an update never writes through a
//! window somebody else is rendering.
//!
//! ```text
//!  tick N ─► ingest(batch, now) ─► Arc<Window N>  ─► chart, badges
//!  tick N+1 ─► ingest(batch, now) ─► Arc<Window N+1>   (Window N still valid)
//! ```
//!
//! ## Thread Safety
//!
//! The buffer itself is not synchronised. With several data sources, funnel
//! their batches through one task (see the live feed) or guard the buffer
//! with a mutex.
//!
//! ## Usage Example
//!
//! ```rust
//! use livetrend_core::buffer::WindowedSeriesBuffer;
//! use livetrend_core::{Sample, TrendDirection, WindowConfig};
//!
//! let mut buffer = WindowedSeriesBuffer::new(WindowConfig::new().with_window_secs(300));
//!
//! buffer.ingest(&[Sample::new("d1", 1_000, 10.0)], 1_000);
//! buffer.ingest(&[Sample::new("d1", 31_000, 20.0)], 31_000);
//!
//! assert_eq!(buffer.values_for("d1"), vec![10.0, 20.0]);
//! assert_eq!(buffer.window().trend_for("d1").direction, TrendDirection::Up);
//! ```

use alloc::sync::Arc;
use alloc::vec::Vec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::WindowConfig;
use crate::constants::ESTIMATED_KB_PER_POINT;
use crate::sample::{Reading, Sample};
use crate::snapshot::SeriesSnapshot;
use crate::stream::{Stream, StreamError};
use crate::time::{TimeSource, Timestamp};
use crate::window::{self, MergeReport, Window};

/// Aggregate figures about the buffer contents
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct BufferStatistics {
    /// Readings across all series
    pub total_points: usize,
    /// Series with at least one reading
    pub series_count: usize,
    /// Mean readings per series, rounded to two decimals
    pub avg_points_per_series: f64,
    /// Configured retention window
    pub window_secs: u64,
    /// `now` of the last update
    pub last_update: Option<Timestamp>,
    /// Approximate memory held by the readings
    pub estimated_memory_kb: u64,
    /// Same figure in MB, rounded to two decimals
    pub estimated_memory_mb: f64,
}

/// Owner and single updater of a live window
#[derive(Debug, Clone)]
pub struct WindowedSeriesBuffer {
    config: WindowConfig,
    window: Arc<Window>,
}

impl Default for WindowedSeriesBuffer {
    fn default() -> Self {
        Self::new(WindowConfig::default())
    }
}

impl WindowedSeriesBuffer {
    /// Empty buffer with the given configuration
    pub fn new(config: WindowConfig) -> Self {
        log_debug!(
            "Initialized windowed series buffer (window: {} s)",
            config.window_secs
        );
        Self {
            config,
            window: Arc::new(Window::new()),
        }
    }

    /// Empty buffer with default configuration and a custom window
    pub fn with_window_secs(secs: u64) -> Self {
        Self::new(WindowConfig::new().with_window_secs(secs))
    }

    /// Active configuration
    pub fn config(&self) -> &WindowConfig {
        &self.config
    }

    /// Merge a batch at `now` and publish the new window
    pub fn ingest(&mut self, batch: &[Sample], now: Timestamp) -> Arc<Window> {
        self.ingest_with_report(batch, now).0
    }

    /// [`ingest`](Self::ingest), also returning the merge counters
    pub fn ingest_with_report(&mut self, batch: &[Sample], now: Timestamp) -> (Arc<Window>, MergeReport) {
        let now = self.clamp_now(now);
        let (next, report) =
            window::update_with_report(&self.window, batch, now, self.config.window_secs);

        log_trace!(
            "Merged batch of {} at {}: {} accepted, {} duplicate, {} stale, {} evicted",
            batch.len(),
            now,
            report.accepted,
            report.duplicates,
            report.stale,
            report.evicted
        );

        self.window = Arc::new(next);
        (Arc::clone(&self.window), report)
    }

    /// Pull every batch the stream has ready and merge each at the clock's `now`
    ///
    /// Returns the number of batches merged. `WouldBlock` and end of stream
    /// both end the drain without error.
    pub fn drain<S, T, E>(&mut self, stream: &mut S, clock: &T) -> Result<usize, StreamError<E>>
    where
        S: Stream<Item = Vec<Sample>, Error = StreamError<E>>,
        T: TimeSource,
    {
        let mut merged = 0;
        loop {
            match stream.poll_next() {
                Ok(batch) => {
                    self.ingest(&batch, clock.now());
                    merged += 1;
                }
                Err(nb::Error::WouldBlock) => return Ok(merged),
                Err(nb::Error::Other(StreamError::EndOfStream)) => return Ok(merged),
                Err(nb::Error::Other(e)) => return Err(e),
            }
        }
    }

    /// Current window, shared
    pub fn window(&self) -> Arc<Window> {
        Arc::clone(&self.window)
    }

    /// Values of a series in timestamp order
    pub fn values_for(&self, series_key: &str) -> Vec<f64> {
        self.window.values_for(series_key)
    }

    /// Retained readings of a series, oldest first
    pub fn readings_for(&self, series_key: &str) -> &[Reading] {
        self.window.readings(series_key)
    }

    /// Most recent reading of a series
    pub fn latest(&self, series_key: &str) -> Option<Reading> {
        self.window.latest(series_key)
    }

    /// Chart and badge data for every series
    pub fn snapshot(&self) -> Vec<SeriesSnapshot> {
        self.window.snapshot()
    }

    /// Drop one series; returns whether it was present
    pub fn clear(&mut self, series_key: &str) -> bool {
        if !self.window.contains(series_key) {
            return false;
        }
        self.window = Arc::new(self.window.without_series(series_key));
        log_debug!("Cleared buffer for series: {}", series_key);
        true
    }

    /// Drop every series
    pub fn clear_all(&mut self) {
        let series_count = self.window.series_count();
        let total_points = self.window.total_points();

        self.window = Arc::new(Window::new());
        log_info!(
            "Cleared buffer: {} series, {} total points",
            series_count,
            total_points
        );
    }

    /// Aggregate figures for monitoring
    pub fn statistics(&self) -> BufferStatistics {
        let total_points = self.window.total_points();
        let series_count = self.window.series_count();
        let avg_points_per_series = if series_count == 0 {
            0.0
        } else {
            libm::round(total_points as f64 / series_count as f64 * 100.0) / 100.0
        };
        let estimated_memory_kb = total_points as u64 * ESTIMATED_KB_PER_POINT;

        BufferStatistics {
            total_points,
            series_count,
            avg_points_per_series,
            window_secs: self.config.window_secs,
            last_update: self.window.as_of(),
            estimated_memory_kb,
            estimated_memory_mb: libm::round(estimated_memory_kb as f64 / 1024.0 * 100.0) / 100.0,
        }
    }

    // Eviction assumes a non-decreasing `now`.
    fn clamp_now(&self, now: Timestamp) -> Timestamp {
        match self.window.as_of() {
            Some(last) if now < last => {
                log_warn!("Clock stepped back from {} to {}; holding at {}", last, now, last);
                last
            }
            _ => now,
        }
    }
}
