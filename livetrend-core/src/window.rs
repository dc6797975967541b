//! Trailing Time Window of Telemetry Series
//!
//! ## Overview
//!
//! A [`Window`] maps each series key to the readings received within the last
//! `W` seconds. Batches arrive on every refresh tick, unordered, and after a
//! reconnect they often repeat readings that are already held. [`update`]
//! folds a batch into the previous window and returns a fresh one.
//!
//! ## Merge Algorithm
//!
//! ```text
//! previous window ──► 1. evict (now - ts > W) ──► 2. identity set
//!                                                         │
//! incoming batch ─────────────────────────────► 3. merge (skip known ids)
//!                                                         │
//!                                                 4. sort touched series
//!                                                         │
//!                                                         ▼
//!                                                    new window
//! ```
//!
//! Eviction runs before the merge so its cost is bounded by the previous
//! window, not by the batch. Incoming samples already older than the window
//! are dropped at merge time so the returned state never holds a stale
//! reading.
//!
//! ## Invariants
//!
//! After every update:
//! - every reading satisfies `now - timestamp <= W`
//! - no two readings of a series share a timestamp (first seen wins)
//! - each series is sorted ascending by timestamp
//! - series with no readings are removed
//!
//! A zero-length window is accepted and simply retains nothing.
//!
//! ## Usage Example
//!
//! ```rust
//! use livetrend_core::window::{update, values_for, Window};
//! use livetrend_core::Sample;
//!
//! let window = update(&Window::new(), &[Sample::new("d1", 0, 10.0)], 0, 300);
//! assert_eq!(values_for(&window, "d1"), vec![10.0]);
//!
//! // Reconnect replays the same reading with a different value: ignored.
//! let window = update(&window, &[Sample::new("d1", 0, 99.0)], 1_000, 300);
//! assert_eq!(values_for(&window, "d1"), vec![10.0]);
//!
//! // Five minutes and a second later it has aged out.
//! let window = update(&window, &[], 301_000, 300);
//! assert!(values_for(&window, "d1").is_empty());
//! ```

use alloc::collections::{BTreeMap, BTreeSet};
use alloc::string::String;
use alloc::vec::Vec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::sample::{Reading, Sample};
use crate::snapshot::SeriesSnapshot;
use crate::time::{age_ms, secs_to_ms, Timestamp};
use crate::trend::{classify, TrendResult};

/// Retained readings per series, bounded to a trailing time window
///
/// A `Window` is a plain value. Updates build a new one, so a renderer
/// holding the previous window keeps a consistent view.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Window {
    series: BTreeMap<String, Vec<Reading>>,
    as_of: Option<Timestamp>,
}

/// Counters describing what one update did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// New readings merged into the window
    pub accepted: usize,
    /// Batch samples whose identity was already present
    pub duplicates: usize,
    /// Batch samples already outside the window
    pub stale: usize,
    /// Previously retained readings dropped by eviction
    pub evicted: usize,
}

impl Window {
    /// Empty window, as used before the first update
    pub fn new() -> Self {
        Self::default()
    }

    /// `now` of the update that produced this window
    pub fn as_of(&self) -> Option<Timestamp> {
        self.as_of
    }

    /// True when no series holds a reading
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Number of series with at least one reading
    pub fn series_count(&self) -> usize {
        self.series.len()
    }

    /// Total readings across all series
    pub fn total_points(&self) -> usize {
        self.series.values().map(Vec::len).sum()
    }

    /// Series keys in ascending order
    pub fn series_keys(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    /// Whether the series has retained readings
    pub fn contains(&self, series_key: &str) -> bool {
        self.series.contains_key(series_key)
    }

    /// Retained readings of a series, oldest first
    pub fn readings(&self, series_key: &str) -> &[Reading] {
        self.series
            .get(series_key)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Values of a series in timestamp order; empty if the series is absent
    pub fn values_for(&self, series_key: &str) -> Vec<f64> {
        self.readings(series_key).iter().map(|r| r.value).collect()
    }

    /// Most recent reading of a series
    pub fn latest(&self, series_key: &str) -> Option<Reading> {
        self.readings(series_key).last().copied()
    }

    /// Trend of a series over its retained values
    pub fn trend_for(&self, series_key: &str) -> TrendResult {
        classify(&self.values_for(series_key))
    }

    /// Chart and badge data for one series
    pub fn snapshot_for(&self, series_key: &str) -> Option<SeriesSnapshot> {
        self.series
            .get_key_value(series_key)
            .map(|(key, readings)| SeriesSnapshot::from_readings(key, readings))
    }

    /// Chart and badge data for every series, ordered by key
    pub fn snapshot(&self) -> Vec<SeriesSnapshot> {
        self.series
            .iter()
            .map(|(key, readings)| SeriesSnapshot::from_readings(key, readings))
            .collect()
    }

    /// Iterate over `(series_key, readings)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Reading])> {
        self.series
            .iter()
            .map(|(key, readings)| (key.as_str(), readings.as_slice()))
    }

    /// Copy of this window without one series
    pub fn without_series(&self, series_key: &str) -> Self {
        let mut next = self.clone();
        next.series.remove(series_key);
        next
    }
}

/// Whether a reading stamped `timestamp` is still inside the window at `now`
#[inline]
pub fn is_retained(timestamp: Timestamp, now: Timestamp, window_secs: u64) -> bool {
    window_secs > 0 && age_ms(now, timestamp) <= secs_to_ms(window_secs)
}

/// Fold a batch into the previous window
///
/// Pure: `existing` is left untouched and a new window is returned. Never
/// fails; duplicates and stale samples are dropped silently.
pub fn update(existing: &Window, batch: &[Sample], now: Timestamp, window_secs: u64) -> Window {
    update_with_report(existing, batch, now, window_secs).0
}

/// [`update`], also returning what happened to each sample
pub fn update_with_report(
    existing: &Window,
    batch: &[Sample],
    now: Timestamp,
    window_secs: u64,
) -> (Window, MergeReport) {
    let mut report = MergeReport::default();
    let mut series: BTreeMap<String, Vec<Reading>> = BTreeMap::new();
    let mut seen: BTreeMap<&str, BTreeSet<Timestamp>> = BTreeMap::new();

    // 1 + 2: evict, and remember the identities that survive
    for (key, readings) in &existing.series {
        let kept: Vec<Reading> = readings
            .iter()
            .copied()
            .filter(|r| is_retained(r.timestamp, now, window_secs))
            .collect();
        report.evicted += readings.len() - kept.len();

        if kept.is_empty() {
            continue;
        }
        seen.insert(key.as_str(), kept.iter().map(|r| r.timestamp).collect());
        series.insert(key.clone(), kept);
    }

    // 3: merge, first seen wins
    let mut touched: BTreeSet<&str> = BTreeSet::new();
    for sample in batch {
        if !is_retained(sample.timestamp, now, window_secs) {
            report.stale += 1;
            continue;
        }

        let key = sample.series_key.as_str();
        if !seen.entry(key).or_default().insert(sample.timestamp) {
            report.duplicates += 1;
            continue;
        }

        match series.get_mut(key) {
            Some(readings) => readings.push(sample.reading()),
            None => {
                series.insert(sample.series_key.clone(), alloc::vec![sample.reading()]);
            }
        }
        touched.insert(key);
        report.accepted += 1;
    }

    // 4: batches are unordered
    for key in touched {
        if let Some(readings) = series.get_mut(key) {
            readings.sort_unstable_by_key(|r| r.timestamp);
        }
    }

    let window = Window {
        series,
        as_of: Some(now),
    };
    (window, report)
}

/// Values of a series in timestamp order; empty if the series is absent
pub fn values_for(state: &Window, series_key: &str) -> Vec<f64> {
    state.values_for(series_key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trend::TrendDirection;
    use alloc::vec;

    const W: u64 = 300;

    fn s(key: &str, secs: u64, value: f64) -> Sample {
        Sample::new(key, secs * 1000, value)
    }

    #[test]
    fn first_update_from_empty() {
        let window = update(&Window::new(), &[s("d1", 0, 10.0)], 0, W);
        assert_eq!(values_for(&window, "d1"), vec![10.0]);
        assert_eq!(window.as_of(), Some(0));
    }

    #[test]
    fn duplicate_timestamp_keeps_first_value() {
        let window = update(&Window::new(), &[s("d1", 0, 10.0)], 0, W);
        let window = update(&window, &[s("d1", 0, 99.0)], 1_000, W);
        assert_eq!(values_for(&window, "d1"), vec![10.0]);
    }

    #[test]
    fn duplicates_within_one_batch() {
        let batch = [s("d1", 5, 1.0), s("d1", 5, 2.0), s("d2", 5, 3.0)];
        let (window, report) = update_with_report(&Window::new(), &batch, 10_000, W);

        assert_eq!(values_for(&window, "d1"), vec![1.0]);
        assert_eq!(values_for(&window, "d2"), vec![3.0]);
        assert_eq!(report.accepted, 2);
        assert_eq!(report.duplicates, 1);
    }

    #[test]
    fn eviction_after_window_elapses() {
        let window = update(&Window::new(), &[s("d1", 0, 10.0)], 0, W);
        let (window, report) = update_with_report(&window, &[], 301_000, W);

        assert!(values_for(&window, "d1").is_empty());
        assert!(!window.contains("d1"));
        assert_eq!(report.evicted, 1);
    }

    #[test]
    fn reading_exactly_at_window_edge_is_kept() {
        let window = update(&Window::new(), &[s("d1", 0, 10.0)], 0, W);
        let window = update(&window, &[], 300_000, W);
        assert_eq!(values_for(&window, "d1"), vec![10.0]);
    }

    #[test]
    fn out_of_order_batch_is_sorted() {
        let batch = [s("d1", 30, 3.0), s("d1", 10, 1.0), s("d1", 20, 2.0)];
        let window = update(&Window::new(), &batch, 60_000, W);
        assert_eq!(values_for(&window, "d1"), vec![1.0, 2.0, 3.0]);

        let window = update(&window, &[s("d1", 15, 1.5)], 61_000, W);
        assert_eq!(values_for(&window, "d1"), vec![1.0, 1.5, 2.0, 3.0]);
    }

    #[test]
    fn stale_incoming_samples_are_dropped() {
        let (window, report) =
            update_with_report(&Window::new(), &[s("d1", 0, 1.0), s("d1", 500, 2.0)], 600_000, W);

        assert_eq!(values_for(&window, "d1"), vec![2.0]);
        assert_eq!(report.stale, 1);
    }

    #[test]
    fn evicted_identity_may_return() {
        let window = update(&Window::new(), &[s("d1", 0, 10.0)], 0, W);
        let window = update(&window, &[], 400_000, W);
        // No longer held, so no longer a duplicate; but it is stale, too.
        let (window, report) = update_with_report(&window, &[s("d1", 0, 11.0)], 400_000, W);
        assert!(window.is_empty());
        assert_eq!(report.duplicates, 0);
        assert_eq!(report.stale, 1);
    }

    #[test]
    fn zero_window_retains_nothing() {
        let window = update(&Window::new(), &[s("d1", 10, 1.0)], 10_000, 0);
        assert!(window.is_empty());
        assert_eq!(window.as_of(), Some(10_000));
    }

    #[test]
    fn previous_window_is_untouched() {
        let first = update(&Window::new(), &[s("d1", 0, 10.0)], 0, W);
        let snapshot = first.clone();
        let _second = update(&first, &[s("d1", 1, 11.0)], 400_000, W);
        assert_eq!(first, snapshot);
    }

    #[test]
    fn series_are_independent() {
        let batch = [s("a", 1, 1.0), s("b", 1, 5.0), s("a", 2, 2.0)];
        let window = update(&Window::new(), &batch, 2_000, W);

        assert_eq!(window.series_count(), 2);
        assert_eq!(window.total_points(), 3);
        assert_eq!(window.series_keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(window.latest("a"), Some(Reading::new(2_000, 2.0)));
        assert_eq!(window.latest("missing"), None);
    }

    #[test]
    fn trend_over_window() {
        let batch = [s("d1", 1, 10.0), s("d1", 2, 20.0)];
        let window = update(&Window::new(), &batch, 2_000, W);
        assert_eq!(window.trend_for("d1").direction, TrendDirection::Up);
        assert_eq!(window.trend_for("absent").direction, TrendDirection::Stable);
    }

    #[test]
    fn without_series_leaves_others() {
        let batch = [s("a", 1, 1.0), s("b", 1, 5.0)];
        let window = update(&Window::new(), &batch, 1_000, W);
        let trimmed = window.without_series("a");

        assert!(!trimmed.contains("a"));
        assert!(trimmed.contains("b"));
        assert!(window.contains("a"));
    }
}
