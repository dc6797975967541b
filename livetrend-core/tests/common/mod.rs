//! Common test utilities for integration tests
//!
//! - Deterministic telemetry generators (no RNG crate, reproducible runs)
//! - Reconnect and out-of-order delivery helpers

#![allow(dead_code)]

use livetrend_core::{time::Timestamp, Sample};

/// Deterministic telemetry generator
pub struct TestDataGenerator {
    seed: u32,
}

impl TestDataGenerator {
    pub fn new(seed: u32) -> Self {
        Self { seed }
    }

    /// Regular readings every `interval_ms` from `start`, with a linear drift
    /// and a little noise
    pub fn series(
        &mut self,
        series_key: &str,
        start: Timestamp,
        interval_ms: u64,
        count: usize,
        base: f64,
        drift_per_sample: f64,
    ) -> Vec<Sample> {
        (0..count)
            .map(|i| {
                let noise = self.random_noise(0.05);
                Sample::new(
                    series_key,
                    start + i as u64 * interval_ms,
                    base + drift_per_sample * i as f64 + noise,
                )
            })
            .collect()
    }

    /// Fisher-Yates shuffle driven by the generator's LCG
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = (self.next_u32() as usize) % (i + 1);
            items.swap(i, j);
        }
    }

    pub fn random_noise(&mut self, amplitude: f64) -> f64 {
        (self.random_float() * 2.0 - 1.0) * amplitude
    }

    pub fn random_float(&mut self) -> f64 {
        self.next_u32() as f64 / u32::MAX as f64
    }

    fn next_u32(&mut self) -> u32 {
        self.seed = self.seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
        self.seed
    }
}

/// A batch as delivered after a reconnect: the tail of what was already sent,
/// plus the new readings
pub fn reconnect_batch(previous: &[Sample], overlap: usize, fresh: &[Sample]) -> Vec<Sample> {
    let start = previous.len().saturating_sub(overlap);
    previous[start..].iter().chain(fresh).cloned().collect()
}

/// Same identities as `batch`, different values
pub fn corrupted_copy(batch: &[Sample]) -> Vec<Sample> {
    batch
        .iter()
        .map(|s| Sample::new(s.series_key.clone(), s.timestamp, s.value + 1_000.0))
        .collect()
}
