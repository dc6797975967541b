//! Per-series output handed to the rendering layer

use alloc::string::String;
use alloc::vec::Vec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::sample::Reading;
use crate::trend::{classify, TrendResult};

/// Values for the chart and trend for the badge of one series
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct SeriesSnapshot {
    /// Series (device) identifier
    pub series_key: String,
    /// Retained values, oldest first
    pub values: Vec<f64>,
    /// Trend over `values`
    pub trend: TrendResult,
    /// Most recent reading, if any
    pub latest: Option<Reading>,
}

impl SeriesSnapshot {
    pub(crate) fn from_readings(series_key: &str, readings: &[Reading]) -> Self {
        let values: Vec<f64> = readings.iter().map(|r| r.value).collect();
        let trend = classify(&values);
        Self {
            series_key: series_key.into(),
            values,
            trend,
            latest: readings.last().copied(),
        }
    }
}
