//! Ingestion boundary: raw records to samples
//!
//! [`update`](crate::window::update) trusts its input. This module is the
//! caller-side filter in front of it: it resolves timestamps, rejects empty
//! or oversized series keys and non-finite values, and expands the platform's
//! multi-variable telemetry payloads into one sample per series.
//!
//! ## Accepted shapes
//!
//! A flat sample:
//! ```json
//! { "seriesKey": "pump-07", "timestamp": "2024-05-01T12:00:00Z", "value": 61.2 }
//! ```
//!
//! A device payload, as posted by the ingestion API and MQTT bridge:
//! ```json
//! { "deviceId": "pump-07", "timestamp": 1714564800000,
//!   "variables": { "temperature": 61.2, "vibration": 4.1 } }
//! ```
//!
//! Timestamps are epoch milliseconds or RFC 3339 strings. A payload without a
//! timestamp is stamped with the caller's `now`.

use alloc::collections::BTreeMap;
use alloc::format;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use chrono::{DateTime, NaiveDateTime};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::SeriesKeyMode;
use crate::constants::window::{MAX_SERIES_KEY_LEN, SERIES_KEY_SEPARATOR};
use crate::errors::{IngestError, IngestResult};
use crate::sample::Sample;
use crate::time::Timestamp;

/// Timestamp as it appears on the wire
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum RawTimestamp {
    /// Milliseconds since the Unix epoch
    Millis(u64),
    /// RFC 3339 instant, or decimal epoch milliseconds
    Text(String),
}

impl RawTimestamp {
    /// Resolve to epoch milliseconds
    pub fn resolve(&self) -> IngestResult<Timestamp> {
        match self {
            Self::Millis(ms) => Ok(*ms),
            Self::Text(text) => parse_timestamp(text),
        }
    }
}

impl From<Timestamp> for RawTimestamp {
    fn from(ms: Timestamp) -> Self {
        Self::Millis(ms)
    }
}

/// Date-time without an offset, fractional seconds optional
const LOCAL_DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Parse an RFC 3339 instant, an offset-less ISO 8601 date-time (read as UTC)
/// or a decimal epoch-millisecond string
pub fn parse_timestamp(text: &str) -> IngestResult<Timestamp> {
    let text = text.trim();
    if text.is_empty() {
        return Err(IngestError::InvalidTimestamp { reason: "empty" });
    }

    if text.bytes().all(|b| b.is_ascii_digit()) {
        return text.parse::<u64>().map_err(|_| IngestError::InvalidTimestamp {
            reason: "epoch out of range",
        });
    }

    // No offset means UTC.
    let millis = match DateTime::parse_from_rfc3339(text) {
        Ok(parsed) => parsed.timestamp_millis(),
        Err(_) => NaiveDateTime::parse_from_str(text, LOCAL_DATE_TIME_FORMAT)
            .map_err(|_| IngestError::InvalidTimestamp {
                reason: "not ISO 8601",
            })?
            .and_utc()
            .timestamp_millis(),
    };
    u64::try_from(millis).map_err(|_| IngestError::InvalidTimestamp {
        reason: "before Unix epoch",
    })
}

fn check_series_key(key: &str) -> IngestResult<()> {
    if key.trim().is_empty() {
        return Err(IngestError::EmptySeriesKey);
    }
    if key.len() > MAX_SERIES_KEY_LEN {
        return Err(IngestError::SeriesKeyTooLong {
            len: key.len(),
            max: MAX_SERIES_KEY_LEN,
        });
    }
    Ok(())
}

fn check_value(value: f64) -> IngestResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(IngestError::NonFiniteValue { value })
    }
}

/// Unvalidated flat sample
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct RawSample {
    /// Series (device) identifier
    #[cfg_attr(feature = "serde", serde(alias = "deviceId"))]
    pub series_key: String,
    /// Wire timestamp
    pub timestamp: RawTimestamp,
    /// Measured value
    pub value: f64,
}

impl RawSample {
    /// Create a raw sample
    pub fn new(series_key: impl Into<String>, timestamp: impl Into<RawTimestamp>, value: f64) -> Self {
        Self {
            series_key: series_key.into(),
            timestamp: timestamp.into(),
            value,
        }
    }

    /// Validate and convert into a [`Sample`]
    pub fn resolve(&self) -> IngestResult<Sample> {
        check_series_key(&self.series_key)?;
        let value = check_value(self.value)?;
        let timestamp = self.timestamp.resolve()?;
        Ok(Sample::new(self.series_key.clone(), timestamp, value))
    }
}

/// Multi-variable reading from one device
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct TelemetryPayload {
    /// Device identifier
    pub device_id: String,
    /// Reading time; `None` means "when received"
    #[cfg_attr(feature = "serde", serde(default))]
    pub timestamp: Option<RawTimestamp>,
    /// Variable name to value; non-numeric entries are skipped when decoding
    #[cfg_attr(
        feature = "serde",
        serde(default, deserialize_with = "numeric_variables::deserialize")
    )]
    pub variables: BTreeMap<String, f64>,
}

impl TelemetryPayload {
    /// Payload with no variables yet
    pub fn new(device_id: impl Into<String>, timestamp: Option<RawTimestamp>) -> Self {
        Self {
            device_id: device_id.into(),
            timestamp,
            variables: BTreeMap::new(),
        }
    }

    /// Add a variable
    pub fn with_variable(mut self, name: impl Into<String>, value: f64) -> Self {
        self.variables.insert(name.into(), value);
        self
    }

    /// Expand into samples according to `mode`
    ///
    /// `now` stamps payloads that carry no timestamp. One bad variable rejects
    /// the whole payload.
    pub fn into_samples(&self, mode: &SeriesKeyMode, now: Timestamp) -> IngestResult<Vec<Sample>> {
        check_series_key(&self.device_id)?;
        let timestamp = match &self.timestamp {
            Some(raw) => raw.resolve()?,
            None => now,
        };

        match mode {
            SeriesKeyMode::Device { variable } => {
                let value = self
                    .variables
                    .get(variable)
                    .copied()
                    .ok_or(IngestError::UnknownVariable)?;
                let value = check_value(value)?;
                Ok(vec![Sample::new(self.device_id.clone(), timestamp, value)])
            }
            SeriesKeyMode::PerVariable => self
                .variables
                .iter()
                .map(|(name, &value)| {
                    let value = check_value(value)?;
                    let key = format!("{}{}{}", self.device_id, SERIES_KEY_SEPARATOR, name);
                    Ok(Sample::new(key, timestamp, value))
                })
                .collect(),
        }
    }
}

#[cfg(feature = "serde")]
mod numeric_variables {
    use alloc::collections::BTreeMap;
    use alloc::string::String;

    use serde::de::{Deserializer, IgnoredAny};
    use serde::Deserialize;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum VariableValue {
        Number(f64),
        Other(IgnoredAny),
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<BTreeMap<String, f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = BTreeMap::<String, VariableValue>::deserialize(deserializer)?;
        Ok(raw
            .into_iter()
            .filter_map(|(name, value)| match value {
                VariableValue::Number(value) => Some((name, value)),
                VariableValue::Other(_) => {
                    log_debug!("Skipping non-numeric variable: {}", name);
                    None
                }
            })
            .collect())
    }
}

/// Either record shape a feed may deliver
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum IncomingRecord {
    /// Flat sample
    Sample(RawSample),
    /// Device payload
    Payload(TelemetryPayload),
}

impl IncomingRecord {
    /// Validate and expand into samples
    pub fn into_samples(&self, mode: &SeriesKeyMode, now: Timestamp) -> IngestResult<Vec<Sample>> {
        match self {
            Self::Sample(raw) => raw.resolve().map(|sample| vec![sample]),
            Self::Payload(payload) => payload.into_samples(mode, now),
        }
    }
}

impl From<RawSample> for IncomingRecord {
    fn from(raw: RawSample) -> Self {
        Self::Sample(raw)
    }
}

impl From<TelemetryPayload> for IncomingRecord {
    fn from(payload: TelemetryPayload) -> Self {
        Self::Payload(payload)
    }
}

/// Valid samples of a batch and how many records were dropped
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sanitized {
    /// Samples ready for the window
    pub samples: Vec<Sample>,
    /// Records refused at the boundary
    pub rejected: usize,
}

/// Filter a batch of records, keeping what resolves
pub fn sanitize<'a, I>(records: I, mode: &SeriesKeyMode, now: Timestamp) -> Sanitized
where
    I: IntoIterator<Item = &'a IncomingRecord>,
{
    let mut out = Sanitized::default();
    for record in records {
        match record.into_samples(mode, now) {
            Ok(samples) => out.samples.extend(samples),
            Err(e) => {
                log_warn!("Dropping telemetry record: {}", e);
                out.rejected += 1;
            }
        }
    }
    out
}

/// Filter flat raw samples, keeping what resolves
pub fn sanitize_samples<'a, I>(raw: I) -> Sanitized
where
    I: IntoIterator<Item = &'a RawSample>,
{
    let mut out = Sanitized::default();
    for sample in raw {
        match sample.resolve() {
            Ok(sample) => out.samples.push(sample),
            Err(e) => {
                log_warn!("Dropping sample for '{}': {}", sample.series_key, e);
                out.rejected += 1;
            }
        }
    }
    out
}
