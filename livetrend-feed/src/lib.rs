//! Live Feed for the livetrend Buffer
//!
//! ## Overview
//!
//! The core buffer is synchronous and side-effect free. This crate is the
//! refresh loop around it: an interval-driven task pulls a batch from each
//! source every tick and hands it over a channel to a single buffer task,
//! which merges it and publishes the new window to subscribers.
//!
//! ```text
//!  HttpPoller ──┐  tick                       ┌──────────────┐
//!               ├──────► mpsc<Vec<Sample>> ──►│ buffer task  │──► watch<Arc<Window>>
//!  PushSource ──┘                             │ (one updater)│      chart, badges
//!                                             └──────────────┘
//! ```
//!
//! ## Sources
//!
//! ### HTTP polling (`http` feature)
//!
//! **When to use:**
//! - The platform exposes a "latest readings" endpoint
//! - Firewall-friendly, stateless
//!
//! Each tick issues one GET; transport errors, 5xx and 429 are retried with
//! exponential backoff. A failed tick is logged and skipped; the next tick
//! tries again.
//!
//! ### Push channel
//!
//! **When to use:**
//! - Readings arrive from a WebSocket or MQTT bridge owned by the host
//!
//! The host pushes records into a [`PushHandle`]; every tick drains whatever
//! is pending without waiting.
//!
//! ## Single updater
//!
//! However many sources are attached, only the buffer task calls
//! `ingest`. Batches from different sources are serialised through the
//! channel, so the window never sees concurrent writers.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use livetrend_feed::{push_channel, FeedConfig, LiveFeed};
//! use livetrend_core::ingest::RawSample;
//!
//! # async fn example() -> Result<(), livetrend_feed::FeedError> {
//! let (pusher, source) = push_channel(256);
//! let feed = LiveFeed::new(FeedConfig::new().tick_secs(30))
//!     .source(source)
//!     .spawn();
//!
//! pusher.push(RawSample::new("pump-07", 1_714_564_800_000u64, 61.2).into()).await?;
//!
//! let mut updates = feed.subscribe();
//! updates.changed().await.ok();
//! for series in updates.borrow().snapshot() {
//!     println!("{} {} {:.1}%", series.series_key, series.trend.direction, series.trend.percent_change);
//! }
//!
//! feed.shutdown().await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod live;
pub mod push;

#[cfg(feature = "http")]
pub mod http;

pub use config::FeedConfig;
pub use live::{FeedHandle, LiveFeed};
pub use push::{push_channel, PushHandle, PushSource};

#[cfg(feature = "http")]
pub use http::{AuthMethod, HttpConfig, HttpPoller};

use livetrend_core::ingest::IncomingRecord;
use thiserror::Error;

/// Feed errors
#[derive(Debug, Error)]
pub enum FeedError {
    /// Network or request error
    #[error("Request failed: {0}")]
    Request(String),

    /// Server returned an error status
    #[error("Server error {status}: {message}")]
    Status { status: u16, message: String },

    /// Response body was not a batch of records
    #[error("Decode error: {0}")]
    Decode(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The receiving side of a channel is gone
    #[error("Channel closed")]
    ChannelClosed,

    /// A bounded channel is full
    #[error("Channel full")]
    Backpressure,

    /// A feed task panicked or was cancelled
    #[error("Task failed: {0}")]
    Task(String),
}

/// Something that yields a batch of records once per tick
///
/// `fetch` returns whatever became available since the previous call. An
/// empty batch is normal: the buffer still runs eviction for the tick.
#[async_trait::async_trait]
pub trait BatchSource: Send {
    /// Fetch the records for this tick
    async fn fetch(&mut self) -> Result<Vec<IncomingRecord>, FeedError>;

    /// Short name for logs
    fn name(&self) -> &str;

    /// Records dropped while decoding since the last call
    ///
    /// Sources that decode raw input themselves report here what never made
    /// it into a batch; the feed adds it to `samples_rejected`.
    fn take_rejected(&mut self) -> usize {
        0
    }
}

/// Counters kept by a running feed
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FeedStats {
    /// Timer ticks across all sources
    pub ticks: u64,
    /// Batches merged by the buffer task
    pub batches: u64,
    /// Samples accepted into the window
    pub samples_accepted: u64,
    /// Samples dropped as already present
    pub samples_duplicate: u64,
    /// Records refused at the ingestion boundary, undecodable ones included
    pub samples_rejected: u64,
    /// Ticks whose fetch failed
    pub fetch_failures: u64,
    /// Last fetch error message
    pub last_error: Option<String>,
}
