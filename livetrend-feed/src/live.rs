//! Refresh loop
//!
//! One poller task per source ticks on a `tokio::time::interval`, fetches,
//! sanitizes and sends the batch down a bounded channel. A single buffer task
//! owns the [`WindowedSeriesBuffer`], merges every batch at the clock's `now`
//! and publishes the new window through a `watch` channel.
//!
//! A tick always yields a batch, empty when the fetch failed or nothing
//! arrived, so readings age out on schedule even when the source is quiet.

use std::sync::{Arc, Mutex, PoisonError};

use livetrend_core::ingest::sanitize;
use livetrend_core::time::SystemTime;
use livetrend_core::{Sample, SeriesKeyMode, SeriesSnapshot, TimeSource, Window, WindowedSeriesBuffer};
use log::{debug, info, trace, warn};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use crate::{BatchSource, FeedConfig, FeedError, FeedStats};

type SharedClock = Arc<dyn TimeSource + Sync>;
type SharedStats = Arc<Mutex<FeedStats>>;

fn with_stats<R>(stats: &SharedStats, f: impl FnOnce(&mut FeedStats) -> R) -> R {
    let mut guard = stats.lock().unwrap_or_else(PoisonError::into_inner);
    f(&mut guard)
}

/// Builder for a running feed
pub struct LiveFeed {
    config: FeedConfig,
    clock: SharedClock,
    sources: Vec<Box<dyn BatchSource>>,
}

impl LiveFeed {
    /// New feed on the wall clock, with no sources yet
    pub fn new(config: FeedConfig) -> Self {
        Self {
            config,
            clock: Arc::new(SystemTime),
            sources: Vec::new(),
        }
    }

    /// Use another time source for `now`
    pub fn with_clock<C>(mut self, clock: C) -> Self
    where
        C: TimeSource + Sync + 'static,
    {
        self.clock = Arc::new(clock);
        self
    }

    /// Attach a batch source
    pub fn source<S>(mut self, source: S) -> Self
    where
        S: BatchSource + 'static,
    {
        self.sources.push(Box::new(source));
        self
    }

    /// Start the tasks on the current tokio runtime
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn spawn(self) -> FeedHandle {
        let LiveFeed {
            config,
            clock,
            sources,
        } = self;

        let buffer = WindowedSeriesBuffer::new(config.window.clone());
        let (window_tx, window_rx) = watch::channel(buffer.window());
        let (batch_tx, batch_rx) = mpsc::channel(config.channel_capacity.max(1));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let stats = SharedStats::default();

        info!(
            "Starting live feed: {} source(s), tick {:?}, window {} s",
            sources.len(),
            config.tick(),
            config.window.window_secs
        );

        let pollers = sources
            .into_iter()
            .map(|source| {
                let poller = Poller {
                    source,
                    key_mode: config.window.key_mode.clone(),
                    clock: clock.clone(),
                    tx: batch_tx.clone(),
                    stats: stats.clone(),
                };
                tokio::spawn(poller.run(config.tick(), shutdown_rx.clone()))
            })
            .collect();
        // The buffer task stops once every poller has dropped its sender.
        drop(batch_tx);

        let buffer = tokio::spawn(run_buffer(buffer, clock, batch_rx, window_tx, stats.clone()));

        FeedHandle {
            window: window_rx,
            stats,
            shutdown: shutdown_tx,
            pollers,
            buffer,
        }
    }
}

struct Poller {
    source: Box<dyn BatchSource>,
    key_mode: SeriesKeyMode,
    clock: SharedClock,
    tx: mpsc::Sender<Vec<Sample>>,
    stats: SharedStats,
}

impl Poller {
    async fn run(mut self, tick: std::time::Duration, mut shutdown: watch::Receiver<bool>) {
        let mut timer = interval(tick);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = timer.tick() => {}
                _ = shutdown.changed() => break,
            }
            with_stats(&self.stats, |s| s.ticks += 1);

            let fetched = tokio::select! {
                fetched = self.source.fetch() => fetched,
                _ = shutdown.changed() => break,
            };

            let batch = match fetched {
                Ok(records) => {
                    let clean = sanitize(&records, &self.key_mode, self.clock.now());
                    let rejected = clean.rejected + self.source.take_rejected();
                    if rejected > 0 {
                        with_stats(&self.stats, |s| s.samples_rejected += rejected as u64);
                    }
                    clean.samples
                }
                Err(e) => {
                    warn!("Fetch from {} failed: {}", self.source.name(), e);
                    with_stats(&self.stats, |s| {
                        s.fetch_failures += 1;
                        s.last_error = Some(e.to_string());
                    });
                    Vec::new()
                }
            };

            if self.tx.send(batch).await.is_err() {
                break;
            }
        }

        debug!("Poller for {} stopped", self.source.name());
    }
}

async fn run_buffer(
    mut buffer: WindowedSeriesBuffer,
    clock: SharedClock,
    mut rx: mpsc::Receiver<Vec<Sample>>,
    published: watch::Sender<Arc<Window>>,
    stats: SharedStats,
) {
    while let Some(batch) = rx.recv().await {
        let (window, report) = buffer.ingest_with_report(&batch, clock.now());
        trace!(
            "Merged batch of {}: {} accepted, {} duplicate, {} stale, {} evicted",
            batch.len(),
            report.accepted,
            report.duplicates,
            report.stale,
            report.evicted
        );
        with_stats(&stats, |s| {
            s.batches += 1;
            s.samples_accepted += report.accepted as u64;
            s.samples_duplicate += report.duplicates as u64;
        });
        published.send_replace(window);
    }

    debug!("Buffer task stopped");
}

/// Handle to a running feed
///
/// Dropping the handle stops the pollers at their next tick; use
/// [`FeedHandle::shutdown`] to wait for the tasks to finish.
pub struct FeedHandle {
    window: watch::Receiver<Arc<Window>>,
    stats: SharedStats,
    shutdown: watch::Sender<bool>,
    pollers: Vec<JoinHandle<()>>,
    buffer: JoinHandle<()>,
}

impl FeedHandle {
    /// Receiver notified on every published window
    pub fn subscribe(&self) -> watch::Receiver<Arc<Window>> {
        self.window.clone()
    }

    /// Most recently published window
    pub fn latest(&self) -> Arc<Window> {
        self.window.borrow().clone()
    }

    /// Per-series values and trends of the latest window
    pub fn snapshot(&self) -> Vec<SeriesSnapshot> {
        self.latest().snapshot()
    }

    /// Counters so far
    pub fn stats(&self) -> FeedStats {
        with_stats(&self.stats, |s| s.clone())
    }

    /// Stop the timers and wait for every task to finish
    ///
    /// Batches already queued are still merged before the buffer task exits.
    pub async fn shutdown(self) -> Result<(), FeedError> {
        self.shutdown.send_replace(true);

        let mut failure = None;
        for poller in self.pollers {
            if let Err(e) = poller.await {
                failure.get_or_insert(FeedError::Task(e.to_string()));
            }
        }
        if let Err(e) = self.buffer.await {
            failure.get_or_insert(FeedError::Task(e.to_string()));
        }

        info!("Live feed stopped");
        failure.map_or(Ok(()), Err)
    }
}
