//! Push channel source
//!
//! For hosts that already hold a live connection (WebSocket, MQTT bridge):
//! they push records as they arrive and the feed drains them on each tick.

use livetrend_core::ingest::IncomingRecord;
use tokio::sync::mpsc::{self, error::TryRecvError, error::TrySendError};

use crate::{BatchSource, FeedError};

/// Create a bounded push channel
pub fn push_channel(capacity: usize) -> (PushHandle, PushSource) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (PushHandle { tx }, PushSource { rx })
}

/// Sending side, cloneable across producer tasks
#[derive(Debug, Clone)]
pub struct PushHandle {
    tx: mpsc::Sender<IncomingRecord>,
}

impl PushHandle {
    /// Push a record, waiting for room
    pub async fn push(&self, record: IncomingRecord) -> Result<(), FeedError> {
        self.tx.send(record).await.map_err(|_| FeedError::ChannelClosed)
    }

    /// Push a record without waiting
    pub fn try_push(&self, record: IncomingRecord) -> Result<(), FeedError> {
        self.tx.try_send(record).map_err(|e| match e {
            TrySendError::Full(_) => FeedError::Backpressure,
            TrySendError::Closed(_) => FeedError::ChannelClosed,
        })
    }
}

/// Receiving side, attached to a feed as a [`BatchSource`]
#[derive(Debug)]
pub struct PushSource {
    rx: mpsc::Receiver<IncomingRecord>,
}

#[async_trait::async_trait]
impl BatchSource for PushSource {
    async fn fetch(&mut self) -> Result<Vec<IncomingRecord>, FeedError> {
        let mut batch = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(record) => batch.push(record),
                // Producers gone: hand over what is left, then empty batches.
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        Ok(batch)
    }

    fn name(&self) -> &str {
        "push"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use livetrend_core::ingest::RawSample;

    fn record(ts: u64) -> IncomingRecord {
        RawSample::new("d1", ts, 1.0).into()
    }

    #[tokio::test]
    async fn test_drains_pending_records() {
        let (handle, mut source) = push_channel(8);
        handle.push(record(1)).await.unwrap();
        handle.push(record(2)).await.unwrap();

        assert_eq!(source.fetch().await.unwrap(), vec![record(1), record(2)]);
        assert!(source.fetch().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_try_push_backpressure() {
        let (handle, _source) = push_channel(1);
        handle.try_push(record(1)).unwrap();
        assert!(matches!(handle.try_push(record(2)), Err(FeedError::Backpressure)));
    }

    #[tokio::test]
    async fn test_closed_source() {
        let (handle, source) = push_channel(1);
        drop(source);
        assert!(matches!(handle.push(record(1)).await, Err(FeedError::ChannelClosed)));
    }

    #[tokio::test]
    async fn test_disconnected_producers_yield_remaining_records() {
        let (handle, mut source) = push_channel(4);
        handle.push(record(1)).await.unwrap();
        drop(handle);

        assert_eq!(source.fetch().await.unwrap(), vec![record(1)]);
        assert!(source.fetch().await.unwrap().is_empty());
    }
}
