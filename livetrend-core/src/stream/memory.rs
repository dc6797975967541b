//! Memory-based streams for testing and replay
//!
//! Feeds recorded batches back into a buffer, one batch per poll, the way a
//! poller would deliver them tick by tick.

use alloc::vec::Vec;

use super::{Stream, StreamError};
use crate::sample::Sample;

/// Replays a slice of recorded batches
///
/// ```rust
/// use livetrend_core::stream::MemoryStream;
/// use livetrend_core::{Sample, Stream};
///
/// let batches = vec![
///     vec![Sample::new("d1", 1_000, 10.0)],
///     vec![Sample::new("d1", 2_000, 11.0)],
/// ];
///
/// let mut stream = MemoryStream::new(&batches);
/// while let Ok(batch) = stream.poll_next() {
///     assert_eq!(batch.len(), 1);
/// }
/// ```
pub struct MemoryStream<'a> {
    batches: &'a [Vec<Sample>],
    position: usize,
}

impl<'a> MemoryStream<'a> {
    /// Create new memory stream from recorded batches
    pub fn new(batches: &'a [Vec<Sample>]) -> Self {
        Self {
            batches,
            position: 0,
        }
    }

    /// Reset to the first batch
    pub fn reset(&mut self) {
        self.position = 0;
    }

    /// Index of the next batch
    pub fn position(&self) -> usize {
        self.position
    }

    /// Check if every batch has been delivered
    pub fn is_exhausted(&self) -> bool {
        self.position >= self.batches.len()
    }
}

impl<'a> Stream for MemoryStream<'a> {
    type Item = Vec<Sample>;
    type Error = StreamError<()>;

    fn poll_next(&mut self) -> nb::Result<Self::Item, Self::Error> {
        if self.position >= self.batches.len() {
            return Err(nb::Error::Other(StreamError::EndOfStream));
        }

        let batch = self.batches[self.position].clone();
        self.position += 1;
        Ok(batch)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.batches.len() - self.position;
        (remaining, Some(remaining))
    }
}
