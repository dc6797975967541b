//! Stream Processing Traits
//!
//! Pull-based sources of sample batches. The model follows the `nb` crate so
//! a host can drain whatever is available on each refresh tick without an
//! async runtime:
//!
//! ```rust
//! use livetrend_core::traits::Stream;
//!
//! fn drain_ready<S: Stream>(stream: &mut S) -> Result<usize, S::Error> {
//!     let mut batches = 0;
//!     loop {
//!         match stream.poll_next() {
//!             Ok(_batch) => batches += 1,
//!             Err(nb::Error::WouldBlock) => return Ok(batches),
//!             Err(nb::Error::Other(e)) => return Err(e),
//!         }
//!     }
//! }
//! ```

/// Source of telemetry batches
///
/// - `Ok(item)`: next batch available
/// - `Err(nb::Error::WouldBlock)`: nothing pending right now
/// - `Err(nb::Error::Other(e))`: stream error, including end of stream
///
/// End of stream should be sticky: once reported, every later poll reports
/// it again.
pub trait Stream {
    /// Type of items produced by the stream
    type Item;

    /// Type of errors that can occur
    type Error;

    /// Attempt to pull the next item without blocking
    fn poll_next(&mut self) -> nb::Result<Self::Item, Self::Error>;

    /// Bounds on remaining items, like `Iterator::size_hint`
    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, None)
    }
}
