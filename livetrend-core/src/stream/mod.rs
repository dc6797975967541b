//! Stream processing for telemetry batches
//!
//! ## Module Organization
//!
//! - Core error type (this file)
//! - `memory` - In-memory replay of recorded batches

use core::fmt;

#[cfg(feature = "stream-memory")]
pub mod memory;

#[cfg(feature = "stream-memory")]
pub use memory::MemoryStream;

/// Errors that can occur while pulling batches
///
/// [`MemoryStream`] only ever ends with `EndOfStream`. `Transport` and
/// `Format` are for host streams (a serial link, a socket reader) that
/// implement [`Stream`] themselves; `WindowedSeriesBuffer::drain` stops and
/// hands them back to the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamError<E> {
    /// Transport-level error (e.g., I/O error)
    Transport(E),
    /// Data format error
    Format(&'static str),
    /// End of stream reached
    EndOfStream,
}

impl<E: fmt::Display> fmt::Display for StreamError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(e) => write!(f, "Transport error: {}", e),
            Self::Format(msg) => write!(f, "Format error: {}", msg),
            Self::EndOfStream => write!(f, "End of stream"),
        }
    }
}

pub use crate::traits::Stream;
