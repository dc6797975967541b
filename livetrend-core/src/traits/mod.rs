//! Core Traits and Abstractions for livetrend
//!
//! ## Module Organization
//!
//! - [`time`] - Time source abstraction supplying the eviction `now`
//! - [`stream`] - Pull-based sources of sample batches
//!
//! The window buffer itself is a plain value with free functions; these
//! traits sit at the seams where the host application plugs in a clock or a
//! recorded feed.

pub mod time;
pub mod stream;

pub use time::TimeSource;
pub use stream::Stream;
