//! # lib_gps
//!
//! Shared building blocks for `bus-server`: the feed client that pulls the raw
//! vehicle-position text, the parser that turns it into typed markers, the cache
//! that hands snapshots from the refresh loop to HTTP readers, and the loop
//! itself.
//!
//! Modules are feature gated the same way across the workspace. `markers` and
//! `core` are always built; `retrieve` and `ingestors` pull in the network and
//! runtime stack.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

/// Marker cache and refresh bookkeeping shared by the writer and the readers.
pub mod core;
/// Typed markers, snapshots and the fixed-column record parser.
pub mod markers;

/// HTTP feed client with retry middleware.
#[cfg(feature = "retrieve")]
pub mod retrieve;

/// Background refresh loop that keeps the cache current.
#[cfg(feature = "ingestors")]
pub mod ingestors;

pub use crate::core::{MarkerCache, RefreshState, RefreshStatus};
pub use markers::{Marker, Snapshot};
