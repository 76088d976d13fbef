//! # Core Module
//!
//! The hand-off point between the refresh loop (single writer) and the HTTP
//! handlers (many readers).
//!
//! ## Core Components:
//!
//! - **`marker_cache`**: owns the current `Snapshot` behind a read-write lock
//!   and swaps it atomically. Readers get an `Arc` to a complete snapshot and
//!   never see one being built.
//!
//! - **`refresh_status`**: bookkeeping the refresh loop leaves next to the
//!   snapshot (state, last success, last error, counters) for health checks.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

/// Atomic replace/read store for the current snapshot.
pub mod marker_cache;
/// Refresh loop state and counters.
pub mod refresh_status;

pub use marker_cache::MarkerCache;
pub use refresh_status::{RefreshState, RefreshStatus};
