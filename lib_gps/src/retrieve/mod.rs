//! # Data Retrieval Module
//!
//! Everything that talks to the outside world to get the raw feed.
//!
//! ## Contained Modules:
//!
//! - **`feed_http`**: a plaintext HTTP client built on `reqwest` and
//!   `reqwest-middleware`, with optional retries on transient failures and a
//!   request timeout so a stalled host cannot hold the refresh loop forever.
//!
//! The [`FeedSource`] trait is the seam the refresh loop depends on, so the loop
//! can run against anything that yields raw bytes.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

use std::future::Future;

use bytes::Bytes;

/// HTTP feed client with retry middleware.
pub mod feed_http;

pub use feed_http::{FeedClient, FeedConfig, FetchError};

/// Anything that can produce one raw feed body per call.
pub trait FeedSource: Send + Sync {
    /// Retrieves the full feed body once.
    fn fetch(&self) -> impl Future<Output = Result<Bytes, FetchError>> + Send;
}
