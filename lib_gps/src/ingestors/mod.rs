//! # Data Ingestors Module
//!
//! Long-running tasks that keep in-memory state in step with an upstream source.
//!
//! ## Contained Modules:
//! - **`gps_polling`**: a self-scheduling poller that fetches the vehicle
//!   position feed on a fixed interval, parses it and installs the result in
//!   the `MarkerCache`.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

/// The periodic refresh loop for the GPS feed.
pub mod gps_polling;

pub use gps_polling::{GpsPollingIngestor, RefreshError};
