//! # Markers Module
//!
//! Typed representation of the vehicle-position feed.
//!
//! ## Contained Modules:
//!
//! - **`marker`**: the `Marker` entity and its validated constructor from one
//!   comma-separated record.
//! - **`snapshot`**: the keyed collection produced by one parse pass over a
//!   whole feed body.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

/// One vehicle position parsed from a feed record.
pub mod marker;
/// The id-keyed marker map built from a full feed body.
pub mod snapshot;

pub use marker::Marker;
pub use snapshot::Snapshot;
