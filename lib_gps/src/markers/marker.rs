//! # Marker
//!
//! The feed is plain text, one vehicle per line, columns separated by commas:
//!
//! ```text
//! type,number,longitude,latitude,<unused>,direction,id
//! ```
//!
//! Coordinates and every other column are kept exactly as they appear in the
//! feed. The fifth column is carried by the upstream format but has no field in
//! the marker.

use serde::Serialize;

/// Column separator inside one record.
pub const COLUMN_DELIMITER: char = ',';

/// Minimum number of columns a record needs to become a marker.
pub const MIN_COLUMNS: usize = 7;

const COL_TYPE: usize = 0;
const COL_NUMBER: usize = 1;
const COL_LONGITUDE: usize = 2;
const COL_LATITUDE: usize = 3;
const COL_DIRECTION: usize = 5;
const COL_ID: usize = 6;

/// One tracked vehicle as of the last refresh.
///
/// Serializes with the short field names browser clients expect:
/// `id`, `type`, `number`, `long`, `lat`, `dir`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Marker {
    /// Vehicle id, stable across refreshes.
    pub id: String,
    /// Vehicle category code (bus, tram, trolley...).
    #[serde(rename = "type")]
    pub kind: String,
    /// Route or line identifier.
    pub number: String,
    /// Longitude, as sent by the feed.
    #[serde(rename = "long")]
    pub longitude: String,
    /// Latitude, as sent by the feed.
    #[serde(rename = "lat")]
    pub latitude: String,
    /// Heading code.
    #[serde(rename = "dir")]
    pub direction: String,
}

impl Marker {
    /// Builds a marker from one feed record.
    ///
    /// Returns `None` when the record has fewer than [`MIN_COLUMNS`] columns.
    /// Short records are normal at the tail of a live feed, so this is not an
    /// error.
    pub fn from_record(record: &str) -> Option<Self> {
        let columns: Vec<&str> = record.split(COLUMN_DELIMITER).collect();
        if columns.len() < MIN_COLUMNS {
            return None;
        }

        Some(Self {
            id: columns[COL_ID].to_string(),
            kind: columns[COL_TYPE].to_string(),
            number: columns[COL_NUMBER].to_string(),
            longitude: columns[COL_LONGITUDE].to_string(),
            latitude: columns[COL_LATITUDE].to_string(),
            direction: columns[COL_DIRECTION].to_string(),
        })
    }
}
