//! # Snapshot
//!
//! A snapshot is the complete result of one parse pass over a feed body. It is
//! built once, never edited afterwards, and replaced wholesale on the next
//! refresh.

use std::collections::BTreeMap;

use serde::Serialize;

use super::marker::Marker;

/// Line separator of the feed body.
pub const RECORD_DELIMITER: char = '\n';

/// All markers known as of one refresh, keyed by marker id.
///
/// Serializes as a plain JSON object `{ "<id>": { ...marker... } }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Snapshot {
    markers: BTreeMap<String, Marker>,
}

impl Snapshot {
    /// Parses a raw feed body.
    ///
    /// Invalid UTF-8 is replaced rather than rejected and records with too few
    /// columns are skipped, so parsing never fails. When an id repeats, the
    /// later record wins.
    ///
    /// One trailing `\r` per line is dropped so CRLF feeds yield the same ids as
    /// LF feeds. This is the only change made to column text; with LF input every
    /// column, including the last (`id`), is kept byte for byte.
    pub fn parse(raw: &[u8]) -> Self {
        let text = String::from_utf8_lossy(raw);
        text.split(RECORD_DELIMITER)
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .filter_map(Marker::from_record)
            .collect()
    }

    /// Looks up a marker by id.
    pub fn get(&self, id: &str) -> Option<&Marker> {
        self.markers.get(id)
    }

    /// Number of markers.
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    /// `true` when no valid record was found.
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Iterates markers in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Marker> {
        self.markers.values()
    }
}

impl FromIterator<Marker> for Snapshot {
    fn from_iter<I: IntoIterator<Item = Marker>>(iter: I) -> Self {
        let mut markers = BTreeMap::new();
        for marker in iter {
            markers.insert(marker.id.clone(), marker);
        }
        Self { markers }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_record() {
        let snapshot = Snapshot::parse(b"bus,12,24.745,59.437,0,90,1234\n");
        let value = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "1234": {
                    "id": "1234",
                    "type": "bus",
                    "number": "12",
                    "long": "24.745",
                    "lat": "59.437",
                    "dir": "90"
                }
            })
        );
    }

    #[test]
    fn test_parse_skips_short_lines() {
        let snapshot = Snapshot::parse(b"bus,12,24.745,59.437\n");
        assert!(snapshot.is_empty());

        let mixed = b"bus,12,24.745,59.437\ntram,3,24.7,59.4,0,180,55\n,,,\ntrolley,1,24.6";
        let snapshot = Snapshot::parse(mixed);
        assert_eq!(snapshot.len(), 1);
        assert!(snapshot.get("55").is_some());
    }

    #[test]
    fn test_parse_duplicate_ids_last_wins() {
        let raw = b"bus,12,24.745,59.437,0,90,1234\nbus,12,24.746,59.438,0,180,1234\n";
        let snapshot = Snapshot::parse(raw);
        assert_eq!(snapshot.len(), 1);
        let marker = snapshot.get("1234").unwrap();
        assert_eq!(marker.direction, "180");
        assert_eq!(marker.longitude, "24.746");
    }

    #[test]
    fn test_parse_empty_and_garbage_input() {
        assert!(Snapshot::parse(b"").is_empty());
        assert!(Snapshot::parse(b"\n\n\n").is_empty());
        assert!(Snapshot::parse(&[0xff, 0xfe, b'\n']).is_empty());
    }

    #[test]
    fn test_parse_handles_crlf_and_missing_trailing_newline() {
        let raw = b"bus,12,24.745,59.437,0,90,1234\r\ntram,3,24.7,59.4,0,180,55";
        let snapshot = Snapshot::parse(raw);
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.get("1234").unwrap().id, "1234");
        assert_eq!(snapshot.get("55").unwrap().direction, "180");
    }

    #[test]
    fn test_parse_keeps_last_column_verbatim_on_lf_input() {
        let snapshot = Snapshot::parse(b"bus,12,24.745,59.437,0,90, 1234 \nbus,1,2,3,4,5,7\r\r\n");
        assert_eq!(snapshot.get(" 1234 ").unwrap().id, " 1234 ");
        // Only one trailing carriage return is dropped.
        assert_eq!(snapshot.get("7\r").unwrap().id, "7\r");
    }

    #[test]
    fn test_serialized_keys_match_marker_ids() {
        let raw = b"bus,12,24.745,59.437,0,90,1234\ntram,3,24.7,59.4,0,180,55\nbus,12,24.746,59.438,0,180,1234\n";
        let value = serde_json::to_value(Snapshot::parse(raw)).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 2);
        for (key, marker) in object {
            assert_eq!(marker["id"], serde_json::Value::String(key.clone()));
        }
    }

    #[test]
    fn test_parse_never_stores_short_lines() {
        let raw = b"a,b,c,d,e,f\na,b,c\nbus,1,2,3,4,5,6\nx\n";
        let snapshot = Snapshot::parse(raw);
        assert_eq!(snapshot.iter().map(|m| m.id.as_str()).collect::<Vec<_>>(), vec!["6"]);
    }
}
