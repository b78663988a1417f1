//! Artist filtering.
//!
//! The upstream datasets mix several artists together. A record belongs to the
//! artist of interest when its `artist_id` matches OR its `artist` display name
//! matches. The API is not consistent about encoding ids, so `1`, `1.0` and
//! `"1"` all count as id 1.

use crate::{ArtistFilter, Record};
use serde_json::Value;

/// Keep the records belonging to the given artist, preserving input order.
///
/// Records missing both `artist_id` and `artist` are dropped.
///
/// # Examples
///
/// ```rust
/// use elgoose_fetch::{filter_by_artist, Record};
/// use serde_json::json;
///
/// let records: Vec<Record> = vec![
///     json!({"artist_id": 1, "show_year": 2021}),
///     json!({"artist_id": 2, "show_year": 2021}),
///     json!({"artist": "Goose", "show_year": 2022}),
/// ]
/// .into_iter()
/// .filter_map(|v| v.as_object().cloned())
/// .collect();
///
/// let goose = filter_by_artist(&records, 1, "Goose");
/// assert_eq!(goose.len(), 2);
/// ```
pub fn filter_by_artist(records: &[Record], artist_id: i64, artist_name: &str) -> Vec<Record> {
    records
        .iter()
        .filter(|record| record_matches(record, artist_id, artist_name))
        .cloned()
        .collect()
}

/// Count how many of the first `limit` records match `filter`.
pub fn count_artist_matches(records: &[Record], filter: &ArtistFilter, limit: usize) -> usize {
    records
        .iter()
        .take(limit)
        .filter(|record| filter.matches(record))
        .count()
}

impl ArtistFilter {
    /// `true` when `record` belongs to this artist.
    pub fn matches(&self, record: &Record) -> bool {
        record_matches(record, self.artist_id, &self.artist_name)
    }

    /// [`filter_by_artist`] with this filter's id and name.
    pub fn apply(&self, records: &[Record]) -> Vec<Record> {
        filter_by_artist(records, self.artist_id, &self.artist_name)
    }
}

fn record_matches(record: &Record, artist_id: i64, artist_name: &str) -> bool {
    record
        .get("artist_id")
        .is_some_and(|value| id_equals(value, artist_id))
        || record
            .get("artist")
            .and_then(Value::as_str)
            .is_some_and(|name| name == artist_name)
}

fn id_equals(value: &Value, expected: i64) -> bool {
    match value {
        Value::Number(n) => match n.as_i64() {
            Some(id) => id == expected,
            None => n.as_f64().is_some_and(|id| id == expected as f64),
        },
        Value::String(s) => s.trim().parse::<i64>().is_ok_and(|id| id == expected),
        _ => false,
    }
}
