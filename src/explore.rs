//! Endpoint exploration.
//!
//! Probes API endpoints to see which exist, what shape they answer in, and
//! whether they carry data for the artist of interest. Used to check a new API
//! version before pointing the pipeline at it.

use crate::client::json_type_name;
use crate::writer::write_json;
use crate::{
    count_artist_matches, ApiVersion, ArtistFilter, Endpoint, EnvelopeShape, FetchError, Record,
    Result, SetlistApi,
};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// How many leading records are checked for artist matches.
pub const MATCH_SCAN_LIMIT: usize = 100;

/// How many field names of the first record are listed.
pub const SAMPLE_FIELD_LIMIT: usize = 8;

const PREVIEW_CHARS: usize = 50;

/// What probing one endpoint found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointProbe {
    pub endpoint: Endpoint,
    pub url: String,
    pub shape: Option<EnvelopeShape>,
    pub record_count: usize,
    /// Leading field names of the first record
    pub sample_fields: Vec<String>,
    /// Artist matches among the first [`MATCH_SCAN_LIMIT`] records
    pub artist_matches: usize,
    pub error: Option<String>,
}

impl EndpointProbe {
    pub fn success(&self) -> bool {
        self.error.is_none()
    }
}

/// Name, JSON type and short preview of one field of a sample record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescription {
    pub name: String,
    pub type_name: &'static str,
    pub preview: String,
}

/// A saved sample payload and the field layout of its first record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedSample {
    pub path: PathBuf,
    pub fields: Vec<FieldDescription>,
}

/// Probe a single endpoint with the short timeout.
pub async fn probe_endpoint<A>(
    api: &A,
    endpoint: &Endpoint,
    artist: &ArtistFilter,
) -> EndpointProbe
where
    A: SetlistApi + ?Sized,
{
    let outcome = api.fetch(endpoint.name(), &[]).await;

    let sample_fields = outcome
        .records
        .first()
        .map(|record| record.keys().take(SAMPLE_FIELD_LIMIT).cloned().collect())
        .unwrap_or_default();

    EndpointProbe {
        endpoint: endpoint.clone(),
        url: outcome.url.clone(),
        shape: outcome.shape.clone(),
        record_count: outcome.records.len(),
        sample_fields,
        artist_matches: count_artist_matches(&outcome.records, artist, MATCH_SCAN_LIMIT),
        error: outcome.error_message(),
    }
}

/// Probe each endpoint in turn.
pub async fn explore<A>(
    api: &A,
    endpoints: &[Endpoint],
    artist: &ArtistFilter,
) -> Vec<EndpointProbe>
where
    A: SetlistApi + ?Sized,
{
    let mut probes = Vec::with_capacity(endpoints.len());
    for endpoint in endpoints {
        let probe = probe_endpoint(api, endpoint, artist).await;
        log::debug!(
            "Probed {}: success={}, records={}",
            probe.endpoint,
            probe.success(),
            probe.record_count
        );
        probes.push(probe);
    }
    probes
}

/// Fetch `endpoint` again, save its records to
/// `<sample_dir>/<endpoint>_<version>_sample.json`, and describe the first
/// record's fields.
pub async fn save_sample<A>(
    api: &A,
    endpoint: &Endpoint,
    api_version: ApiVersion,
    sample_dir: &Path,
) -> Result<SavedSample>
where
    A: SetlistApi + ?Sized,
{
    let outcome = api.fetch(endpoint.name(), &[]).await;
    if let Some(error) = outcome.error {
        return Err(error);
    }
    if outcome.records.is_empty() {
        return Err(FetchError::Parse(format!("{endpoint} returned no records")));
    }

    let path = sample_dir.join(format!("{endpoint}_{api_version}_sample.json"));
    write_json(&outcome.records, &path)?;

    Ok(SavedSample {
        path,
        fields: outcome
            .records
            .first()
            .map(describe_fields)
            .unwrap_or_default(),
    })
}

/// Describe every field of `record` in order.
pub fn describe_fields(record: &Record) -> Vec<FieldDescription> {
    record
        .iter()
        .map(|(name, value)| FieldDescription {
            name: name.clone(),
            type_name: json_type_name(value),
            preview: preview(value),
        })
        .collect()
}

fn preview(value: &Value) -> String {
    let text = match value {
        Value::Null => return "None".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    text.chars().take(PREVIEW_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FetchOutcome, MockSetlistApi};
    use serde_json::json;

    fn records(values: Vec<Value>) -> Vec<Record> {
        values
            .into_iter()
            .map(|v| v.as_object().cloned().unwrap())
            .collect()
    }

    fn song_outcome(endpoint: &str) -> FetchOutcome {
        FetchOutcome::succeeded(
            endpoint,
            "https://elgoose.net/api/v1/songs.json",
            EnvelopeShape::Bare,
            records(vec![
                json!({
                    "id": 1,
                    "name": "Arcadia",
                    "slug": "arcadia",
                    "isoriginal": 1,
                    "original_artist": null,
                    "created_at": "2020-01-01",
                    "updated_at": "2020-01-02",
                    "artist": "Goose",
                    "extra": "x"
                }),
                json!({"id": 2, "name": "Tumble", "artist": "Vasudo"}),
            ]),
        )
    }

    #[tokio::test]
    async fn test_probe_reports_fields_and_matches() {
        let mut api = MockSetlistApi::new();
        api.expect_fetch()
            .returning(|endpoint, _params| song_outcome(endpoint));

        let endpoint = Endpoint::new("songs").unwrap();
        let probe = probe_endpoint(&api, &endpoint, &ArtistFilter::default()).await;

        assert!(probe.success());
        assert_eq!(probe.shape, Some(EnvelopeShape::Bare));
        assert_eq!(probe.record_count, 2);
        assert_eq!(probe.sample_fields.len(), SAMPLE_FIELD_LIMIT);
        assert_eq!(probe.sample_fields[0], "id");
        assert_eq!(probe.artist_matches, 1);
    }

    #[tokio::test]
    async fn test_explore_keeps_going_after_failure() {
        let mut api = MockSetlistApi::new();
        api.expect_fetch().returning(|endpoint, _params| {
            if endpoint == "jamcharts" {
                FetchOutcome::failed(
                    endpoint,
                    "https://elgoose.net/api/v1/jamcharts.json",
                    None,
                    FetchError::Status {
                        status: 404,
                        url: "https://elgoose.net/api/v1/jamcharts.json".to_string(),
                    },
                )
            } else {
                song_outcome(endpoint)
            }
        });

        let endpoints = vec![
            Endpoint::new("jamcharts").unwrap(),
            Endpoint::new("songs").unwrap(),
        ];
        let probes = explore(&api, &endpoints, &ArtistFilter::default()).await;

        assert_eq!(probes.len(), 2);
        assert!(!probes[0].success());
        assert_eq!(probes[0].record_count, 0);
        assert!(probes[1].success());
    }

    #[tokio::test]
    async fn test_save_sample_writes_file_and_describes_fields() {
        let dir = tempfile::tempdir().unwrap();
        let mut api = MockSetlistApi::new();
        api.expect_fetch()
            .returning(|endpoint, _params| song_outcome(endpoint));

        let endpoint = Endpoint::new("songs").unwrap();
        let sample = save_sample(&api, &endpoint, ApiVersion::V1, dir.path())
            .await
            .unwrap();

        assert_eq!(sample.path, dir.path().join("songs_v1_sample.json"));
        assert!(sample.path.exists());
        assert_eq!(sample.fields.len(), 9);
        assert_eq!(
            sample.fields[4],
            FieldDescription {
                name: "original_artist".to_string(),
                type_name: "null",
                preview: "None".to_string(),
            }
        );
        assert_eq!(sample.fields[0].type_name, "int");
    }

    #[test]
    fn test_preview_truncates_long_values() {
        let long = "a".repeat(80);
        let fields = describe_fields(&records(vec![json!({ "notes": long })])[0]);
        assert_eq!(fields[0].preview.chars().count(), 50);
        assert_eq!(fields[0].type_name, "str");
    }
}
