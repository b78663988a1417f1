//! Data types shared across the fetch pipeline.
//!
//! Records coming back from elgoose.net have no fixed schema: shows, setlists
//! and songs all carry different fields, and the API is inconsistent about
//! whether numbers arrive as JSON numbers or strings. A [`Record`] is therefore
//! just an ordered JSON object.

use crate::{FetchError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One JSON object from the API (a show, a setlist entry, a song, ...).
///
/// Key order is preserved exactly as received.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// A named API endpoint such as `shows` or `setlists`.
///
/// The name maps deterministically to `<base_url>/<name>.json`.
///
/// # Examples
///
/// ```rust
/// use elgoose_fetch::Endpoint;
///
/// let endpoint = Endpoint::new("shows").unwrap();
/// assert_eq!(
///     endpoint.url("https://elgoose.net/api/v1"),
///     "https://elgoose.net/api/v1/shows.json"
/// );
/// assert_eq!(endpoint.file_name("goose", "csv"), "goose_shows.csv");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint(String);

impl Endpoint {
    /// Create an endpoint from its name, rejecting empty names and names that
    /// would escape the API path.
    pub fn new(name: &str) -> Result<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(FetchError::Config(
                "endpoint name must not be empty".to_string(),
            ));
        }
        if name.contains('/') || name.contains('\\') || name == "." || name == ".." {
            return Err(FetchError::Config(format!(
                "endpoint name '{name}' must be a single path segment"
            )));
        }
        Ok(Self(name.to_string()))
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    /// Full request URL for this endpoint under `base_url`.
    pub fn url(&self, base_url: &str) -> String {
        format!(
            "{}/{}.json",
            base_url.trim_end_matches('/'),
            urlencoding::encode(&self.0)
        )
    }

    /// Output file name, e.g. `goose_shows.json`.
    pub fn file_name(&self, prefix: &str, extension: &str) -> String {
        if prefix.is_empty() {
            format!("{}.{extension}", self.0)
        } else {
            format!("{prefix}_{}.{extension}", self.0)
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The top-level JSON shape a response arrived in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnvelopeShape {
    /// A bare array of records.
    Bare,
    /// An object wrapping the records, normally `{error, error_message, data}`.
    Wrapped {
        /// Top-level keys of the object, in order
        keys: Vec<String>,
    },
}

impl fmt::Display for EnvelopeShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnvelopeShape::Bare => write!(f, "bare list"),
            EnvelopeShape::Wrapped { keys } => write!(f, "envelope with keys {keys:?}"),
        }
    }
}

/// Result of fetching a single endpoint.
///
/// A failed fetch is not an `Err`: it is an outcome with no records and an
/// [`error`](FetchOutcome::error) describing what went wrong, so the caller
/// can keep processing other endpoints.
#[derive(Debug)]
pub struct FetchOutcome {
    /// The endpoint name that was requested
    pub endpoint: String,
    /// The full URL that was requested
    pub url: String,
    /// Response shape, if the body was valid JSON of a recognised shape
    pub shape: Option<EnvelopeShape>,
    /// Unwrapped records (empty on any failure)
    pub records: Vec<Record>,
    /// What went wrong, if anything
    pub error: Option<FetchError>,
}

impl FetchOutcome {
    pub fn succeeded(
        endpoint: &str,
        url: &str,
        shape: EnvelopeShape,
        records: Vec<Record>,
    ) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            url: url.to_string(),
            shape: Some(shape),
            records,
            error: None,
        }
    }

    pub fn failed(
        endpoint: &str,
        url: &str,
        shape: Option<EnvelopeShape>,
        error: FetchError,
    ) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            url: url.to_string(),
            shape,
            records: Vec::new(),
            error: Some(error),
        }
    }

    /// `true` when the request succeeded and the body unwrapped cleanly.
    pub fn success(&self) -> bool {
        self.error.is_none()
    }

    /// Human-readable error message, if the fetch failed.
    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(|e| e.to_string())
    }
}
