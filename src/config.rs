use crate::{FetchError, Result};
use chrono::Datelike;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default elgoose.net host.
pub const DEFAULT_HOST: &str = "https://elgoose.net";

/// Every endpoint name the API is known to serve.
pub const KNOWN_ENDPOINTS: [&str; 7] = [
    "shows", "setlists", "songs", "venues", "artists", "jamcharts", "latest",
];

/// Endpoints fetched by a normal pipeline run.
pub const DEFAULT_ENDPOINTS: [&str; 3] = ["shows", "setlists", "songs"];

/// First year the expected coverage range starts at.
pub const DEFAULT_FIRST_YEAR: i64 = 2014;

/// Bounds any expected year range must stay within.
pub const YEAR_BOUNDS: RangeInclusive<i64> = 1900..=9999;

/// API version segment of the base URL.
///
/// `v1` serves bare lists, `v2` normally wraps them in an
/// `{error, error_message, data}` envelope. The client detects the shape per
/// response, so either version works with the same code path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ApiVersion {
    #[default]
    V1,
    V2,
}

impl ApiVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiVersion::V1 => "v1",
            ApiVersion::V2 => "v2",
        }
    }
}

impl std::str::FromStr for ApiVersion {
    type Err = FetchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "v1" | "1" => Ok(ApiVersion::V1),
            "v2" | "2" => Ok(ApiVersion::V2),
            other => Err(FetchError::Config(format!(
                "unknown API version '{other}'; expected v1 or v2"
            ))),
        }
    }
}

impl std::fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The artist whose records survive filtering.
///
/// A record matches when its `artist_id` equals [`artist_id`](Self::artist_id)
/// or its `artist` equals [`artist_name`](Self::artist_name).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtistFilter {
    pub artist_id: i64,
    pub artist_name: String,
}

impl Default for ArtistFilter {
    fn default() -> Self {
        Self {
            artist_id: 1,
            artist_name: "Goose".to_string(),
        }
    }
}

impl ArtistFilter {
    pub fn new(artist_id: i64, artist_name: impl Into<String>) -> Self {
        Self {
            artist_id,
            artist_name: artist_name.into(),
        }
    }
}

/// Configuration for a fetch run.
///
/// Built from [`Default`], optionally overlaid with environment variables via
/// [`FetchConfig::from_env`], then adjusted by the builder methods (the CLI maps
/// its flags onto these).
///
/// | Variable              | Field                      |
/// |-----------------------|----------------------------|
/// | `ELGOOSE_HOST`        | [`host`](Self::host)       |
/// | `ELGOOSE_API_VERSION` | [`api_version`](Self::api_version) |
/// | `ELGOOSE_OUTPUT_DIR`  | output root (JSON, CSV and sample dirs) |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchConfig {
    /// Scheme and host, e.g. `https://elgoose.net`
    pub host: String,
    /// API version path segment
    pub api_version: ApiVersion,
    /// Timeout for single probe requests
    pub probe_timeout: Duration,
    /// Timeout for "fetch everything" requests
    pub bulk_timeout: Duration,
    /// Artist to keep
    pub artist: ArtistFilter,
    /// Years the dataset is expected to cover, inclusive
    pub expected_years: RangeInclusive<i64>,
    /// Prefix of output file names (`<prefix>_<endpoint>.json`)
    pub prefix: String,
    /// Directory JSON files are written to
    pub json_dir: PathBuf,
    /// Directory CSV files are written to
    pub csv_dir: PathBuf,
    /// Directory explorer samples are written to
    pub sample_dir: PathBuf,
}

impl Default for FetchConfig {
    fn default() -> Self {
        let current_year = i64::from(chrono::Utc::now().year());
        let mut config = Self {
            host: DEFAULT_HOST.to_string(),
            api_version: ApiVersion::default(),
            probe_timeout: Duration::from_secs(30),
            bulk_timeout: Duration::from_secs(120),
            artist: ArtistFilter::default(),
            expected_years: DEFAULT_FIRST_YEAR..=current_year.max(DEFAULT_FIRST_YEAR),
            prefix: "goose".to_string(),
            json_dir: PathBuf::new(),
            csv_dir: PathBuf::new(),
            sample_dir: PathBuf::new(),
        };
        config.set_output_root(&default_output_root());
        config
    }
}

impl FetchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overlaid with `ELGOOSE_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with values from `lookup`, keyed by environment
    /// variable name.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup("ELGOOSE_HOST").filter(|v| !v.trim().is_empty()) {
            config = config.with_host(host);
        }
        if let Some(version) = lookup("ELGOOSE_API_VERSION").filter(|v| !v.trim().is_empty()) {
            config.api_version = version.parse()?;
        }
        if let Some(dir) = lookup("ELGOOSE_OUTPUT_DIR").filter(|v| !v.trim().is_empty()) {
            config = config.with_output_root(dir);
        }

        Ok(config)
    }

    /// Versioned API base, e.g. `https://elgoose.net/api/v1`.
    pub fn base_url(&self) -> String {
        format!(
            "{}/api/{}",
            self.host.trim_end_matches('/'),
            self.api_version.as_str()
        )
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_api_version(mut self, api_version: ApiVersion) -> Self {
        self.api_version = api_version;
        self
    }

    pub fn with_artist(mut self, artist: ArtistFilter) -> Self {
        self.artist = artist;
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Set the expected year range, rejecting ranges that run backwards or
    /// leave [`YEAR_BOUNDS`].
    pub fn with_expected_years(mut self, first: i64, last: i64) -> Result<Self> {
        if !YEAR_BOUNDS.contains(&first) || !YEAR_BOUNDS.contains(&last) {
            return Err(FetchError::Config(format!(
                "year range {first}-{last} must lie within {}-{}",
                YEAR_BOUNDS.start(),
                YEAR_BOUNDS.end()
            )));
        }
        if first > last {
            return Err(FetchError::Config(format!(
                "year range {first}-{last} is empty"
            )));
        }
        self.expected_years = first..=last;
        Ok(self)
    }

    /// Place JSON, CSV and sample directories under `root`.
    pub fn with_output_root(mut self, root: impl AsRef<Path>) -> Self {
        self.set_output_root(root.as_ref());
        self
    }

    fn set_output_root(&mut self, root: &Path) {
        self.json_dir = root.join("json");
        self.csv_dir = root.join("csv");
        self.sample_dir = root.join("samples");
    }
}

/// `~/.local/share/elgoose-fetch` (or the platform equivalent), falling back
/// to `./data` when no data directory can be determined.
pub fn default_output_root() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("elgoose-fetch"))
        .unwrap_or_else(|| PathBuf::from("data"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_base_url() {
        let config = FetchConfig::default();
        assert_eq!(config.base_url(), "https://elgoose.net/api/v1");
        assert_eq!(config.artist, ArtistFilter::new(1, "Goose"));
        assert_eq!(*config.expected_years.start(), 2014);
        assert_eq!(config.bulk_timeout, Duration::from_secs(120));
    }

    #[test]
    fn test_from_lookup_overrides() {
        let vars: HashMap<&str, &str> = [
            ("ELGOOSE_HOST", "http://localhost:8080/"),
            ("ELGOOSE_API_VERSION", "v2"),
            ("ELGOOSE_OUTPUT_DIR", "/tmp/goose"),
        ]
        .into_iter()
        .collect();

        let config = FetchConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config.base_url(), "http://localhost:8080/api/v2");
        assert_eq!(config.json_dir, PathBuf::from("/tmp/goose/json"));
        assert_eq!(config.csv_dir, PathBuf::from("/tmp/goose/csv"));
    }

    #[test]
    fn test_from_lookup_rejects_unknown_version() {
        let result = FetchConfig::from_lookup(|k| {
            (k == "ELGOOSE_API_VERSION").then(|| "v9".to_string())
        });
        assert!(matches!(result, Err(FetchError::Config(_))));
    }

    #[test]
    fn test_backwards_year_range_rejected() {
        assert!(FetchConfig::default().with_expected_years(2025, 2014).is_err());
        let config = FetchConfig::default().with_expected_years(2016, 2016).unwrap();
        assert_eq!(config.expected_years, 2016..=2016);
    }

    #[test]
    fn test_out_of_bounds_year_range_rejected() {
        let result = FetchConfig::default().with_expected_years(0, 9_000_000_000_000_000_000);
        assert!(matches!(result, Err(FetchError::Config(_))));
        assert!(FetchConfig::default().with_expected_years(1899, 2020).is_err());
        assert!(FetchConfig::default().with_expected_years(2014, 10_000).is_err());
        assert!(FetchConfig::default().with_expected_years(1900, 9999).is_ok());
    }
}
