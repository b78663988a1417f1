pub mod api;
pub mod client;
pub mod config;
pub mod coverage;
pub mod error;
pub mod events;
pub mod explore;
pub mod filter;
pub mod pipeline;
pub mod types;
pub mod writer;

pub use api::SetlistApi;
pub use client::ElGooseClient;
pub use config::{ApiVersion, ArtistFilter, FetchConfig, DEFAULT_ENDPOINTS, KNOWN_ENDPOINTS};
pub use coverage::{analyze_year_coverage, date_range, YearCoverage, YearCoverageReport};
pub use error::FetchError;
pub use events::{ClientEvent, ClientEventReceiver, RequestInfo, SharedEventBroadcaster};
pub use explore::{EndpointProbe, FieldDescription, SavedSample};
pub use filter::{count_artist_matches, filter_by_artist};
pub use pipeline::{run_pipeline, EndpointReport, EndpointStatus, PipelineProgress, RunSummary};
pub use types::{Endpoint, EnvelopeShape, FetchOutcome, Record};
pub use writer::{build_table, summarize_csv_dir, write_outputs, CsvFileSummary, WriteResult};

#[cfg(any(test, feature = "mock"))]
pub use api::MockSetlistApi;

pub type Result<T> = std::result::Result<T, FetchError>;
