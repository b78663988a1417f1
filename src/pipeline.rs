use crate::coverage::{analyze_year_coverage, date_range, YearCoverageReport};
use crate::writer::{write_outputs, WriteResult};
use crate::{Endpoint, FetchConfig, Result, SetlistApi};
use std::fs;

/// How processing one endpoint ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndpointStatus {
    /// Records were fetched, filtered and written.
    Succeeded,
    /// The fetch worked but nothing belonged to the artist; no files written.
    NoMatches,
    /// Fetching or writing failed.
    Failed(String),
}

/// Per-endpoint result of a pipeline run.
#[derive(Debug, Clone)]
pub struct EndpointReport {
    pub endpoint: Endpoint,
    /// Records the API returned
    pub fetched: usize,
    /// Records left after artist filtering
    pub matched: usize,
    pub status: EndpointStatus,
    /// Files written, when the endpoint succeeded
    pub written: Option<WriteResult>,
    /// Year coverage of the matched records
    pub coverage: Option<YearCoverageReport>,
    /// Earliest and latest `showdate`, when the records have one
    pub date_range: Option<(String, String)>,
}

impl EndpointReport {
    fn new(endpoint: &Endpoint) -> Self {
        Self {
            endpoint: endpoint.clone(),
            fetched: 0,
            matched: 0,
            status: EndpointStatus::NoMatches,
            written: None,
            coverage: None,
            date_range: None,
        }
    }

    fn failed(mut self, message: String) -> Self {
        self.status = EndpointStatus::Failed(message);
        self
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.status, EndpointStatus::Failed(_))
    }
}

/// Progress notifications passed to the [`run_pipeline`] callback.
#[derive(Debug, Clone, Copy)]
pub enum PipelineProgress<'a> {
    /// About to fetch this endpoint.
    Started(&'a Endpoint),
    /// The endpoint is done, successfully or not.
    Finished(&'a EndpointReport),
}

/// Aggregated result of [`run_pipeline`].
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub endpoints: Vec<EndpointReport>,
}

impl RunSummary {
    /// Rows written across all endpoints.
    pub fn total_records_written(&self) -> usize {
        self.endpoints
            .iter()
            .filter_map(|report| report.written.as_ref())
            .map(|written| written.rows)
            .sum()
    }

    pub fn failures(&self) -> impl Iterator<Item = &EndpointReport> {
        self.endpoints.iter().filter(|report| report.is_failure())
    }

    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }
}

/// Fetch, filter, analyse and write every endpoint in turn.
///
/// Only failing to create the output directories is an error. Everything else
/// is recorded per endpoint in the returned [`RunSummary`], and `on_progress`
/// is called before and after each endpoint so callers can print progress.
pub async fn run_pipeline<A, F>(
    api: &A,
    config: &FetchConfig,
    endpoints: &[Endpoint],
    mut on_progress: F,
) -> Result<RunSummary>
where
    A: SetlistApi + ?Sized,
    F: FnMut(PipelineProgress<'_>),
{
    fs::create_dir_all(&config.json_dir)?;
    fs::create_dir_all(&config.csv_dir)?;

    let mut summary = RunSummary::default();
    for endpoint in endpoints {
        on_progress(PipelineProgress::Started(endpoint));
        let report = process_endpoint(api, config, endpoint).await;
        on_progress(PipelineProgress::Finished(&report));
        summary.endpoints.push(report);
    }

    log::info!(
        "Run finished: {} endpoints, {} failed, {} records written",
        summary.endpoints.len(),
        summary.failures().count(),
        summary.total_records_written()
    );
    Ok(summary)
}

/// Run the fetch, filter, analyse, write sequence for one endpoint.
pub async fn process_endpoint<A>(
    api: &A,
    config: &FetchConfig,
    endpoint: &Endpoint,
) -> EndpointReport
where
    A: SetlistApi + ?Sized,
{
    let report = EndpointReport::new(endpoint);

    let outcome = api.fetch_all(endpoint.name()).await;
    if let Some(error) = outcome.error {
        log::warn!("Fetching {endpoint} failed: {error}");
        return report.failed(error.to_string());
    }

    let mut report = EndpointReport {
        fetched: outcome.records.len(),
        ..report
    };

    let matched = config.artist.apply(&outcome.records);
    report.matched = matched.len();
    log::info!(
        "{endpoint}: {} of {} records belong to {}",
        report.matched,
        report.fetched,
        config.artist.artist_name
    );

    if matched.is_empty() {
        return report;
    }

    report.coverage = Some(analyze_year_coverage(
        &matched,
        config.expected_years.clone(),
    ));
    report.date_range = date_range(&matched, "showdate");

    let json_path = config.json_dir.join(endpoint.file_name(&config.prefix, "json"));
    let csv_path = config.csv_dir.join(endpoint.file_name(&config.prefix, "csv"));

    match write_outputs(&matched, &json_path, &csv_path) {
        Ok(written) => {
            report.written = Some(written);
            report.status = EndpointStatus::Succeeded;
            report
        }
        Err(e) => {
            log::warn!("Writing {endpoint} failed: {e}");
            report.failed(format!("write failed: {e}"))
        }
    }
}
