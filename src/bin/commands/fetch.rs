use super::utils::{format_count, parse_endpoints};
use elgoose_fetch::{
    run_pipeline, summarize_csv_dir, ArtistFilter, ElGooseClient, Endpoint, EndpointReport,
    EndpointStatus, FetchConfig, PipelineProgress, DEFAULT_ENDPOINTS,
};
use std::process::ExitCode;

/// Apply `fetch` flags on top of the environment-derived config.
pub fn apply_overrides(
    mut config: FetchConfig,
    prefix: Option<String>,
    artist_id: Option<i64>,
    artist_name: Option<String>,
    from_year: Option<i64>,
    to_year: Option<i64>,
) -> Result<FetchConfig, Box<dyn std::error::Error>> {
    if let Some(prefix) = prefix {
        config = config.with_prefix(prefix);
    }
    if artist_id.is_some() || artist_name.is_some() {
        let artist = ArtistFilter::new(
            artist_id.unwrap_or(config.artist.artist_id),
            artist_name.unwrap_or_else(|| config.artist.artist_name.clone()),
        );
        config = config.with_artist(artist);
    }
    if from_year.is_some() || to_year.is_some() {
        let first = from_year.unwrap_or(*config.expected_years.start());
        let last = to_year.unwrap_or(*config.expected_years.end());
        config = config.with_expected_years(first, last)?;
    }
    Ok(config)
}

pub async fn handle_fetch(
    client: &ElGooseClient,
    config: &FetchConfig,
    endpoints: &[String],
    allow_partial: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let endpoints = parse_endpoints(endpoints, &DEFAULT_ENDPOINTS)?;
    let artist = &config.artist.artist_name;

    println!("🎸 {artist} Data Fetcher - API {}", config.api_version);
    println!("{}", "=".repeat(40));
    println!("📁 JSON output: {}", config.json_dir.display());
    println!("📁 CSV output: {}", config.csv_dir.display());

    let summary = match run_pipeline(client, config, &endpoints, |progress| match progress {
        PipelineProgress::Started(endpoint) => print_header(endpoint),
        PipelineProgress::Finished(report) => print_report(report, artist),
    })
    .await
    {
        Ok(summary) => summary,
        Err(e) => {
            eprintln!("❌ Could not create output directories: {e}");
            return Ok(ExitCode::from(2));
        }
    };

    println!();
    println!("✅ {artist} {} data fetch complete!", config.api_version);
    println!("📁 JSON files: {}", config.json_dir.display());
    println!("📁 CSV files: {}", config.csv_dir.display());

    println!();
    println!("📊 Final Dataset Summary:");
    let mut total = 0;
    for file in summarize_csv_dir(&config.csv_dir)? {
        match file.error {
            Some(error) => println!("   ⚠️  {}: could not read ({error})", file.file_name),
            None => {
                total += file.rows;
                println!("   • {}: {} records", file.file_name, format_count(file.rows));
            }
        }
    }
    println!("📈 Total {artist} records: {}", format_count(total));
    println!(
        "📝 Written this run: {}",
        format_count(summary.total_records_written())
    );

    if summary.has_failures() {
        let failed: Vec<String> = summary
            .failures()
            .map(|report| report.endpoint.to_string())
            .collect();
        eprintln!("⚠️  Failed endpoints: {}", failed.join(", "));
        if !allow_partial {
            return Ok(ExitCode::from(1));
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn print_header(endpoint: &Endpoint) {
    println!();
    println!("🔄 Processing {}", endpoint.name().to_uppercase());
    println!("{}", "-".repeat(30));
}

fn print_report(report: &EndpointReport, artist: &str) {
    let name = report.endpoint.name();

    match &report.status {
        EndpointStatus::Failed(error) if report.fetched == 0 => {
            println!("   ❌ Error fetching {name}: {error}");
            return;
        }
        _ => {}
    }

    println!(
        "   ✓ Retrieved {} total {name} records",
        format_count(report.fetched)
    );
    println!(
        "   🎯 Filtered to {} {artist} records (from {} total)",
        format_count(report.matched),
        format_count(report.fetched)
    );

    match &report.status {
        EndpointStatus::NoMatches => {
            println!("   ⚠️  No {artist} data found in {name}");
            return;
        }
        EndpointStatus::Failed(error) => {
            println!("   ❌ {error}");
            return;
        }
        EndpointStatus::Succeeded => {}
    }

    if let Some(written) = &report.written {
        println!("   💾 Saved JSON: {}", file_name(&written.json_path));
        println!(
            "   💾 Saved CSV: {} ({} rows × {} cols)",
            file_name(&written.csv_path),
            format_count(written.rows),
            written.columns
        );
    }

    if let Some(coverage) = &report.coverage {
        for line in coverage.summary_lines(name) {
            println!("   📅 {line}");
        }
    }

    if let Some((first, last)) = &report.date_range {
        println!("   📆 Date range: {first} to {last}");
    }
}

fn file_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
