use super::utils::{format_count, parse_endpoints};
use elgoose_fetch::explore::{explore, save_sample, MATCH_SCAN_LIMIT};
use elgoose_fetch::{
    ElGooseClient, EndpointProbe, EnvelopeShape, FetchConfig, SetlistApi, KNOWN_ENDPOINTS,
};
use std::process::ExitCode;

pub async fn handle_explore(
    client: &ElGooseClient,
    config: &FetchConfig,
    endpoints: &[String],
    save: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let endpoints = parse_endpoints(endpoints, &KNOWN_ENDPOINTS)?;

    println!("🔎 ElGoose.net API {} Explorer", config.api_version);
    println!("{}", "=".repeat(40));
    println!("🌐 Base URL: {}", client.base_url());

    let probes = explore(client, &endpoints, &config.artist).await;
    for probe in &probes {
        print_probe(probe, &config.artist.artist_name);
    }

    let working: Vec<&EndpointProbe> = probes.iter().filter(|probe| probe.success()).collect();

    println!();
    println!("{}", "=".repeat(40));
    println!("📋 SUMMARY");
    println!("{}", "=".repeat(40));

    let Some(first) = working.first() else {
        println!("❌ No working endpoints found");
        return Ok(ExitCode::from(1));
    };

    let names: Vec<&str> = working.iter().map(|probe| probe.endpoint.name()).collect();
    println!("✅ Working endpoints: {}", names.join(", "));

    if save {
        println!();
        println!("🔬 Detailed analysis of {}", first.endpoint);
        match save_sample(client, &first.endpoint, config.api_version, &config.sample_dir).await {
            Ok(sample) => {
                println!("💾 Sample data saved to: {}", sample.path.display());
                println!("🧱 Full sample record structure:");
                for field in &sample.fields {
                    println!("   {}: {} = {}", field.name, field.type_name, field.preview);
                }
            }
            Err(e) => println!("❌ Could not save sample: {e}"),
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn print_probe(probe: &EndpointProbe, artist: &str) {
    println!();
    println!("🧪 Testing: {}", probe.url);

    if let Some(error) = &probe.error {
        println!("   ❌ FAILED: {error}");
        return;
    }

    println!("   ✅ SUCCESS: {}", probe.url);
    match &probe.shape {
        Some(EnvelopeShape::Wrapped { keys }) => {
            println!("   Response type: envelope with keys [{}]", keys.join(", "));
            println!("   Data records: {}", format_count(probe.record_count));
        }
        _ => println!("   Records: {}", format_count(probe.record_count)),
    }

    if !probe.sample_fields.is_empty() {
        println!("   Sample fields: [{}]...", probe.sample_fields.join(", "));
    }
    if probe.artist_matches > 0 {
        println!(
            "   🎯 {artist} records found: {} in first {MATCH_SCAN_LIMIT}",
            probe.artist_matches
        );
    }
}
