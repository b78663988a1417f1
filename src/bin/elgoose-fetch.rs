mod commands;

use clap::Parser;
use commands::{execute_command, utils::spawn_event_printer, Commands};
use elgoose_fetch::{ApiVersion, ElGooseClient, FetchConfig};
use std::path::PathBuf;
use std::process::ExitCode;

/// Goose setlist data fetcher for the elgoose.net API
#[derive(Parser)]
#[command(
    name = "elgoose-fetch",
    about = "Fetch Goose shows, setlists and songs from elgoose.net as JSON and CSV",
    long_about = None
)]
struct Cli {
    /// Show detailed debug information
    #[arg(long, global = true)]
    verbose: bool,

    /// API host (overrides ELGOOSE_HOST)
    #[arg(long, global = true)]
    host: Option<String>,

    /// API version (overrides ELGOOSE_API_VERSION)
    #[arg(long, global = true, value_enum)]
    api_version: Option<ApiVersion>,

    /// Root directory for output files (overrides ELGOOSE_OUTPUT_DIR)
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn config(&self) -> elgoose_fetch::Result<FetchConfig> {
        let mut config = FetchConfig::from_env()?;
        if let Some(host) = &self.host {
            config = config.with_host(host.clone());
        }
        if let Some(api_version) = self.api_version {
            config = config.with_api_version(api_version);
        }
        if let Some(output_dir) = &self.output_dir {
            config = config.with_output_root(output_dir);
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Cli::parse();

    let default_filter = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let config = match args.config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Error: {e}");
            return ExitCode::from(2);
        }
    };

    if args.verbose {
        println!("🔍 Verbose mode enabled");
        println!("🌐 API base: {}", config.base_url());
    }

    let http_client = http_client::native::NativeClient::new();
    let client = ElGooseClient::new(Box::new(http_client), &config);

    let printer = args.verbose.then(|| spawn_event_printer(client.subscribe()));

    let code = match execute_command(args.command, &client, config).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("❌ Command failed: {e}");
            ExitCode::from(2)
        }
    };

    drop(client);
    if let Some(printer) = printer {
        let _ = printer.await;
    }
    code
}
