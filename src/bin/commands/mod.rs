pub mod explore;
pub mod fetch;
pub mod utils;

use clap::Subcommand;
use elgoose_fetch::{ElGooseClient, FetchConfig};
use std::process::ExitCode;

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch endpoints, keep the artist's records, and write JSON and CSV
    ///
    /// Every endpoint is fetched in full, filtered down to the artist
    /// (artist_id OR artist name), checked for year coverage, and written to
    /// <output-dir>/json/<prefix>_<endpoint>.json and
    /// <output-dir>/csv/<prefix>_<endpoint>.csv.
    ///
    /// Usage examples:
    /// # Fetch shows, setlists and songs for Goose
    /// elgoose-fetch fetch
    ///
    /// # Fetch only venues, from the v2 API, into ./data
    /// elgoose-fetch --api-version v2 --output-dir data fetch --endpoints venues
    ///
    /// # Expect coverage from 2016 through 2024
    /// elgoose-fetch fetch --from-year 2016 --to-year 2024
    Fetch {
        /// Comma-separated endpoints (default: shows,setlists,songs)
        #[arg(long, value_delimiter = ',')]
        endpoints: Vec<String>,

        /// Output file name prefix
        #[arg(long)]
        prefix: Option<String>,

        /// Artist id to keep
        #[arg(long)]
        artist_id: Option<i64>,

        /// Artist display name to keep
        #[arg(long)]
        artist_name: Option<String>,

        /// First year expected in the data
        #[arg(long)]
        from_year: Option<i64>,

        /// Last year expected in the data (default: current year)
        #[arg(long)]
        to_year: Option<i64>,

        /// Exit 0 even when some endpoints failed
        #[arg(long)]
        allow_partial: bool,
    },

    /// Probe endpoints and report their shape and contents
    ///
    /// Usage examples:
    /// # Probe every known endpoint
    /// elgoose-fetch explore
    ///
    /// # Probe two endpoints and save a sample of the first working one
    /// elgoose-fetch explore --endpoints shows,songs --save-sample
    Explore {
        /// Comma-separated endpoints (default: every known endpoint)
        #[arg(long, value_delimiter = ',')]
        endpoints: Vec<String>,

        /// Save the first working endpoint's payload and print its fields
        #[arg(long)]
        save_sample: bool,
    },
}

pub async fn execute_command(
    command: Commands,
    client: &ElGooseClient,
    config: FetchConfig,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    match command {
        Commands::Fetch {
            endpoints,
            prefix,
            artist_id,
            artist_name,
            from_year,
            to_year,
            allow_partial,
        } => {
            let config = fetch::apply_overrides(
                config,
                prefix,
                artist_id,
                artist_name,
                from_year,
                to_year,
            )?;
            fetch::handle_fetch(client, &config, &endpoints, allow_partial).await
        }
        Commands::Explore {
            endpoints,
            save_sample,
        } => explore::handle_explore(client, &config, &endpoints, save_sample).await,
    }
}
