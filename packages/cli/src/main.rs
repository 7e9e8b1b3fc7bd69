#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the station finder.
//!
//! Fetches a station dataset, ranks it by distance from the dataset's
//! reference point (or `--lat`/`--lon`) and prints the nearest stations.
//! `serve` starts the HTTP API instead.

mod output;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use station_finder_server_models::ApiRankedResult;
use station_finder_session::CUSTOM_REFERENCE_NAME;
use station_finder_source::{
    DatasetDefinition, DatasetLoader, SourceError, parse_payload, registry,
};
use station_finder_station_models::{GeoPoint, RankedResult};

#[derive(Parser)]
#[command(name = "station_finder", about = "Find the nearest EV charging stations")]
struct Cli {
    /// Dataset identifier (overrides `STATION_FINDER_DATASET` env var)
    #[arg(long, global = true)]
    dataset: Option<String>,
    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the stations nearest to the reference point (default)
    Nearest(QueryArgs),
    /// List the nearest stations whose name, address or operator matches
    Search {
        /// Place name to look for (e.g., "Bahnhof")
        query: String,
        #[command(flatten)]
        args: QueryArgs,
    },
    /// List all configured datasets
    Datasets,
    /// Start the HTTP API server (`BIND_ADDR`, `PORT`)
    Serve,
}

#[derive(Args, Default)]
struct QueryArgs {
    /// Number of stations to show (defaults to the dataset limit)
    #[arg(long)]
    limit: Option<usize>,
    /// Reference latitude (requires --lon)
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    lat: Option<f64>,
    /// Reference longitude (requires --lat)
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    lon: Option<f64>,
    /// Read the dataset JSON from a local file instead of fetching it
    #[arg(long)]
    file: Option<PathBuf>,
}

impl QueryArgs {
    /// The reference point and its display name.
    fn reference(&self, dataset: &DatasetDefinition) -> Result<(GeoPoint, String), SourceError> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => GeoPoint::new(lat, lon)
                .map(|p| (p, CUSTOM_REFERENCE_NAME.to_string()))
                .ok_or_else(|| SourceError::Config {
                    message: format!("coordinates out of range: {lat}, {lon}"),
                }),
            _ => Ok((dataset.reference.point, dataset.reference.name.clone())),
        }
    }

    /// Reads the `--file` payload, or fetches the dataset.
    #[allow(clippy::future_not_send)]
    async fn payload(
        &self,
        dataset: &DatasetDefinition,
    ) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
        if let Some(file) = &self.file {
            log::info!("Reading {}", file.display());
            let text = tokio::fs::read_to_string(file).await?;
            return Ok(parse_payload(&text)?);
        }
        let client = station_finder_source::http_client()?;
        Ok(dataset.fetch(&client).await?)
    }
}

fn print_result(
    result: &RankedResult,
    reference_name: &str,
    json: bool,
) -> serde_json::Result<()> {
    if json {
        let api = ApiRankedResult::new(result, reference_name);
        println!("{}", serde_json::to_string_pretty(&api)?);
    } else {
        print!("{}", output::render_result(result, reference_name));
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let id = cli
        .dataset
        .or_else(|| std::env::var("STATION_FINDER_DATASET").ok())
        .unwrap_or_else(|| registry::DEFAULT_DATASET_ID.to_string());

    let command = cli
        .command
        .unwrap_or_else(|| Commands::Nearest(QueryArgs::default()));

    match command {
        Commands::Datasets => {
            let datasets = registry::all_datasets();
            if cli.json {
                let api: Vec<_> = datasets
                    .iter()
                    .map(station_finder_server_models::ApiDataset::from)
                    .collect();
                println!("{}", serde_json::to_string_pretty(&api)?);
            } else {
                print!("{}", output::render_datasets(&datasets));
            }
        }
        Commands::Serve => {
            let dataset = registry::find_dataset(&id)?;
            // The server uses actix-web's runtime, so we need to run it
            // in a blocking task to avoid nesting tokio runtimes.
            tokio::task::spawn_blocking(|| {
                actix_web::rt::System::new().block_on(station_finder_server::run_server(dataset))
            })
            .await??;
        }
        Commands::Nearest(args) => {
            let dataset = registry::find_dataset(&id)?;
            let (reference, reference_name) = args.reference(&dataset)?;
            let limit = args.limit.unwrap_or(dataset.limit);
            let result = match args.payload(&dataset).await {
                Ok(payload) => dataset.rank_payload(&payload, &reference, limit),
                Err(e) => fail(&*e),
            };
            match result {
                Ok(result) => print_result(&result, &reference_name, cli.json)?,
                Err(e) => fail(&e),
            }
        }
        Commands::Search { query, args } => {
            let dataset = registry::find_dataset(&id)?;
            let (reference, reference_name) = args.reference(&dataset)?;
            let limit = args.limit.unwrap_or(dataset.limit);
            let result = match args.payload(&dataset).await {
                Ok(payload) => dataset.search_payload(&payload, &query, &reference, limit),
                Err(e) => fail(&*e),
            };
            match result {
                Ok(result) => print_result(&result, &reference_name, cli.json)?,
                Err(e) => fail(&e),
            }
        }
    }

    Ok(())
}

/// Reports a load failure with its user-facing message and exits non-zero.
fn fail(e: &(dyn std::error::Error + 'static)) -> ! {
    log::error!("{e}");
    let message = e
        .downcast_ref::<SourceError>()
        .map_or_else(|| e.to_string(), SourceError::user_message);
    eprintln!("Error: {message}");
    std::process::exit(1);
}
