#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Station finder API server binary.
//!
//! Serves the dataset named by `STATION_FINDER_DATASET` (default
//! `ch_bfe_charging`).

use station_finder_source::registry;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let id = std::env::var("STATION_FINDER_DATASET")
        .unwrap_or_else(|_| registry::DEFAULT_DATASET_ID.to_string());
    let dataset = registry::find_dataset(&id).map_err(std::io::Error::other)?;

    station_finder_server::run_server(dataset).await
}
