#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Nearest-station resolution pipeline.
//!
//! Turns an arbitrarily-shaped JSON payload into a ranked list of the
//! stations closest to a reference point:
//!
//! 1. [`normalize`] locates the array of raw records (`GeoJSON`
//!    `FeatureCollection`, bare array, or a wrapper object).
//! 2. [`coordinates::CoordinateExtractor`] recovers a plausible
//!    latitude/longitude pair from each record.
//! 3. [`distance::distance_km`] measures the great-circle distance to the
//!    reference point.
//! 4. [`rank::StationRanker`] drops unresolvable records, sorts by distance
//!    and keeps the first `limit` entries.

pub mod coordinates;
pub mod distance;
pub mod normalize;
pub mod rank;
pub mod search;

pub use coordinates::CoordinateExtractor;
pub use distance::distance_km;
pub use normalize::normalize;
pub use rank::StationRanker;

/// Errors surfaced by the normalize/rank layer.
///
/// Extraction and distance computation never fail; records they cannot
/// handle are omitted and only reported here when nothing is left.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StationError {
    /// No array of records could be located in the payload.
    #[error("No station records found in the dataset")]
    EmptyDataset,

    /// The dataset had records but none yielded resolvable coordinates.
    #[error("None of the {records} station records have valid coordinates")]
    NoValidCoordinates {
        /// How many records were inspected.
        records: usize,
    },
}
