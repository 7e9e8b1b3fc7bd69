#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Types a map front end renders: markers, the view and the last error.

use serde::{Deserialize, Serialize};
use station_finder_source_models::{DatasetDefinition, ErrorKind};
use station_finder_station_models::{BoundingBox, GeoPoint, RankedResult};

/// What a marker stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MarkerKind {
    /// The point distances are measured from.
    Reference,
    /// A ranked station.
    Station,
}

/// A map marker with its popup text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    pub kind: MarkerKind,
    pub position: GeoPoint,
    pub label: String,
    pub popup: String,
}

/// Where the map is looking.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapView {
    pub center: GeoPoint,
    pub zoom: u8,
    /// Box the map should fit after a load, if any.
    pub fit_bounds: Option<BoundingBox>,
}

/// The last failed load, as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionError {
    pub message: String,
    pub kind: ErrorKind,
    pub retryable: bool,
}

/// Owned copy of a session's state at one point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub dataset: DatasetDefinition,
    /// Generation of the most recently started reload.
    pub generation: u64,
    pub result: Option<RankedResult>,
    /// Display name of the point `result` was ranked from.
    pub reference_name: String,
    pub markers: Vec<Marker>,
    pub view: MapView,
    pub last_error: Option<SessionError>,
}
