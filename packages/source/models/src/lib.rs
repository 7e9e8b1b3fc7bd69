#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Dataset configuration types and load error categories.
//!
//! A [`DatasetDefinition`] is the parsed form of one TOML file under
//! `packages/source/datasets/`. Fetching and ranking live in
//! `station_finder_source`; this crate only holds the data so API types can
//! depend on it without pulling in the HTTP stack.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use station_finder_station_models::{BoundingBox, GeoPoint};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

const fn default_limit() -> usize {
    5
}

const fn default_timeout_secs() -> u64 {
    30
}

/// Coarse error category reported to users and API clients.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Fetch failed or returned a non-success status.
    NetworkError,
    /// Response body is not JSON.
    MalformedPayloadError,
    /// No record array found in the payload.
    EmptyDatasetError,
    /// Records exist but none has usable coordinates.
    NoValidCoordinatesError,
    /// Invalid or unknown dataset configuration.
    ConfigError,
}

/// The point distances are measured from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawReference", into = "RawReference")]
pub struct ReferencePoint {
    /// Display name (e.g. `"Winterthur"`).
    pub name: String,
    /// Validated coordinates.
    pub point: GeoPoint,
}

#[derive(Serialize, Deserialize)]
struct RawReference {
    name: String,
    latitude: f64,
    longitude: f64,
}

impl TryFrom<RawReference> for ReferencePoint {
    type Error = String;

    fn try_from(raw: RawReference) -> Result<Self, Self::Error> {
        let point = GeoPoint::new(raw.latitude, raw.longitude).ok_or_else(|| {
            format!(
                "reference {:?} has invalid coordinates ({}, {})",
                raw.name, raw.latitude, raw.longitude
            )
        })?;
        Ok(Self {
            name: raw.name,
            point,
        })
    }
}

impl From<ReferencePoint> for RawReference {
    fn from(reference: ReferencePoint) -> Self {
        Self {
            name: reference.name,
            latitude: reference.point.latitude(),
            longitude: reference.point.longitude(),
        }
    }
}

/// A station dataset and how to rank it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetDefinition {
    /// Unique identifier used on the command line and in env vars.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// URL of the JSON document.
    pub url: String,
    /// Reference point for distance ranking.
    pub reference: ReferencePoint,
    /// Number of nearest stations to return.
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Box that coordinates must fall into. Absent means the whole world.
    #[serde(default)]
    pub plausible_region: Option<BoundingBox>,
    /// Per-request timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Automatic retries for transient fetch failures.
    #[serde(default)]
    pub max_retries: u32,
}

impl DatasetDefinition {
    /// The box coordinates must fall into.
    #[must_use]
    pub fn region(&self) -> BoundingBox {
        self.plausible_region.unwrap_or(BoundingBox::WORLD)
    }

    /// Per-request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
