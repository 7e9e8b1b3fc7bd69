#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the station finder server.
//!
//! These types are serialized to JSON for the REST API. They are separate
//! from the ranking types to allow independent evolution of the API
//! contract.

use serde::{Deserialize, Serialize};
use station_finder_session_models::{MapView, Marker, SessionError, SessionSnapshot};
use station_finder_source_models::{DatasetDefinition, ErrorKind};
use station_finder_station_models::{BoundingBox, RankedResult, RankedStation};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiHealth {
    /// Whether the server is healthy.
    pub healthy: bool,
    /// Server version.
    pub version: String,
}

/// Error body returned by every failing endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Message suitable for showing to the user.
    pub error: String,
    /// Error category: an [`ErrorKind`] name, `BAD_REQUEST` or
    /// `SUPERSEDED`.
    pub kind: String,
    /// Whether retrying the same request may succeed.
    pub retryable: bool,
}

impl From<&SessionError> for ApiError {
    fn from(e: &SessionError) -> Self {
        Self::new(e.message.clone(), e.kind, e.retryable)
    }
}

impl ApiError {
    /// A failed dataset load.
    #[must_use]
    pub fn new(message: impl Into<String>, kind: ErrorKind, retryable: bool) -> Self {
        Self {
            error: message.into(),
            kind: kind.to_string(),
            retryable,
        }
    }

    /// Invalid query parameters.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            kind: "BAD_REQUEST".to_string(),
            retryable: false,
        }
    }

    /// A newer reload was started while this one was in flight.
    #[must_use]
    pub fn superseded() -> Self {
        Self {
            error: "A newer request replaced this one.".to_string(),
            kind: "SUPERSEDED".to_string(),
            retryable: true,
        }
    }
}

/// The point distances were measured from.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiReference {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// A ranked station as returned by the API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiStation {
    /// Station name.
    pub name: String,
    /// Street address, if known.
    pub address: Option<String>,
    /// Great-circle distance from the reference point.
    pub distance_km: f64,
    /// Charging power in kW, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power_kw: Option<f64>,
    /// Operator, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

impl From<&RankedStation> for ApiStation {
    fn from(entry: &RankedStation) -> Self {
        Self {
            name: entry.station.name.clone(),
            address: entry.station.address.clone(),
            distance_km: entry.distance_km,
            power_kw: entry.station.power_kw,
            operator: entry.station.operator.clone(),
            latitude: entry.coordinates.latitude(),
            longitude: entry.coordinates.longitude(),
        }
    }
}

/// Nearest-first station list.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRankedResult {
    pub reference: ApiReference,
    pub stations: Vec<ApiStation>,
    /// Box covering the reference and every station.
    pub bounds: BoundingBox,
}

impl ApiRankedResult {
    /// Converts `result`, labelling its reference point `reference_name`.
    #[must_use]
    pub fn new(result: &RankedResult, reference_name: &str) -> Self {
        Self {
            reference: ApiReference {
                name: reference_name.to_string(),
                latitude: result.reference.latitude(),
                longitude: result.reference.longitude(),
            },
            stations: result.entries.iter().map(ApiStation::from).collect(),
            bounds: result.bounds(),
        }
    }
}

/// Summary of a configured dataset.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiDataset {
    pub id: String,
    pub name: String,
    pub url: String,
    pub reference: ApiReference,
    pub limit: usize,
    pub plausible_region: BoundingBox,
}

impl From<&DatasetDefinition> for ApiDataset {
    fn from(def: &DatasetDefinition) -> Self {
        Self {
            id: def.id.clone(),
            name: def.name.clone(),
            url: def.url.clone(),
            reference: ApiReference {
                name: def.reference.name.clone(),
                latitude: def.reference.point.latitude(),
                longitude: def.reference.point.longitude(),
            },
            limit: def.limit,
            plausible_region: def.region(),
        }
    }
}

/// Snapshot of the map session.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSession {
    pub dataset: ApiDataset,
    pub generation: u64,
    pub result: Option<ApiRankedResult>,
    pub markers: Vec<Marker>,
    pub view: MapView,
    pub last_error: Option<SessionError>,
}

impl From<&SessionSnapshot> for ApiSession {
    fn from(snapshot: &SessionSnapshot) -> Self {
        Self {
            dataset: ApiDataset::from(&snapshot.dataset),
            generation: snapshot.generation,
            result: snapshot
                .result
                .as_ref()
                .map(|r| ApiRankedResult::new(r, &snapshot.reference_name)),
            markers: snapshot.markers.clone(),
            view: snapshot.view,
            last_error: snapshot.last_error.clone(),
        }
    }
}

/// Query parameters for the nearest-stations endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NearestQueryParams {
    /// Number of stations to return. Defaults to the dataset limit.
    pub limit: Option<usize>,
    /// Reference latitude. Must be given together with `lon`.
    pub lat: Option<f64>,
    /// Reference longitude. Must be given together with `lat`.
    pub lon: Option<f64>,
}

/// Query parameters for the station search endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQueryParams {
    /// Place-name query matched against name, address and operator.
    #[serde(default)]
    pub q: String,
    pub limit: Option<usize>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

#[cfg(test)]
mod tests {
    use station_finder_station_models::{GeoPoint, Station};

    use super::*;

    fn ranked() -> RankedResult {
        let coordinates = GeoPoint::new(47.5, 8.724).unwrap();
        RankedResult {
            reference: GeoPoint::new(47.4988, 8.7237).unwrap(),
            entries: vec![RankedStation {
                station: Station {
                    name: "Stadtwerk".to_string(),
                    address: None,
                    coordinates: Some(coordinates),
                    power_kw: Some(22.0),
                    operator: None,
                },
                coordinates,
                distance_km: 0.14,
            }],
        }
    }

    #[test]
    fn ranked_result_uses_camel_case_and_skips_unknown_optionals() {
        let json = serde_json::to_value(ApiRankedResult::new(&ranked(), "Winterthur")).unwrap();
        assert_eq!(json["reference"]["name"], "Winterthur");
        let station = &json["stations"][0];
        assert_eq!(station["distanceKm"], 0.14);
        assert_eq!(station["powerKw"], 22.0);
        assert!(station.get("operator").is_none());
        assert!(station["address"].is_null());
        assert_eq!(json["bounds"]["north"], 47.5);
    }

    #[test]
    fn error_body_carries_kind_and_retryable() {
        let err = SessionError {
            message: "The station data server is unavailable (HTTP 503).".to_string(),
            kind: ErrorKind::NetworkError,
            retryable: true,
        };
        let json = serde_json::to_value(ApiError::from(&err)).unwrap();
        assert_eq!(json["kind"], "NETWORK_ERROR");
        assert_eq!(json["retryable"], true);
        assert!(json["error"].as_str().unwrap().contains("503"));
    }
}
