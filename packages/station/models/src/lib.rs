#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Geographic and station types shared by the ranking pipeline, the
//! session and the HTTP API.
//!
//! A [`GeoPoint`] is always a valid WGS84 coordinate: it can only be
//! constructed (or deserialized) through [`GeoPoint::new`], which rejects
//! non-finite and out-of-range values.

use serde::{Deserialize, Serialize};

/// A validated WGS84 latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGeoPoint")]
pub struct GeoPoint {
    latitude: f64,
    longitude: f64,
}

#[derive(Deserialize)]
struct RawGeoPoint {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<RawGeoPoint> for GeoPoint {
    type Error = String;

    fn try_from(raw: RawGeoPoint) -> Result<Self, Self::Error> {
        Self::new(raw.latitude, raw.longitude).ok_or_else(|| {
            format!(
                "invalid coordinate: latitude {} / longitude {}",
                raw.latitude, raw.longitude
            )
        })
    }
}

impl GeoPoint {
    /// Creates a point, returning `None` if either value is non-finite or
    /// outside `[-90, 90]` / `[-180, 180]`.
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        if latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude)
        {
            Some(Self {
                latitude,
                longitude,
            })
        } else {
            None
        }
    }

    /// Latitude in decimal degrees.
    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in decimal degrees.
    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.longitude
    }
}

/// A geographic bounding box in WGS84 coordinates (inclusive edges).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Southern latitude boundary.
    pub south: f64,
    /// Western longitude boundary.
    pub west: f64,
    /// Northern latitude boundary.
    pub north: f64,
    /// Eastern longitude boundary.
    pub east: f64,
}

impl BoundingBox {
    /// The whole globe. Every valid [`GeoPoint`] is inside it.
    pub const WORLD: Self = Self::new(-90.0, -180.0, 90.0, 180.0);

    /// Plausible region for Swiss datasets.
    pub const SWITZERLAND: Self = Self::new(43.0, 5.0, 49.0, 12.0);

    /// Creates a new bounding box from the given edges.
    #[must_use]
    pub const fn new(south: f64, west: f64, north: f64, east: f64) -> Self {
        Self {
            south,
            west,
            north,
            east,
        }
    }

    /// Whether the given latitude/longitude lies inside this box.
    #[must_use]
    pub fn contains_lat_lon(&self, latitude: f64, longitude: f64) -> bool {
        (self.south..=self.north).contains(&latitude)
            && (self.west..=self.east).contains(&longitude)
    }

    /// Whether the point lies inside this box.
    #[must_use]
    pub fn contains(&self, point: &GeoPoint) -> bool {
        self.contains_lat_lon(point.latitude, point.longitude)
    }

    /// Smallest box covering every point. `None` for an empty iterator.
    #[must_use]
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a GeoPoint>) -> Option<Self> {
        points.into_iter().fold(None, |acc, p| {
            Some(acc.map_or_else(
                || Self::new(p.latitude, p.longitude, p.latitude, p.longitude),
                |b: Self| {
                    Self::new(
                        b.south.min(p.latitude),
                        b.west.min(p.longitude),
                        b.north.max(p.latitude),
                        b.east.max(p.longitude),
                    )
                },
            ))
        })
    }

    /// Grows every edge by `ratio` times the box's span on that axis,
    /// clamped to the valid coordinate range.
    #[must_use]
    pub fn pad(&self, ratio: f64) -> Self {
        let lat_pad = (self.north - self.south).abs() * ratio;
        let lon_pad = (self.east - self.west).abs() * ratio;
        Self::new(
            (self.south - lat_pad).max(-90.0),
            (self.west - lon_pad).max(-180.0),
            (self.north + lat_pad).min(90.0),
            (self.east + lon_pad).min(180.0),
        )
    }

    /// Midpoint of the box.
    #[must_use]
    pub fn center(&self) -> Option<GeoPoint> {
        GeoPoint::new(
            f64::midpoint(self.south, self.north),
            f64::midpoint(self.west, self.east),
        )
    }
}

/// A charging station normalized from a raw dataset record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Station {
    /// Display name. Falls back to a fixed literal when the record has none.
    pub name: String,
    /// Street address or locality, if the record carries one.
    pub address: Option<String>,
    /// Resolved coordinates. `None` when no extraction strategy succeeded.
    pub coordinates: Option<GeoPoint>,
    /// Charging power in kilowatts.
    pub power_kw: Option<f64>,
    /// Operating company.
    pub operator: Option<String>,
}

/// A station together with its distance from the reference point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedStation {
    /// The normalized station.
    pub station: Station,
    /// The resolved coordinates the distance was computed from.
    pub coordinates: GeoPoint,
    /// Great-circle distance from the reference point in kilometers.
    pub distance_km: f64,
}

/// The nearest stations to a reference point, ascending by distance.
///
/// Every entry has resolved coordinates; records whose coordinates could
/// not be resolved never appear here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedResult {
    /// The point distances were measured from.
    pub reference: GeoPoint,
    /// Ranked entries, nearest first.
    pub entries: Vec<RankedStation>,
}

impl RankedResult {
    /// Number of ranked entries.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no station was ranked.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Region covering the reference point and every ranked station, used
    /// for initial camera framing.
    #[must_use]
    pub fn bounds(&self) -> BoundingBox {
        let points = std::iter::once(&self.reference)
            .chain(self.entries.iter().map(|e| &e.coordinates));
        BoundingBox::from_points(points).unwrap_or_else(|| {
            BoundingBox::new(
                self.reference.latitude,
                self.reference.longitude,
                self.reference.latitude,
                self.reference.longitude,
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(lat: f64, lon: f64) -> GeoPoint {
        GeoPoint::new(lat, lon).unwrap()
    }

    #[test]
    fn rejects_out_of_range_points() {
        assert!(GeoPoint::new(91.0, 0.0).is_none());
        assert!(GeoPoint::new(0.0, -180.5).is_none());
        assert!(GeoPoint::new(f64::NAN, 8.0).is_none());
        assert!(GeoPoint::new(47.0, f64::INFINITY).is_none());
        assert!(GeoPoint::new(-90.0, 180.0).is_some());
    }

    #[test]
    fn deserialization_validates_range() {
        let ok: GeoPoint = serde_json::from_str(r#"{"latitude":47.5,"longitude":8.7}"#).unwrap();
        assert!((ok.latitude() - 47.5).abs() < f64::EPSILON);

        let bad = serde_json::from_str::<GeoPoint>(r#"{"latitude":200,"longitude":8.7}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn swiss_box_contains_winterthur_only() {
        assert!(BoundingBox::SWITZERLAND.contains(&point(47.4988, 8.7237)));
        assert!(!BoundingBox::SWITZERLAND.contains(&point(8.7237, 47.4988)));
        assert!(BoundingBox::WORLD.contains(&point(8.7237, 47.4988)));
    }

    #[test]
    fn from_points_covers_all_points() {
        let pts = [point(47.0, 8.0), point(46.5, 9.5), point(47.8, 7.2)];
        let b = BoundingBox::from_points(&pts).unwrap();
        assert_eq!(b, BoundingBox::new(46.5, 7.2, 47.8, 9.5));
        assert!(BoundingBox::from_points(std::iter::empty()).is_none());
    }

    #[test]
    fn pad_grows_each_edge_by_ratio_of_span() {
        let b = BoundingBox::new(46.0, 8.0, 47.0, 10.0).pad(0.2);
        assert!((b.south - 45.8).abs() < 1e-9);
        assert!((b.north - 47.2).abs() < 1e-9);
        assert!((b.west - 7.6).abs() < 1e-9);
        assert!((b.east - 10.4).abs() < 1e-9);
    }

    #[test]
    fn pad_clamps_to_valid_range() {
        let b = BoundingBox::WORLD.pad(0.5);
        assert_eq!(b, BoundingBox::WORLD);
    }

    #[test]
    fn result_bounds_include_reference() {
        let result = RankedResult {
            reference: point(47.5, 8.7),
            entries: vec![RankedStation {
                station: Station {
                    name: "A".to_string(),
                    address: None,
                    coordinates: Some(point(47.4, 8.9)),
                    power_kw: None,
                    operator: None,
                },
                coordinates: point(47.4, 8.9),
                distance_km: 18.0,
            }],
        };
        assert_eq!(result.bounds(), BoundingBox::new(47.4, 8.7, 47.5, 8.9));
    }

    #[test]
    fn empty_result_bounds_are_reference_point() {
        let result = RankedResult {
            reference: point(47.5, 8.7),
            entries: Vec::new(),
        };
        assert_eq!(result.bounds(), BoundingBox::new(47.5, 8.7, 47.5, 8.7));
        assert!(result.is_empty());
    }
}
