//! Coordinate extraction from raw station records of unknown shape.
//!
//! Datasets disagree on where coordinates live and in which axis order, so
//! extraction tries several strategies in turn and uses a regional
//! plausibility box to decide which of two numbers is the latitude.

use serde_json::Value;
use station_finder_station_models::{BoundingBox, GeoPoint};

/// Name pairs scanned in a record's properties, as `(latitude, longitude)`.
const NAMED_PAIRS: &[(&str, &str)] = &[
    ("latitude", "longitude"),
    ("lat", "lon"),
    ("lat", "lng"),
    ("y", "x"),
    ("coord_y", "coord_x"),
];

/// Top-level latitude field names, tried in order.
const LAT_FIELDS: &[&str] = &["lat", "latitude", "y"];

/// Top-level longitude field names, tried in order.
const LON_FIELDS: &[&str] = &["lon", "longitude", "x", "lng"];

/// Coerces a JSON number or numeric-looking string into a finite `f64`.
///
/// Strings may use either `.` or `,` as the decimal separator. Returns
/// `None` for anything else, including `NaN` and infinities.
#[must_use]
pub fn coerce_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed.replace(',', ".").parse::<f64>().ok()?
        }
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Recovers a [`GeoPoint`] from a raw record.
///
/// Resolution order (first success wins):
///
/// 1. `geometry.coordinates` or a top-level `coordinates` array (`GeoJSON`
///    `[lon, lat]`).
/// 2. The first name pair from [`NAMED_PAIRS`] present in `properties`,
///    then on the record itself.
/// 3. Loose `lat`/`latitude`/`y` and `lon`/`longitude`/`x`/`lng` fields on
///    the record.
///
/// Each candidate pair must fall inside the plausible region in one of the
/// two axis orders, otherwise the strategy is considered failed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateExtractor {
    region: BoundingBox,
}

impl Default for CoordinateExtractor {
    fn default() -> Self {
        Self::new(BoundingBox::SWITZERLAND)
    }
}

impl CoordinateExtractor {
    /// Creates an extractor that accepts points inside `region`.
    #[must_use]
    pub const fn new(region: BoundingBox) -> Self {
        Self { region }
    }

    /// The plausible region candidates are checked against.
    #[must_use]
    pub const fn region(&self) -> &BoundingBox {
        &self.region
    }

    /// Extracts coordinates from `record`, or `None` if no strategy yields a
    /// plausible pair.
    #[must_use]
    pub fn extract(&self, record: &Value) -> Option<GeoPoint> {
        self.from_geometry(record)
            .or_else(|| self.from_named_pairs(record))
            .or_else(|| self.from_direct_fields(record))
    }

    fn from_geometry(&self, record: &Value) -> Option<GeoPoint> {
        let coords = record
            .get("geometry")
            .and_then(|g| g.get("coordinates"))
            .or_else(|| record.get("coordinates"))?
            .as_array()?;

        if coords.len() < 2 {
            return None;
        }
        let a = coerce_number(&coords[0])?;
        let b = coerce_number(&coords[1])?;

        // GeoJSON order is [lon, lat]
        self.disambiguate(b, a)
    }

    fn from_named_pairs(&self, record: &Value) -> Option<GeoPoint> {
        let scopes = [record.get("properties").filter(|p| p.is_object()), Some(record)];

        let (lat, lon) = scopes.into_iter().flatten().find_map(|scope| {
            NAMED_PAIRS.iter().find_map(|(lat_key, lon_key)| {
                let lat = scope.get(*lat_key).and_then(coerce_number)?;
                let lon = scope.get(*lon_key).and_then(coerce_number)?;
                Some((lat, lon))
            })
        })?;

        self.disambiguate(lat, lon)
    }

    fn from_direct_fields(&self, record: &Value) -> Option<GeoPoint> {
        let first_number = |fields: &[&str]| {
            fields
                .iter()
                .find_map(|f| record.get(*f).and_then(coerce_number))
        };
        let lat = first_number(LAT_FIELDS)?;
        let lon = first_number(LON_FIELDS)?;
        self.disambiguate(lat, lon)
    }

    /// Tries `(lat, lon)` then `(lon, lat)` against the plausible region.
    fn disambiguate(&self, lat: f64, lon: f64) -> Option<GeoPoint> {
        GeoPoint::new(lat, lon)
            .filter(|p| self.region.contains(p))
            .or_else(|| GeoPoint::new(lon, lat).filter(|p| self.region.contains(p)))
    }
}
