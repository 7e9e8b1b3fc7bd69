//! Nearest-station ranking.

use serde_json::Value;
use station_finder_station_models::{GeoPoint, RankedResult, RankedStation, Station};

use crate::coordinates::{CoordinateExtractor, coerce_number};
use crate::distance::distance_km;
use crate::{StationError, normalize};

/// Name used when a record carries none of the [`NAME_FIELDS`].
pub const UNNAMED_STATION: &str = "Unnamed station";

/// Field names for the station name, tried in order.
pub const NAME_FIELDS: &[&str] = &["name", "betreiber", "title", "bezeichnung"];

/// Field names for the address, tried in order.
pub const ADDRESS_FIELDS: &[&str] = &["adresse", "address", "strasse", "street", "ort", "city"];

/// Field names for the charging power in kW, tried in order.
pub const POWER_FIELDS: &[&str] = &["leistungkw", "leistung_kw", "power_kw", "power"];

/// Field names for the operator, tried in order.
pub const OPERATOR_FIELDS: &[&str] = &["betreiber", "operator"];

/// Looks `field` up in the record's `properties` first, then on the record
/// itself.
fn lookup<'a>(record: &'a Value, field: &str) -> Option<&'a Value> {
    record
        .get("properties")
        .and_then(|p| p.get(field))
        .filter(|v| !v.is_null())
        .or_else(|| record.get(field).filter(|v| !v.is_null()))
}

/// Returns the first non-empty text value among `fields`. Numeric values
/// are converted to strings.
#[must_use]
pub fn first_text(record: &Value, fields: &[&str]) -> Option<String> {
    fields.iter().find_map(|field| match lookup(record, field)? {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Returns the first numeric value among `fields`.
#[must_use]
pub fn first_number(record: &Value, fields: &[&str]) -> Option<f64> {
    fields
        .iter()
        .find_map(|field| lookup(record, field).and_then(coerce_number))
}

/// Builds a [`Station`] from a raw record using the fixed field priority
/// lists.
#[must_use]
pub fn station_from_record(record: &Value, coordinates: Option<GeoPoint>) -> Station {
    Station {
        name: first_text(record, NAME_FIELDS).unwrap_or_else(|| UNNAMED_STATION.to_string()),
        address: first_text(record, ADDRESS_FIELDS),
        coordinates,
        power_kw: first_number(record, POWER_FIELDS),
        operator: first_text(record, OPERATOR_FIELDS),
    }
}

/// Ranks raw station records by distance from a reference point.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StationRanker {
    extractor: CoordinateExtractor,
}

impl StationRanker {
    /// Creates a ranker that resolves coordinates with `extractor`.
    #[must_use]
    pub const fn new(extractor: CoordinateExtractor) -> Self {
        Self { extractor }
    }

    /// The coordinate extractor used for every record.
    #[must_use]
    pub const fn extractor(&self) -> &CoordinateExtractor {
        &self.extractor
    }

    /// Returns the `limit` stations nearest to `reference`.
    ///
    /// Records without resolvable coordinates are dropped. Equal distances
    /// keep their input order. A `limit` of zero is treated as one.
    #[must_use]
    pub fn rank_nearest(
        &self,
        records: &[Value],
        reference: &GeoPoint,
        limit: usize,
    ) -> RankedResult {
        self.rank_matching(records, reference, limit, |_| true)
    }

    /// Like [`Self::rank_nearest`], keeping only records accepted by
    /// `filter`.
    #[must_use]
    pub fn rank_matching(
        &self,
        records: &[Value],
        reference: &GeoPoint,
        limit: usize,
        filter: impl Fn(&Value) -> bool,
    ) -> RankedResult {
        let mut unresolved = 0_usize;

        let mut entries: Vec<RankedStation> = records
            .iter()
            .filter_map(|record| {
                let Some(coordinates) = self.extractor.extract(record) else {
                    unresolved += 1;
                    return None;
                };
                if !filter(record) {
                    return None;
                }
                Some(RankedStation {
                    distance_km: distance_km(reference, &coordinates),
                    coordinates,
                    station: station_from_record(record, Some(coordinates)),
                })
            })
            .collect();

        if unresolved > 0 {
            log::debug!(
                "Dropped {unresolved} of {} records without plausible coordinates",
                records.len()
            );
        }

        entries.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
        entries.truncate(limit.max(1));

        RankedResult {
            reference: *reference,
            entries,
        }
    }

    /// Normalizes `payload` and ranks its records.
    ///
    /// # Errors
    ///
    /// * [`StationError::EmptyDataset`] if no record array is found.
    /// * [`StationError::NoValidCoordinates`] if records exist but none of
    ///   them resolve to plausible coordinates.
    pub fn rank_dataset(
        &self,
        payload: &Value,
        reference: &GeoPoint,
        limit: usize,
    ) -> Result<RankedResult, StationError> {
        let records = normalize(payload)?;
        let result = self.rank_nearest(records, reference, limit);
        if result.is_empty() {
            return Err(StationError::NoValidCoordinates {
                records: records.len(),
            });
        }
        Ok(result)
    }
}
