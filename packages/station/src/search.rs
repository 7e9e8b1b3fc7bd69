//! Free-text station search.
//!
//! Matches a place-name query case-insensitively against every field
//! consulted for a station's name, address and operator, then ranks the
//! matches by distance like [`StationRanker::rank_nearest`].

use serde_json::Value;
use station_finder_station_models::{GeoPoint, RankedResult};

use crate::rank::{ADDRESS_FIELDS, NAME_FIELDS, OPERATOR_FIELDS, first_text};
use crate::{StationError, StationRanker, normalize};

/// Whether `record` matches `query`: a case-insensitive substring of any
/// of the [`NAME_FIELDS`], [`ADDRESS_FIELDS`] or [`OPERATOR_FIELDS`], not
/// only the one picked for display. A blank query matches everything.
#[must_use]
pub fn matches_query(record: &Value, query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    NAME_FIELDS
        .iter()
        .chain(ADDRESS_FIELDS)
        .chain(OPERATOR_FIELDS)
        .filter_map(|field| first_text(record, &[*field]))
        .any(|text| text.to_lowercase().contains(&needle))
}

/// Returns the `limit` stations matching `query`, nearest first.
#[must_use]
pub fn search(
    ranker: &StationRanker,
    records: &[Value],
    query: &str,
    reference: &GeoPoint,
    limit: usize,
) -> RankedResult {
    ranker.rank_matching(records, reference, limit, |record| {
        matches_query(record, query)
    })
}

/// Normalizes `payload` and searches its records.
///
/// An empty result is not an error as long as some records resolve.
///
/// # Errors
///
/// * [`StationError::EmptyDataset`] if no record array is found.
/// * [`StationError::NoValidCoordinates`] if no record resolves to
///   plausible coordinates.
pub fn search_dataset(
    ranker: &StationRanker,
    payload: &Value,
    query: &str,
    reference: &GeoPoint,
    limit: usize,
) -> Result<RankedResult, StationError> {
    let records = normalize(payload)?;
    let result = search(ranker, records, query, reference, limit);
    if result.is_empty()
        && !records
            .iter()
            .any(|r| ranker.extractor().extract(r).is_some())
    {
        return Err(StationError::NoValidCoordinates {
            records: records.len(),
        });
    }
    Ok(result)
}
