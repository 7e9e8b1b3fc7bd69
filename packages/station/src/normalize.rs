//! Locates the array of station records inside an arbitrary JSON payload.
//!
//! Upstream mirrors have served the same dataset as a bare array, as a
//! `GeoJSON` `FeatureCollection` and wrapped in ad hoc envelope objects, so
//! the records are searched for rather than read from a fixed path.

use std::collections::BTreeSet;

use serde_json::{Map, Value};

use crate::StationError;

/// Maximum nesting depth searched for a nested record array.
pub const MAX_DEPTH: usize = 32;

/// Maximum number of JSON nodes inspected before giving up.
pub const MAX_NODES: usize = 100_000;

/// Where the records were found in the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetShape {
    /// `GeoJSON` `FeatureCollection` (`{"features": [...]}`).
    FeatureCollection,
    /// The payload itself is the array of records.
    BareArray,
    /// The records were found by searching nested objects.
    Nested {
        /// Dot-separated key path to the array (e.g. `"data.items"`).
        path: String,
    },
}

/// Returns the records of `payload`.
///
/// # Errors
///
/// Returns [`StationError::EmptyDataset`] if no non-empty array of records
/// can be located.
pub fn normalize(payload: &Value) -> Result<&[Value], StationError> {
    let (shape, records) = locate(payload).ok_or(StationError::EmptyDataset)?;
    log::debug!("Located {} records ({shape:?})", records.len());
    Ok(records)
}

/// Locates the records and reports which shape they were found in.
#[must_use]
pub fn locate(payload: &Value) -> Option<(DatasetShape, &[Value])> {
    if let Some(features) = payload.get("features").and_then(Value::as_array)
        && !features.is_empty()
    {
        return Some((DatasetShape::FeatureCollection, features));
    }

    if let Some(records) = payload.as_array()
        && !records.is_empty()
    {
        return Some((DatasetShape::BareArray, records));
    }

    find_nested(payload).map(|(path, records)| (DatasetShape::Nested { path }, records))
}

/// Whether an array holds record-like entries (objects or arrays) rather
/// than bare scalars such as a `bbox`.
fn is_record_array(values: &[Value]) -> bool {
    values.iter().any(|v| v.is_object() || v.is_array())
}

/// Depth-first search for the first non-empty record array under any key.
///
/// Keys are visited in document order and an object is descended into as
/// soon as it is reached, before its later siblings. Nodes are tracked by
/// address so no node is expanded twice, and the walk is capped by
/// [`MAX_DEPTH`] and [`MAX_NODES`].
fn find_nested(root: &Value) -> Option<(String, &[Value])> {
    let object = root.as_object()?;
    let mut walk = Walk::default();
    let mut path = Vec::new();
    let records = walk.search(object, &mut path)?;
    Some((path.join("."), records))
}

#[derive(Default)]
struct Walk {
    visited: BTreeSet<*const Map<String, Value>>,
    exhausted: bool,
}

impl Walk {
    /// Searches `object`, leaving `path` pointing at the returned array.
    fn search<'a>(
        &mut self,
        object: &'a Map<String, Value>,
        path: &mut Vec<&'a str>,
    ) -> Option<&'a [Value]> {
        if self.exhausted || !self.visited.insert(std::ptr::from_ref(object)) {
            return None;
        }
        if self.visited.len() > MAX_NODES {
            log::warn!("Gave up searching for records after {MAX_NODES} nodes");
            self.exhausted = true;
            return None;
        }

        for (key, child) in object {
            path.push(key.as_str());
            if let Some(values) = child.as_array()
                && !values.is_empty()
                && is_record_array(values)
            {
                return Some(values);
            }
            if let Some(inner) = child.as_object()
                && path.len() <= MAX_DEPTH
                && let Some(records) = self.search(inner, path)
            {
                return Some(records);
            }
            path.pop();
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn bare_array_is_returned_unchanged() {
        let payload = json!([{"a": 1}, {"a": 2}]);
        let records = normalize(&payload).unwrap();
        assert_eq!(records, payload.as_array().unwrap().as_slice());
    }

    #[test]
    fn feature_collection_returns_features() {
        let payload = json!({
            "type": "FeatureCollection",
            "bbox": [5.9, 45.8, 10.5, 47.8],
            "features": [{"type": "Feature"}, {"type": "Feature"}]
        });
        let (shape, records) = locate(&payload).unwrap();
        assert_eq!(shape, DatasetShape::FeatureCollection);
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn empty_object_is_an_empty_dataset() {
        assert_eq!(normalize(&json!({})), Err(StationError::EmptyDataset));
    }

    #[test]
    fn empty_array_is_an_empty_dataset() {
        assert_eq!(normalize(&json!([])), Err(StationError::EmptyDataset));
        assert_eq!(
            normalize(&json!({"features": []})),
            Err(StationError::EmptyDataset)
        );
    }

    #[test]
    fn scalars_are_an_empty_dataset() {
        assert_eq!(normalize(&json!("text")), Err(StationError::EmptyDataset));
        assert_eq!(normalize(&json!(null)), Err(StationError::EmptyDataset));
    }

    #[test]
    fn finds_records_in_wrapper_objects() {
        let payload = json!({
            "meta": {"count": 2, "tags": ["ev", "public"]},
            "data": {"stations": {"items": [{"name": "A"}, {"name": "B"}]}}
        });
        let (shape, records) = locate(&payload).unwrap();
        assert_eq!(
            shape,
            DatasetShape::Nested {
                path: "data.stations.items".to_string()
            }
        );
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn nested_search_descends_before_later_siblings() {
        let payload = json!({
            "first": {"inner": {"rows": [{"id": 1}]}},
            "second": [{"id": 2}, {"id": 3}]
        });
        let (shape, records) = locate(&payload).unwrap();
        assert_eq!(
            shape,
            DatasetShape::Nested {
                path: "first.inner.rows".to_string()
            }
        );
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn nested_search_takes_earlier_shallow_array() {
        let payload = json!({
            "items": [{"id": 1}],
            "data": {"rows": [{"id": 2}, {"id": 3}]}
        });
        let (shape, _) = locate(&payload).unwrap();
        assert_eq!(
            shape,
            DatasetShape::Nested {
                path: "items".to_string()
            }
        );
    }

    #[test]
    fn nested_search_descends_depth_first() {
        let payload = json!({
            "a": {"b": {"rows": [{"id": 1}]}},
            "c": {"rows": [{"id": 2}]}
        });
        let (shape, _) = locate(&payload).unwrap();
        assert_eq!(
            shape,
            DatasetShape::Nested {
                path: "a.b.rows".to_string()
            }
        );
    }

    #[test]
    fn empty_features_fall_through_to_nested_search() {
        let payload = json!({"features": [], "result": {"records": [{"id": 1}]}});
        let (shape, records) = locate(&payload).unwrap();
        assert_eq!(
            shape,
            DatasetShape::Nested {
                path: "result.records".to_string()
            }
        );
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn depth_limit_stops_the_search() {
        let mut payload = json!({"rows": [{"id": 1}]});
        for _ in 0..=MAX_DEPTH {
            payload = json!({ "wrap": payload });
        }
        assert_eq!(normalize(&payload), Err(StationError::EmptyDataset));
    }
}
