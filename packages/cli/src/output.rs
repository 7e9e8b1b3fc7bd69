//! Plain-text rendering of ranked results.

use std::fmt::Write as _;

use station_finder_source::DatasetDefinition;
use station_finder_station_models::RankedResult;

/// Renders `result` as a numbered list, nearest first:
///
/// ```text
/// Nearest stations to Winterthur:
/// 1. Stadtwerk Winterthur (0.14 km)
///    Bahnhofplatz 1
///    Operator: Stadtwerk Winterthur
///    Power: 22 kW
/// ```
#[must_use]
pub fn render_result(result: &RankedResult, reference_name: &str) -> String {
    let mut out = String::new();

    if result.is_empty() {
        let _ = writeln!(out, "No stations found near {reference_name}.");
        return out;
    }

    let _ = writeln!(out, "Nearest stations to {reference_name}:");
    for (i, entry) in result.entries.iter().enumerate() {
        let station = &entry.station;
        let _ = writeln!(out, "{}. {} ({:.2} km)", i + 1, station.name, entry.distance_km);
        if let Some(address) = &station.address {
            let _ = writeln!(out, "   {address}");
        }
        if let Some(operator) = &station.operator {
            let _ = writeln!(out, "   Operator: {operator}");
        }
        if let Some(power) = station.power_kw {
            let _ = writeln!(out, "   Power: {power} kW");
        }
    }
    out
}

/// Renders the configured datasets, one per line.
#[must_use]
pub fn render_datasets(datasets: &[DatasetDefinition]) -> String {
    let mut out = String::new();
    for def in datasets {
        let _ = writeln!(
            out,
            "{:<20} {} (reference: {}, top {})",
            def.id, def.name, def.reference.name, def.limit
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use station_finder_source::registry;
    use station_finder_station_models::{GeoPoint, RankedStation, Station};

    use super::*;

    fn entry(name: &str, address: Option<&str>, power_kw: Option<f64>, km: f64) -> RankedStation {
        let coordinates = GeoPoint::new(47.5, 8.72).unwrap();
        RankedStation {
            station: Station {
                name: name.to_string(),
                address: address.map(str::to_string),
                coordinates: Some(coordinates),
                power_kw,
                operator: None,
            },
            coordinates,
            distance_km: km,
        }
    }

    #[test]
    fn numbers_entries_with_two_decimal_distances() {
        let result = RankedResult {
            reference: GeoPoint::new(47.4988, 8.7237).unwrap(),
            entries: vec![
                entry("Parkhaus", Some("Museumstrasse 2"), Some(22.0), 0.456),
                entry("Hof", None, None, 1.0),
            ],
        };
        let text = render_result(&result, "Winterthur");
        assert_eq!(
            text,
            "Nearest stations to Winterthur:\n\
             1. Parkhaus (0.46 km)\n   \
             Museumstrasse 2\n   \
             Power: 22 kW\n\
             2. Hof (1.00 km)\n"
        );
    }

    #[test]
    fn empty_result_says_so() {
        let result = RankedResult {
            reference: GeoPoint::new(47.4988, 8.7237).unwrap(),
            entries: Vec::new(),
        };
        assert_eq!(
            render_result(&result, "Winterthur"),
            "No stations found near Winterthur.\n"
        );
    }

    #[test]
    fn lists_bundled_datasets() {
        let text = render_datasets(&registry::all_datasets());
        assert!(text.starts_with(registry::DEFAULT_DATASET_ID));
        assert!(text.contains("reference: Winterthur, top 5"));
    }
}
