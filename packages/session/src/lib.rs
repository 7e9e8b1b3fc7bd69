#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Map session state.
//!
//! A [`Session`] is what a map front end renders: the current ranked
//! result, one marker per station plus the reference marker, and the map
//! view. Results are applied wholesale, so markers from a previous load
//! never linger.
//!
//! Loads are started with [`Session::begin_reload`] and finished with
//! [`Session::complete_reload`]. Each ticket carries a generation number;
//! finishing a ticket that a newer reload has overtaken leaves the session
//! untouched.

use station_finder_source::{DatasetDefinition, SourceError};
use station_finder_station_models::{GeoPoint, RankedResult, RankedStation};

pub use station_finder_session_models::{MapView, Marker, MarkerKind, SessionError, SessionSnapshot};

/// Zoom level of a fresh session, centered on the reference point.
pub const INITIAL_ZOOM: u8 = 13;

/// Minimum zoom after focusing a station.
pub const FOCUS_ZOOM: u8 = 14;

/// Padding ratio applied to the result bounds when fitting the map.
pub const FIT_PADDING: f64 = 0.2;

/// Label used for the reference marker when the ranking was requested for
/// a point other than the dataset's configured reference.
pub const CUSTOM_REFERENCE_NAME: &str = "Selected location";

fn session_error(error: &SourceError) -> SessionError {
    SessionError {
        message: error.user_message(),
        kind: error.kind(),
        retryable: error.is_retryable(),
    }
}

/// Proof that a reload was started. Hand it back to
/// [`Session::complete_reload`].
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReloadTicket {
    generation: u64,
}

impl ReloadTicket {
    /// Generation this reload belongs to.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }
}

/// What [`Session::complete_reload`] did with a load outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadOutcome {
    /// The result replaced the previous one.
    Applied,
    /// The load failed; the error was recorded and the previous result kept.
    Failed,
    /// A newer reload was started; the outcome was discarded.
    Superseded,
}

/// Map session for one dataset.
#[derive(Debug, Clone)]
pub struct Session {
    dataset: DatasetDefinition,
    result: Option<RankedResult>,
    markers: Vec<Marker>,
    view: MapView,
    generation: u64,
    last_error: Option<SessionError>,
}

impl Session {
    /// A fresh session showing only the reference marker.
    #[must_use]
    pub fn new(dataset: DatasetDefinition) -> Self {
        let reference = dataset.reference.point;
        let markers = vec![reference_marker(&dataset.reference.name, reference)];
        Self {
            dataset,
            result: None,
            markers,
            view: MapView {
                center: reference,
                zoom: INITIAL_ZOOM,
                fit_bounds: None,
            },
            generation: 0,
            last_error: None,
        }
    }

    #[must_use]
    pub const fn dataset(&self) -> &DatasetDefinition {
        &self.dataset
    }

    /// The currently rendered result, if any load has succeeded.
    #[must_use]
    pub const fn result(&self) -> Option<&RankedResult> {
        self.result.as_ref()
    }

    /// Reference marker first, then one marker per ranked station.
    #[must_use]
    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    #[must_use]
    pub const fn view(&self) -> &MapView {
        &self.view
    }

    /// Generation of the most recently started reload.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub const fn last_error(&self) -> Option<&SessionError> {
        self.last_error.as_ref()
    }

    /// Starts a reload, superseding any reload still in flight.
    pub fn begin_reload(&mut self) -> ReloadTicket {
        self.generation += 1;
        ReloadTicket {
            generation: self.generation,
        }
    }

    /// Whether `ticket` belongs to the most recently started reload.
    #[must_use]
    pub const fn is_current(&self, ticket: &ReloadTicket) -> bool {
        ticket.generation == self.generation
    }

    /// Finishes a reload.
    ///
    /// A successful result replaces the ranked result, all markers and the
    /// fitted view. A failure is recorded in [`Self::last_error`] and the
    /// previous result stays on screen. Either way nothing changes if a
    /// newer reload has started since `ticket` was issued.
    pub fn complete_reload(
        &mut self,
        ticket: ReloadTicket,
        outcome: Result<RankedResult, SourceError>,
    ) -> ReloadOutcome {
        if !self.is_current(&ticket) {
            log::debug!(
                "Discarding reload {} (current is {})",
                ticket.generation,
                self.generation
            );
            return ReloadOutcome::Superseded;
        }

        match outcome {
            Ok(result) => {
                self.apply(result);
                ReloadOutcome::Applied
            }
            Err(e) => {
                log::warn!("Reload {} failed: {e}", ticket.generation);
                self.last_error = Some(session_error(&e));
                ReloadOutcome::Failed
            }
        }
    }

    /// Centers the map on the station at `index` in the ranked list,
    /// zooming in to at least [`FOCUS_ZOOM`], and returns its marker.
    pub fn focus(&mut self, index: usize) -> Option<&Marker> {
        let marker = self
            .markers
            .iter()
            .filter(|m| m.kind == MarkerKind::Station)
            .nth(index)?;
        self.view = MapView {
            center: marker.position,
            zoom: self.view.zoom.max(FOCUS_ZOOM),
            fit_bounds: None,
        };
        Some(marker)
    }

    /// Owned copy of the current state, for serialization.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        let reference_name = self
            .result
            .as_ref()
            .map_or(self.dataset.reference.name.as_str(), |r| self.reference_name(r))
            .to_string();
        SessionSnapshot {
            dataset: self.dataset.clone(),
            generation: self.generation,
            result: self.result.clone(),
            reference_name,
            markers: self.markers.clone(),
            view: self.view,
            last_error: self.last_error.clone(),
        }
    }

    /// Display name of the point `result` was ranked from.
    #[must_use]
    pub fn reference_name(&self, result: &RankedResult) -> &str {
        if result.reference == self.dataset.reference.point {
            &self.dataset.reference.name
        } else {
            CUSTOM_REFERENCE_NAME
        }
    }

    fn apply(&mut self, result: RankedResult) {
        let reference_name = self.reference_name(&result).to_string();

        let mut markers = Vec::with_capacity(result.len() + 1);
        markers.push(reference_marker(&reference_name, result.reference));
        markers.extend(
            result
                .entries
                .iter()
                .map(|entry| station_marker(entry, &reference_name)),
        );

        let fit_bounds = (!result.is_empty()).then(|| result.bounds().pad(FIT_PADDING));
        let center = fit_bounds
            .and_then(|b| b.center())
            .unwrap_or(result.reference);

        log::debug!(
            "Applied {} stations (generation {})",
            result.len(),
            self.generation
        );

        self.markers = markers;
        self.view = MapView {
            center,
            zoom: self.view.zoom,
            fit_bounds,
        };
        self.result = Some(result);
        self.last_error = None;
    }
}

fn reference_marker(name: &str, position: GeoPoint) -> Marker {
    Marker {
        kind: MarkerKind::Reference,
        position,
        label: name.to_string(),
        popup: format!("{name} (reference)"),
    }
}

/// Popup text: name, address and distance, one per line.
#[must_use]
pub fn station_popup(entry: &RankedStation, reference_name: &str) -> String {
    format!(
        "{}\n{}\n{:.2} km from {reference_name}",
        entry.station.name,
        entry.station.address.as_deref().unwrap_or_default(),
        entry.distance_km,
    )
}

fn station_marker(entry: &RankedStation, reference_name: &str) -> Marker {
    Marker {
        kind: MarkerKind::Station,
        position: entry.coordinates,
        label: entry.station.name.clone(),
        popup: station_popup(entry, reference_name),
    }
}

#[cfg(test)]
mod tests {
    use station_finder_source::{ErrorKind, parse_dataset_toml};
    use station_finder_station::StationError;
    use station_finder_station_models::Station;

    use super::*;

    fn dataset() -> DatasetDefinition {
        parse_dataset_toml(
            r#"
            id = "test"
            name = "Test"
            url = "http://localhost/stations.json"

            [reference]
            name = "Winterthur"
            latitude = 47.4988
            longitude = 8.7237
            "#,
        )
        .unwrap()
    }

    fn reference() -> GeoPoint {
        GeoPoint::new(47.4988, 8.7237).unwrap()
    }

    fn entry(
        name: &str,
        address: Option<&str>,
        lat: f64,
        lon: f64,
        distance_km: f64,
    ) -> RankedStation {
        let coordinates = GeoPoint::new(lat, lon).unwrap();
        RankedStation {
            station: Station {
                name: name.to_string(),
                address: address.map(str::to_string),
                coordinates: Some(coordinates),
                power_kw: None,
                operator: None,
            },
            coordinates,
            distance_km,
        }
    }

    fn result(names: &[&str]) -> RankedResult {
        RankedResult {
            reference: reference(),
            entries: names
                .iter()
                .enumerate()
                .map(|(i, name)| {
                    let offset = 0.01 * f64::from(u32::try_from(i + 1).unwrap());
                    entry(name, Some("Street 1"), 47.4988 + offset, 8.7237, offset * 111.2)
                })
                .collect(),
        }
    }

    fn station_labels(session: &Session) -> Vec<&str> {
        session
            .markers()
            .iter()
            .filter(|m| m.kind == MarkerKind::Station)
            .map(|m| m.label.as_str())
            .collect()
    }

    #[test]
    fn new_session_shows_reference_at_initial_zoom() {
        let session = Session::new(dataset());
        assert_eq!(session.markers().len(), 1);
        assert_eq!(session.markers()[0].kind, MarkerKind::Reference);
        assert_eq!(session.markers()[0].popup, "Winterthur (reference)");
        assert_eq!(session.view().center, reference());
        assert_eq!(session.view().zoom, INITIAL_ZOOM);
        assert!(session.view().fit_bounds.is_none());
        assert!(session.result().is_none());
    }

    #[test]
    fn applied_result_replaces_all_markers() {
        let mut session = Session::new(dataset());

        let ticket = session.begin_reload();
        assert_eq!(
            session.complete_reload(ticket, Ok(result(&["A", "B", "C"]))),
            ReloadOutcome::Applied
        );
        assert_eq!(station_labels(&session), vec!["A", "B", "C"]);

        let ticket = session.begin_reload();
        session.complete_reload(ticket, Ok(result(&["D"])));
        assert_eq!(station_labels(&session), vec!["D"]);
        assert_eq!(session.markers().len(), 2);
        assert_eq!(session.markers()[0].kind, MarkerKind::Reference);
    }

    #[test]
    fn view_fits_padded_result_bounds() {
        let mut session = Session::new(dataset());
        let ticket = session.begin_reload();
        let res = result(&["A", "B"]);
        let expected = res.bounds().pad(FIT_PADDING);
        session.complete_reload(ticket, Ok(res));
        assert_eq!(session.view().fit_bounds, Some(expected));
        assert_eq!(session.view().center, expected.center().unwrap());
    }

    #[test]
    fn popup_shows_name_address_and_two_decimal_distance() {
        let popup = station_popup(
            &entry("Parkhaus", Some("Museumstrasse 2"), 47.5, 8.72, 1.23456),
            "Winterthur",
        );
        assert_eq!(popup, "Parkhaus\nMuseumstrasse 2\n1.23 km from Winterthur");

        let no_address = station_popup(&entry("Hof", None, 47.5, 8.72, 0.5), "Winterthur");
        assert_eq!(no_address, "Hof\n\n0.50 km from Winterthur");
    }

    #[test]
    fn custom_reference_is_labelled() {
        let mut session = Session::new(dataset());
        let mut res = result(&["A"]);
        res.reference = GeoPoint::new(47.3769, 8.5417).unwrap();
        let ticket = session.begin_reload();
        session.complete_reload(ticket, Ok(res));
        let reference = &session.markers()[0];
        assert_eq!(reference.popup, format!("{CUSTOM_REFERENCE_NAME} (reference)"));
        assert!(session.markers()[1].popup.ends_with(CUSTOM_REFERENCE_NAME));
    }

    #[test]
    fn failure_keeps_previous_result() {
        let mut session = Session::new(dataset());
        let ticket = session.begin_reload();
        session.complete_reload(ticket, Ok(result(&["A"])));

        let ticket = session.begin_reload();
        let outcome = session.complete_reload(ticket, Err(StationError::EmptyDataset.into()));
        assert_eq!(outcome, ReloadOutcome::Failed);
        assert_eq!(station_labels(&session), vec!["A"]);
        let error = session.last_error().unwrap();
        assert_eq!(error.kind, ErrorKind::EmptyDatasetError);
        assert!(!error.retryable);

        let ticket = session.begin_reload();
        session.complete_reload(ticket, Ok(result(&["B"])));
        assert!(session.last_error().is_none());
    }

    #[test]
    fn stale_reload_is_discarded() {
        let mut session = Session::new(dataset());
        let slow = session.begin_reload();
        let fast = session.begin_reload();
        assert!(!session.is_current(&slow));

        assert_eq!(
            session.complete_reload(fast, Ok(result(&["fresh"]))),
            ReloadOutcome::Applied
        );
        assert_eq!(
            session.complete_reload(slow, Ok(result(&["stale"]))),
            ReloadOutcome::Superseded
        );
        assert_eq!(station_labels(&session), vec!["fresh"]);

        let late = session.begin_reload();
        let _newer = session.begin_reload();
        let outcome = session.complete_reload(late, Err(StationError::EmptyDataset.into()));
        assert_eq!(outcome, ReloadOutcome::Superseded);
        assert!(session.last_error().is_none());
    }

    #[test]
    fn focus_zooms_in_to_at_least_fourteen() {
        let mut session = Session::new(dataset());
        let ticket = session.begin_reload();
        session.complete_reload(ticket, Ok(result(&["A", "B"])));

        let marker = session.focus(1).unwrap().clone();
        assert_eq!(marker.label, "B");
        assert_eq!(session.view().center, marker.position);
        assert_eq!(session.view().zoom, FOCUS_ZOOM);
        assert!(session.view().fit_bounds.is_none());

        session.view.zoom = 17;
        session.focus(0);
        assert_eq!(session.view().zoom, 17);

        assert!(session.focus(5).is_none());
    }

    #[test]
    fn empty_result_centers_on_reference() {
        let mut session = Session::new(dataset());
        let ticket = session.begin_reload();
        session.complete_reload(ticket, Ok(result(&[])));
        assert_eq!(session.markers().len(), 1);
        assert!(session.view().fit_bounds.is_none());
        assert_eq!(session.view().center, reference());
    }

    #[test]
    fn snapshot_copies_current_state() {
        let mut session = Session::new(dataset());
        let fresh = session.snapshot();
        assert_eq!(fresh.reference_name, "Winterthur");
        assert!(fresh.result.is_none());
        assert_eq!(fresh.markers.len(), 1);

        let mut res = result(&["A", "B"]);
        res.reference = GeoPoint::new(47.3769, 8.5417).unwrap();
        let ticket = session.begin_reload();
        session.complete_reload(ticket, Ok(res));

        let snapshot = session.snapshot();
        assert_eq!(snapshot.generation, 1);
        assert_eq!(snapshot.reference_name, CUSTOM_REFERENCE_NAME);
        assert_eq!(snapshot.result.as_ref().map(RankedResult::len), Some(2));
        assert_eq!(snapshot.markers, session.markers());
        assert_eq!(snapshot.view, *session.view());
        assert!(snapshot.last_error.is_none());
    }
}
