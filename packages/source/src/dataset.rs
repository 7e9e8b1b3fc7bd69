//! TOML-driven dataset definitions.
//!
//! A dataset config names the URL of a station JSON document, the reference
//! point distances are measured from, how many stations to return and the
//! regional box coordinates must fall into:
//!
//! ```toml
//! id = "ch_bfe_charging"
//! name = "Swiss EV charging stations (BFE)"
//! url = "https://data.geo.admin.ch/.../ch.bfe.ladestellen-elektromobilitaet.json"
//! limit = 5
//!
//! [reference]
//! name = "Winterthur"
//! latitude = 47.4988
//! longitude = 8.7237
//!
//! [plausible_region]
//! south = 43.0
//! west = 5.0
//! north = 49.0
//! east = 12.0
//! ```

use std::future::Future;

use serde_json::Value;
use station_finder_source_models::DatasetDefinition;
use station_finder_station::{CoordinateExtractor, StationRanker, search};
use station_finder_station_models::{GeoPoint, RankedResult};

use crate::SourceError;
use crate::retry::{self, RetryPolicy};

/// Parses a dataset definition from TOML.
///
/// # Errors
///
/// Returns [`SourceError::Config`] if the TOML is malformed, a required
/// field is missing or the reference point is out of range.
pub fn parse_dataset_toml(toml_str: &str) -> Result<DatasetDefinition, SourceError> {
    let def: DatasetDefinition =
        toml::de::from_str(toml_str).map_err(|e| SourceError::Config {
            message: e.to_string(),
        })?;
    if def.url.trim().is_empty() {
        return Err(SourceError::Config {
            message: format!("dataset {:?} has an empty url", def.id),
        });
    }
    Ok(def)
}

/// Fetching and ranking for a [`DatasetDefinition`].
pub trait DatasetLoader {
    /// A ranker whose extractor checks plausibility against the dataset's
    /// region.
    fn ranker(&self) -> StationRanker;

    /// Retry policy for fetches.
    fn retry_policy(&self) -> RetryPolicy;

    /// Fetches the dataset JSON fresh from its URL.
    ///
    /// # Errors
    ///
    /// * [`SourceError::Http`] or [`SourceError::Status`] if the request
    ///   fails or returns a non-success status.
    /// * [`SourceError::MalformedPayload`] if the body is not JSON.
    fn fetch(&self, client: &reqwest::Client) -> impl Future<Output = Result<Value, SourceError>>;

    /// Ranks an already-fetched payload.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Station`] if the payload has no records or
    /// none of them resolve to coordinates inside the dataset's region.
    fn rank_payload(
        &self,
        payload: &Value,
        reference: &GeoPoint,
        limit: usize,
    ) -> Result<RankedResult, SourceError>;

    /// Searches an already-fetched payload.
    ///
    /// # Errors
    ///
    /// Same as [`Self::rank_payload`]; a query matching nothing is not an
    /// error.
    fn search_payload(
        &self,
        payload: &Value,
        query: &str,
        reference: &GeoPoint,
        limit: usize,
    ) -> Result<RankedResult, SourceError>;

    /// Fetches the dataset and returns the `limit` stations nearest to
    /// `reference`.
    ///
    /// # Errors
    ///
    /// Any error of [`Self::fetch`] or [`Self::rank_payload`].
    fn load_nearest(
        &self,
        client: &reqwest::Client,
        reference: &GeoPoint,
        limit: usize,
    ) -> impl Future<Output = Result<RankedResult, SourceError>>;

    /// Fetches the dataset and returns the `limit` nearest stations
    /// matching `query`.
    ///
    /// # Errors
    ///
    /// Any error of [`Self::fetch`] or [`Self::search_payload`].
    fn load_search(
        &self,
        client: &reqwest::Client,
        query: &str,
        reference: &GeoPoint,
        limit: usize,
    ) -> impl Future<Output = Result<RankedResult, SourceError>>;
}

impl DatasetLoader for DatasetDefinition {
    fn ranker(&self) -> StationRanker {
        StationRanker::new(CoordinateExtractor::new(self.region()))
    }

    fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries)
    }

    fn fetch(&self, client: &reqwest::Client) -> impl Future<Output = Result<Value, SourceError>> {
        async move {
            log::info!("{}: fetching {}", self.id, self.url);
            let timeout = self.timeout();
            let payload = retry::send_json(
                || {
                    client
                        .get(&self.url)
                        .header(reqwest::header::ACCEPT, "application/json")
                        .timeout(timeout)
                },
                &self.retry_policy(),
            )
            .await?;
            log::debug!("{}: payload received", self.id);
            Ok(payload)
        }
    }

    fn rank_payload(
        &self,
        payload: &Value,
        reference: &GeoPoint,
        limit: usize,
    ) -> Result<RankedResult, SourceError> {
        Ok(self.ranker().rank_dataset(payload, reference, limit)?)
    }

    fn search_payload(
        &self,
        payload: &Value,
        query: &str,
        reference: &GeoPoint,
        limit: usize,
    ) -> Result<RankedResult, SourceError> {
        Ok(search::search_dataset(
            &self.ranker(),
            payload,
            query,
            reference,
            limit,
        )?)
    }

    fn load_nearest(
        &self,
        client: &reqwest::Client,
        reference: &GeoPoint,
        limit: usize,
    ) -> impl Future<Output = Result<RankedResult, SourceError>> {
        async move {
            let payload = self.fetch(client).await?;
            let result = self.rank_payload(&payload, reference, limit)?;
            log::info!("{}: ranked {} nearest stations", self.id, result.len());
            Ok(result)
        }
    }

    fn load_search(
        &self,
        client: &reqwest::Client,
        query: &str,
        reference: &GeoPoint,
        limit: usize,
    ) -> impl Future<Output = Result<RankedResult, SourceError>> {
        async move {
            let payload = self.fetch(client).await?;
            let result = self.search_payload(&payload, query, reference, limit)?;
            log::info!("{}: {} stations match {query:?}", self.id, result.len());
            Ok(result)
        }
    }
}
