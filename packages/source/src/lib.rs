#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Station dataset definitions and loading.
//!
//! Each dataset is described by a TOML file under `datasets/` (see
//! [`registry`]). A [`DatasetDefinition`] knows where to fetch its JSON,
//! which reference point and result limit to use and which regional box
//! coordinates must fall into. Loading a dataset fetches it fresh, then
//! hands the payload to the normalize/rank pipeline in
//! [`station_finder_station`].

pub mod dataset;
pub mod registry;
pub mod retry;

use station_finder_station::StationError;

pub use dataset::{DatasetLoader, parse_dataset_toml};
pub use station_finder_source_models::{DatasetDefinition, ErrorKind, ReferencePoint};

/// User agent sent with every dataset request.
const USER_AGENT: &str = concat!("station_finder/", env!("CARGO_PKG_VERSION"));

/// Errors that can occur while loading and ranking a dataset.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// HTTP request failed (connection, timeout, body read).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status {
        /// Response status code.
        status: u16,
        /// Requested URL.
        url: String,
    },

    /// The response body is not valid JSON.
    #[error("Malformed payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),

    /// The payload parsed but could not be ranked.
    #[error(transparent)]
    Station(#[from] StationError),

    /// A dataset definition is invalid or unknown.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of what went wrong.
        message: String,
    },
}

impl SourceError {
    /// The category of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Http(_) | Self::Status { .. } => ErrorKind::NetworkError,
            Self::MalformedPayload(_) => ErrorKind::MalformedPayloadError,
            Self::Station(StationError::EmptyDataset) => ErrorKind::EmptyDatasetError,
            Self::Station(StationError::NoValidCoordinates { .. }) => {
                ErrorKind::NoValidCoordinatesError
            }
            Self::Config { .. } => ErrorKind::ConfigError,
        }
    }

    /// Whether repeating the same request may succeed.
    ///
    /// Timeouts, connection failures, HTTP 429 and 5xx are transient.
    /// Client errors and payload problems are not.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(e) => retry::is_transient(e),
            Self::Status { status, .. } => retry::is_retryable_status(*status),
            Self::MalformedPayload(_) | Self::Station(_) | Self::Config { .. } => false,
        }
    }

    /// Message suitable for showing to an end user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Http(e) if e.is_timeout() => {
                "The station data server did not answer in time. Please try again.".to_string()
            }
            Self::Http(_) => {
                "Could not reach the station data server. Please try again.".to_string()
            }
            Self::Status { status, .. } if self.is_retryable() => {
                format!("The station data server is unavailable (HTTP {status}). Please try again.")
            }
            Self::Status { status, .. } => {
                format!("The station data request was rejected (HTTP {status}).")
            }
            Self::MalformedPayload(_) => {
                "The station data could not be read: the response is not valid JSON.".to_string()
            }
            Self::Station(StationError::EmptyDataset) => {
                "No stations were found in the data.".to_string()
            }
            Self::Station(StationError::NoValidCoordinates { .. }) => {
                "No station in the data has valid coordinates.".to_string()
            }
            Self::Config { message } => format!("Invalid configuration: {message}"),
        }
    }
}

/// Builds the HTTP client shared by all dataset requests.
///
/// Timeouts are applied per request from each dataset's configuration.
///
/// # Errors
///
/// Returns [`SourceError::Http`] if the TLS backend cannot be initialised.
pub fn http_client() -> Result<reqwest::Client, SourceError> {
    Ok(reqwest::Client::builder().user_agent(USER_AGENT).build()?)
}

/// Parses a JSON payload read from somewhere other than HTTP (e.g. a
/// local file).
///
/// # Errors
///
/// Returns [`SourceError::MalformedPayload`] if `text` is not JSON.
pub fn parse_payload(text: &str) -> Result<serde_json::Value, SourceError> {
    Ok(serde_json::from_str(text)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn station_errors_map_to_distinct_kinds() {
        let empty = SourceError::from(StationError::EmptyDataset);
        let invalid = SourceError::from(StationError::NoValidCoordinates { records: 3 });
        assert_eq!(empty.kind(), ErrorKind::EmptyDatasetError);
        assert_eq!(invalid.kind(), ErrorKind::NoValidCoordinatesError);
        assert_ne!(empty.user_message(), invalid.user_message());
        assert!(!empty.is_retryable());
    }

    #[test]
    fn server_errors_are_retryable_client_errors_are_not() {
        let unavailable = SourceError::Status {
            status: 503,
            url: "http://example.test".to_string(),
        };
        let throttled = SourceError::Status {
            status: 429,
            url: "http://example.test".to_string(),
        };
        let missing = SourceError::Status {
            status: 404,
            url: "http://example.test".to_string(),
        };
        assert!(unavailable.is_retryable());
        assert!(throttled.is_retryable());
        assert!(!missing.is_retryable());
        assert_eq!(missing.kind(), ErrorKind::NetworkError);
        assert!(unavailable.user_message().contains("try again"));
        assert!(!missing.user_message().contains("try again"));
    }

    #[test]
    fn parse_payload_reports_malformed_json() {
        let err = parse_payload("<html>oops</html>").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedPayloadError);
        assert!(parse_payload(r#"{"features": []}"#).is_ok());
    }
}
