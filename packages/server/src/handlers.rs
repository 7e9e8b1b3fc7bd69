//! HTTP handler functions for the station finder API.

use std::future::Future;

use actix_web::{HttpResponse, web};
use station_finder_server_models::{
    ApiDataset, ApiError, ApiHealth, ApiRankedResult, ApiSession, NearestQueryParams,
    SearchQueryParams,
};
use station_finder_session::ReloadOutcome;
use station_finder_source::{DatasetDefinition, DatasetLoader, ErrorKind, SourceError, registry};
use station_finder_station_models::{GeoPoint, RankedResult};

use crate::AppState;

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/datasets`
///
/// Lists all configured datasets.
pub async fn datasets() -> HttpResponse {
    let datasets: Vec<ApiDataset> = registry::all_datasets()
        .iter()
        .map(ApiDataset::from)
        .collect();
    HttpResponse::Ok().json(datasets)
}

/// `GET /api/session`
///
/// Returns the current map session: result, markers, view and last error.
pub async fn session(state: web::Data<AppState>) -> HttpResponse {
    let snapshot = state.session.lock().await.snapshot();
    HttpResponse::Ok().json(ApiSession::from(&snapshot))
}

/// `GET /api/stations/nearest`
///
/// Fetches the dataset and returns the stations nearest to the reference
/// point (the dataset's own, or `lat`/`lon`).
pub async fn nearest(
    state: web::Data<AppState>,
    params: web::Query<NearestQueryParams>,
) -> HttpResponse {
    let reference = match resolve_reference(&state.dataset, params.lat, params.lon) {
        Ok(reference) => reference,
        Err(response) => return response,
    };
    let limit = params.limit.unwrap_or(state.dataset.limit);

    reload(
        &state,
        state.dataset.load_nearest(&state.client, &reference, limit),
    )
    .await
}

/// `GET /api/stations/search`
///
/// Fetches the dataset and returns the nearest stations whose name,
/// address or operator contains `q`.
pub async fn search(
    state: web::Data<AppState>,
    params: web::Query<SearchQueryParams>,
) -> HttpResponse {
    let reference = match resolve_reference(&state.dataset, params.lat, params.lon) {
        Ok(reference) => reference,
        Err(response) => return response,
    };
    let limit = params.limit.unwrap_or(state.dataset.limit);

    reload(
        &state,
        state
            .dataset
            .load_search(&state.client, &params.q, &reference, limit),
    )
    .await
}

/// Runs `load` as a session reload and answers with its outcome.
///
/// The session lock is released while `load` runs.
async fn reload(
    state: &AppState,
    load: impl Future<Output = Result<RankedResult, SourceError>>,
) -> HttpResponse {
    let ticket = state.session.lock().await.begin_reload();
    let outcome = load.await;

    let mut session = state.session.lock().await;
    let response = match &outcome {
        Ok(result) => {
            HttpResponse::Ok().json(ApiRankedResult::new(result, session.reference_name(result)))
        }
        Err(e) => {
            log::error!("Failed to load {}: {e}", state.dataset.id);
            error_response(e)
        }
    };

    match session.complete_reload(ticket, outcome) {
        ReloadOutcome::Applied | ReloadOutcome::Failed => response,
        ReloadOutcome::Superseded => HttpResponse::Conflict().json(ApiError::superseded()),
    }
}

fn resolve_reference(
    dataset: &DatasetDefinition,
    lat: Option<f64>,
    lon: Option<f64>,
) -> Result<GeoPoint, HttpResponse> {
    match (lat, lon) {
        (None, None) => Ok(dataset.reference.point),
        (Some(lat), Some(lon)) => GeoPoint::new(lat, lon).ok_or_else(|| {
            HttpResponse::BadRequest().json(ApiError::bad_request(format!(
                "Coordinates out of range: {lat}, {lon}"
            )))
        }),
        _ => Err(HttpResponse::BadRequest().json(ApiError::bad_request(
            "lat and lon must be given together",
        ))),
    }
}

fn error_response(e: &SourceError) -> HttpResponse {
    let body = ApiError::new(e.user_message(), e.kind(), e.is_retryable());
    match e.kind() {
        ErrorKind::NetworkError => HttpResponse::BadGateway().json(body),
        ErrorKind::MalformedPayloadError
        | ErrorKind::EmptyDatasetError
        | ErrorKind::NoValidCoordinatesError => HttpResponse::UnprocessableEntity().json(body),
        ErrorKind::ConfigError => HttpResponse::InternalServerError().json(body),
    }
}
