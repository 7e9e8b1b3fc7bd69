#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the station finder.
//!
//! Every ranking request fetches the dataset fresh, ranks it and applies
//! the result to a shared map [`Session`]. The session lock is only held
//! while starting and finishing a reload, never across the fetch, so a
//! slow upstream does not block `/api/session` readers. When two reloads
//! overlap, the older one is answered with `409 Conflict`.

mod handlers;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use station_finder_server_models::ApiError;
use station_finder_session::Session;
use station_finder_source::{DatasetDefinition, SourceError};
use tokio::sync::Mutex;

/// Shared application state.
pub struct AppState {
    /// Dataset every request ranks.
    pub dataset: DatasetDefinition,
    /// HTTP client for dataset fetches.
    pub client: reqwest::Client,
    /// Map session updated by every reload.
    pub session: Mutex<Session>,
}

impl AppState {
    /// State for `dataset` with a fresh session.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the HTTP client cannot be built.
    pub fn new(dataset: DatasetDefinition) -> Result<Self, SourceError> {
        Ok(Self {
            session: Mutex::new(Session::new(dataset.clone())),
            client: station_finder_source::http_client()?,
            dataset,
        })
    }
}

/// Registers the `/api` routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::QueryConfig::default().error_handler(|err, _req| {
        let body = ApiError::bad_request(err.to_string());
        actix_web::error::InternalError::from_response(
            err,
            actix_web::HttpResponse::BadRequest().json(body),
        )
        .into()
    }))
    .service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/datasets", web::get().to(handlers::datasets))
            .route("/session", web::get().to(handlers::session))
            .route("/stations/nearest", web::get().to(handlers::nearest))
            .route("/stations/search", web::get().to(handlers::search)),
    );
}

/// Starts the station finder API server for `dataset`.
///
/// Binds to `BIND_ADDR` (default `127.0.0.1`) and `PORT` (default `8080`).
/// This is a regular async function; the caller provides the async
/// runtime (e.g. via `#[actix_web::main]`) and initializes logging.
///
/// # Errors
///
/// Returns an `std::io::Result` error if the HTTP client cannot be built,
/// the HTTP server fails to bind or encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server(dataset: DatasetDefinition) -> std::io::Result<()> {
    log::info!("Serving dataset {} ({})", dataset.id, dataset.name);

    let state = web::Data::new(AppState::new(dataset).map_err(std::io::Error::other)?);

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
