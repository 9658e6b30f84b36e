//! EZElectronics server library.
//!
//! This crate provides the REST API as a library, allowing it to be tested
//! and reused by the CLI.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{HeaderValue, Method, Request, StatusCode, header},
    routing::get,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tower_sessions_sqlx_store::SqliteStore;

use config::ServerConfig;
use state::AppState;

/// Errors that prevent the router from being built.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// The session table could not be created.
    #[error("session store error: {0}")]
    SessionStore(#[from] sqlx::Error),

    /// `EZ_CORS_ORIGIN` is not a valid header value.
    #[error("invalid CORS origin: {0}")]
    CorsOrigin(String),
}

fn cors_layer(config: &ServerConfig) -> Result<CorsLayer, StartupError> {
    let origin = HeaderValue::from_str(&config.cors_origin)
        .map_err(|_| StartupError::CorsOrigin(config.cors_origin.clone()))?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE]))
}

/// Build the application router.
///
/// Creates the session table if needed. Domain migrations must already have
/// been applied to the pool.
///
/// # Errors
///
/// Returns an error if the session store cannot be migrated or the CORS
/// origin is invalid.
pub async fn build_app(state: AppState) -> Result<Router, StartupError> {
    let store = SqliteStore::new(state.pool().clone());
    store.migrate().await?;

    let session_layer = middleware::create_session_layer(store, state.config());
    let cors = cors_layer(state.config())?;

    let trace = TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
        tracing::info_span!(
            "request",
            method = %request.method(),
            uri = %request.uri(),
            request_id = tracing::field::Empty,
            username = tracing::field::Empty,
        )
    });

    Ok(Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest(routes::API_PREFIX, routes::routes())
        .layer(session_layer)
        .layer(cors)
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(trace)
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction()))
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cors_layer_rejects_invalid_origin() {
        let mut config = ServerConfig::for_testing();
        config.cors_origin = "http://bad\norigin".to_string();
        assert!(matches!(
            cors_layer(&config),
            Err(StartupError::CorsOrigin(_))
        ));

        config.cors_origin = "http://localhost:5173".to_string();
        assert!(cors_layer(&config).is_ok());
    }
}
