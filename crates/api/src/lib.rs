//! Multiverse API library.
//!
//! This crate provides the catalog HTTP service as a library, allowing it to
//! be tested and reused. The binary in `main.rs` only wires configuration,
//! tracing and Sentry around [`app`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod seed;
pub mod state;

use axum::Router;
use axum::http::{HeaderValue, Method, header};
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use config::{ApiConfig, ConfigError, StorageConfig};
use db::{MemoryCatalogStore, PgCatalogStore};
use seed::SeedError;
use state::AppState;

/// Errors that can occur while building the application state.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("seed error: {0}")]
    Seed(#[from] SeedError),
}

/// Build the router over an application state.
///
/// CORS and Sentry layers are left to the caller.
pub fn app(state: AppState) -> Router {
    routes::routes()
        .layer(axum::middleware::from_fn(
            middleware::request_id_middleware,
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}

/// Connect the catalog store selected by the configuration.
///
/// # Errors
///
/// Returns `StartupError` if the database is unreachable or the demo catalog
/// cannot be loaded.
pub async fn build_state(config: &ApiConfig) -> Result<AppState, StartupError> {
    match &config.storage {
        StorageConfig::Postgres { database_url } => {
            let pool = db::create_pool(database_url).await?;
            tracing::info!("Database pool created");
            Ok(AppState::new(PgCatalogStore::new(pool)))
        }
        StorageConfig::Memory => {
            let store = MemoryCatalogStore::with_demo_catalog().await?;
            Ok(AppState::new(store))
        }
    }
}

/// CORS for the React front end: a single origin when configured, any
/// origin otherwise.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` if the origin is not a valid header value.
pub fn cors_layer(origin: Option<&str>) -> Result<CorsLayer, ConfigError> {
    let Some(origin) = origin else {
        return Ok(CorsLayer::permissive());
    };
    let origin = HeaderValue::from_str(origin).map_err(|e| {
        ConfigError::InvalidEnvVar("MULTIVERSE_CORS_ORIGIN".to_string(), e.to_string())
    })?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cors_origin_must_be_a_header_value() {
        assert!(cors_layer(None).is_ok());
        assert!(cors_layer(Some("http://localhost:5173")).is_ok());
        assert!(cors_layer(Some("bad\norigin")).is_err());
    }
}
