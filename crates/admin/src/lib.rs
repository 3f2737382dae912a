//! Dispatch admin console library.
//!
//! This crate provides the console functionality as a library, allowing
//! it to be tested and reused.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod authn;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;

use axum::{Router, routing::get};

use crate::state::AppState;

/// Build the full application router over the given state.
///
/// Shared between the binary and the integration tests so both exercise
/// the same middleware ordering.
#[must_use]
pub fn app(state: AppState) -> Router {
    let session_layer = middleware::create_session_layer(state.config());

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes::routes())
        .layer(session_layer)
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Verifies the document store answers before returning OK. Returns 503
/// Service Unavailable if it does not.
async fn readiness(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> axum::http::StatusCode {
    match state.personnel().list().await {
        Ok(_) => axum::http::StatusCode::OK,
        Err(_) => axum::http::StatusCode::SERVICE_UNAVAILABLE,
    }
}
