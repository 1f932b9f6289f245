//! Health check routes
//!
//! Provides health and liveness endpoints for the gateway. The gateway is
//! stateless, so there is nothing to probe beyond the process itself.

use axum::{http::StatusCode, response::IntoResponse, Json};

use crate::models::HealthResponse;

/// Health check endpoint
///
/// GET /health
pub async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Liveness check endpoint
///
/// GET /live
///
/// Simple liveness probe - returns 200 if the process is running.
pub async fn liveness_check() -> impl IntoResponse {
    (StatusCode::OK, "alive")
}
