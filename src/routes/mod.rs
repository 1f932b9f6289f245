//! Routes module
//!
//! Router assembly for the gateway.

pub mod gateway;
pub mod health;

use axum::{routing::get, Router};
use std::sync::Arc;

use crate::config::AppState;

/// Build the full application router
pub fn create_app(state: Arc<AppState>) -> Router {
    Router::new()
        // Health endpoints
        .route("/health", get(health::health_check))
        .route("/live", get(health::liveness_check))
        // Auth + proxy routes
        .merge(gateway::create_router())
        .with_state(state)
}
