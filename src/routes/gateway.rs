//! Gateway Routes
//!
//! Defines the routing structure for the session and proxy endpoints:
//! - /api/auth/* - OAuth login, refresh, logout, password reset
//! - /oauth/:provider - the pre-registered OAuth callback
//! - /api/proxy/* - the authenticated proxy surface
//! - /api/images/upload - the multipart proxy variant

use axum::{
    routing::{any, get, patch, post},
    Router,
};
use std::sync::Arc;

use crate::config::AppState;
use crate::handlers::{auth, proxy};

/// Create the gateway router
pub fn create_router() -> Router<Arc<AppState>> {
    let api_routes = Router::new()
        .route("/auth/refresh", post(auth::refresh))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/reset-password", patch(auth::reset_password))
        .route(
            "/auth/send-reset-password-email",
            post(auth::send_reset_password_email),
        )
        // Static /auth segments take priority over the provider parameter
        .route("/auth/:provider", get(auth::login))
        .route("/images/upload", post(proxy::upload_image))
        .route("/proxy/*path", any(proxy::forward));

    Router::new()
        .nest("/api", api_routes)
        .route("/oauth/:provider", get(auth::oauth_callback))
}
