//! Taskhub Gateway - session-brokering BFF
//!
//! A Backend-for-Frontend (BFF) gateway for the Taskhub task app. This
//! gateway:
//!
//! - Exchanges OAuth authorization codes for upstream token pairs
//! - Keeps the browser session in HttpOnly cookies with silent refresh
//! - Proxies API calls to the upstream base with bearer injection
//!
//! The browser communicates only with this gateway; bearer tokens never
//! reach client-side script.

use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod handlers;
mod models;
mod routes;
mod services;
mod session;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskhub_gateway=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Taskhub Gateway v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let app_config = config::AppConfig::load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    tracing::info!(
        "Configuration loaded. Server will listen on {}:{}",
        app_config.server.host,
        app_config.server.port
    );

    // Initialize application state
    let state = Arc::new(config::AppState::new(app_config.clone())?);

    // Build CORS layer. The gateway serves the app from its own origin, so
    // this only matters for local dev setups on a separate port.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build the router
    let app = routes::create_app(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start the server
    let addr = SocketAddr::from((
        app_config
            .server
            .host
            .parse::<std::net::IpAddr>()
            .unwrap_or([127, 0, 0, 1].into()),
        app_config.server.port,
    ));

    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
