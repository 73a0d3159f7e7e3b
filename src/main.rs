//! # Smart AI Keyboard relay
//!
//! Binary entry point: load configuration, build state, serve until signalled.

use keyboard_relay::{create_router, shutdown_signal, AppState, Config};
use std::net::SocketAddr;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse configuration from CLI args and .env file
    let config = Config::parse_args();

    let state = AppState::new(config.clone())?;
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;

    info!("Smart AI Proxy Server running on port {}", config.port);
    info!("Provider: OpenRouter");
    info!("Model: {}", config.model);
    info!("Upstream: {}", config.safe_base_url());
    info!("Health check: http://localhost:{}/health", config.port);

    // Peer addresses key the rate limiter.
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}
