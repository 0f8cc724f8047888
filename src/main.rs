//! Activation key service - Main Application Entry Point
//!
//! # Startup Flow
//!
//! 1. Load configuration from environment variables
//! 2. Open the data directory and validate every record set
//! 3. Build HTTP router with routes and middleware
//! 4. Start server on configured port
//!
//! Any failure before the server is listening exits with a non-zero status.

use keybind_server::{config, state::AppState, store::Store};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging with tracing subscriber. Reads RUST_LOG environment variable (defaults to "info" level)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = config::Config::from_env()?;
    tracing::info!("Configuration loaded");

    // A malformed record set stops startup here
    let store = Store::open(&config.data_dir)?;
    tracing::info!(dir = %store.dir().display(), "Store opened");

    let app = keybind_server::app(AppState::from_config(&config, store));

    let addr = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
