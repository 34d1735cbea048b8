//! # Cantina POS Server
//!
//! REST API binary: axum routes over the cantina-db engines.
//!
//! ## Startup
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  tracing init ──► config (env) ──► Database::new (pool + migrations)  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  axum::serve on 0.0.0.0:SERVER_PORT, graceful shutdown on Ctrl-C      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod error;
mod routes;

use std::net::SocketAddr;

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::ServerConfig;
use cantina_db::{Database, DbConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing; RUST_LOG overrides the default level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("Starting Cantina POS server...");

    let config = ServerConfig::load()?;
    info!(
        port = config.port,
        database = %config.database_path,
        "Configuration loaded"
    );

    let db = Database::new(DbConfig::new(&config.database_path)).await?;
    info!("Database ready");

    let app = routes::router(db);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!(%addr, "Listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Resolves when the process receives Ctrl-C.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(?e, "Failed to install Ctrl-C handler");
    }
    info!("Shutdown signal received");
}
