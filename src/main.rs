//! Domain-Masking Reverse Proxy
//!
//! A transparent reverse proxy that fronts a single fixed origin, rewriting
//! traffic in both directions so clients only ever see the proxy's own
//! hostname and scheme.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌───────────────────────────────────────────────┐
//!                    │                MASKING PROXY                  │
//!                    │                                               │
//!   Client Request   │  ┌─────────┐    ┌───────────┐                 │
//!   ─────────────────┼─▶│  http   │───▶│  request  │────────────────▶│──── Origin
//!                    │  │ server  │    │ rewriter  │  (origin call)  │     Server
//!                    │  └─────────┘    └───────────┘                 │
//!                    │                                               │
//!   Client Response  │  ┌─────────┐    ┌───────────┐    ┌─────────┐  │
//!   ◀────────────────┼──│  body   │◀───│  cookies  │◀───│ response│◀─│────
//!                    │  │rewriter │    │ rewriter  │    │ headers │  │
//!                    │  └─────────┘    └───────────┘    └─────────┘  │
//!                    │                                               │
//!                    │  ┌─────────────────────────────────────────┐  │
//!                    │  │  config  ·  lifecycle  ·  observability │  │
//!                    │  └─────────────────────────────────────────┘  │
//!                    └───────────────────────────────────────────────┘
//! ```

// Core subsystems
pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;

use std::path::Path;

use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ProxyConfig;
use crate::http::HttpServer;
use crate::lifecycle::Shutdown;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "masking_proxy=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("masking-proxy v0.1.0 starting");

    // Optional config file path as the sole argument; defaults otherwise.
    let config = match std::env::args().nth(1) {
        Some(path) => config::loader::load_config(Path::new(&path))?,
        None => ProxyConfig::default(),
    };

    tracing::info!(
        bind_address = %config.listener.bind_address,
        origin = %config.origin.base(),
        "Configuration loaded"
    );

    // Bind TCP listener
    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let local_addr = listener.local_addr()?;

    tracing::info!(
        address = %local_addr,
        "Listening for connections"
    );

    let shutdown = Shutdown::new();
    let shutdown_rx = shutdown.subscribe();
    tokio::spawn(async move {
        lifecycle::signals::wait_for_shutdown_signal().await;
        shutdown.trigger();
    });

    // Create and run HTTP server
    let server = HttpServer::new(config)?;
    server.run(listener, shutdown_rx).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
