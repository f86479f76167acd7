//! Fetch Cache - read-through gateway
//!
//! Serves upstream JSON resources through the TTL-gated cache.

use std::net::SocketAddr;

use anyhow::Context;
use serde_json::Value;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fetch_cache::api::create_router;
use fetch_cache::cache::{CacheStore, FileDurable};
use fetch_cache::upstream::UpstreamClient;
use fetch_cache::{AppState, Config};

/// Main entry point for the gateway.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the cache store, with file-backed durable storage if available
/// 4. Create the upstream client and Axum router
/// 5. Start HTTP server on configured port
/// 6. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fetch_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting fetch cache gateway");

    let config = Config::from_env();
    info!(
        "Configuration loaded: default_ttl={}ms, port={}, upstream={}, persist_writes={}, empty_is_fresh={}",
        config.default_ttl_ms,
        config.server_port,
        config.upstream_url,
        config.persist_writes,
        config.empty_is_fresh
    );

    let durable = config
        .durable_dir
        .clone()
        .map(FileDurable::with_dir)
        .or_else(FileDurable::new);
    let store: CacheStore<Value> = match durable {
        Some(durable) => {
            info!("Durable storage at {}", durable.dir().display());
            CacheStore::with_durable(durable)
        }
        None => {
            warn!("No durable storage directory available, running memory-only");
            CacheStore::new()
        }
    };

    let upstream = UpstreamClient::new(config.upstream_url.clone(), config.upstream_timeout())
        .context("Failed to build upstream HTTP client")?;

    let state = AppState::from_config(&config, store, upstream);
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
