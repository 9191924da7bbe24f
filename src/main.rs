//! Trace Epoch - HTTP host for the trace-epoch correlation cache
//!
//! Serves trace id adjustment, health and stats over HTTP.

use std::net::SocketAddr;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use trace_epoch::api::{create_router, AppState};
use trace_epoch::{Config, TraceIdProcessor};

/// Main entry point for the trace-epoch host.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Build the processor and start its cache
/// 4. Serve the HTTP API on the configured port
/// 5. Stop the cache on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trace_epoch=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting trace epoch host");

    let config = Config::from_env();
    info!(
        "Configuration loaded: cache_endpoint={}, cache_ttl={}s, cache_timeout={}ms, port={}",
        config.cache_endpoint, config.cache_ttl, config.cache_timeout_ms, config.server_port
    );

    let processor = TraceIdProcessor::new(&config).context("failed to build trace id processor")?;
    processor.start().await.context("failed to start cache")?;
    info!(
        "Cache started: backend={}, ttl={}s",
        processor.cache_kind().as_str(),
        processor.cache_ttl()
    );

    let state = AppState::new(processor);
    let app = create_router(state.clone());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    if let Err(err) = state.processor.shutdown().await {
        warn!("Cache shutdown failed: {}", err);
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!("Failed to install SIGTERM handler: {}", err);
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
