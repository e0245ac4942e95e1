//! todo-kv server
//!
//! Serves the todo-list HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # In-memory stores
//! cargo run -p todo-kv-server
//!
//! # Redis (lists in db 1, jobs in db 0)
//! STORE_BACKEND=redis REDIS_URL=redis://localhost:6379/1 cargo run -p todo-kv-server
//! ```

use std::time::Duration;
use todo_kv_server::{Config, TodoApp};
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,todo_kv=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    tracing::info!(
        backend = %config.store.backend,
        workers = config.jobs.workers,
        metrics = config.metrics.enabled,
        "Configuration loaded"
    );

    let app = TodoApp::new(&config).await?;

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app.router())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    drain_jobs(&app, config.shutdown_timeout()).await;
    tracing::info!("Server stopped");
    Ok(())
}

/// Wait for queued jobs, giving up after `timeout`.
async fn drain_jobs(app: &TodoApp, timeout: Duration) {
    if tokio::time::timeout(timeout, app.shutdown()).await.is_err() {
        tracing::warn!(
            timeout_secs = timeout.as_secs(),
            "Job runner did not drain before the shutdown timeout"
        );
    }
}

/// Graceful shutdown signal handler.
///
/// Waits for:
/// - Ctrl+C (SIGINT)
/// - SIGTERM (on unix)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, shutting down gracefully...");
        },
        () = terminate => {
            tracing::info!("Received SIGTERM signal, shutting down gracefully...");
        },
    }
}
