//! HTTP and WebSocket surface.
//!
//! Routes:
//! - `GET  /`                        service information
//! - `GET  /health`                  liveness of this process
//! - `GET  /api/status`              ecosystem snapshot
//! - `GET  /api/repositories`        component inventory
//! - `GET  /api/services`            HealthStatus table
//! - `GET  /api/services/{name}`     live query of one service
//! - `POST /api/deploy/{component}`  deployment acknowledgement
//! - `GET  /ws`                      push channel

pub mod handlers;
pub mod websocket;

use crate::status::Aggregator;
use anyhow::{Context, Result};
use axum::routing::{get, post};
use axum::Router;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

pub fn router(aggregator: Arc<Aggregator>) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/api/status", get(handlers::status))
        .route("/api/repositories", get(handlers::repositories))
        .route("/api/services", get(handlers::services))
        .route("/api/services/{name}", get(handlers::service_detail))
        .route("/api/deploy/{component}", post(handlers::deploy))
        .route("/ws", get(websocket::websocket_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(aggregator)
}

/// Bind the configured address and serve until SIGINT/SIGTERM.
pub async fn serve(aggregator: Arc<Aggregator>) -> Result<()> {
    let addr = aggregator.config().bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    serve_until(listener, aggregator, shutdown_signal()).await
}

/// Serve on an already bound listener until `shutdown` resolves.
///
/// In-flight requests are allowed to finish before this returns.
pub async fn serve_until<F>(
    listener: TcpListener,
    aggregator: Arc<Aggregator>,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(aggregator))
        .with_graceful_shutdown(shutdown)
        .await
        .context("HTTP server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Cannot listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Cannot listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, draining connections");
}
