//! HTTP surface: one endpoint backed by the process-wide engine.

pub mod handler;
pub mod response;

use anyhow::{Context, Result};
use axum::Router;
use axum::routing::post;
use std::net::SocketAddr;
use std::sync::Arc;

use crate::engine::Engine;
use crate::identity::ProcessIdentity;

/// Process-wide state shared by every request. Built once at init, never replaced.
#[derive(Clone)]
pub struct AppState {
    pub identity: Arc<ProcessIdentity>,
    pub engine: Arc<dyn Engine>,
}

impl AppState {
    pub fn new(identity: ProcessIdentity, engine: Arc<dyn Engine>) -> Self {
        Self {
            identity: Arc::new(identity),
            engine,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", post(handler::compute_pricelist_histories))
        .with_state(state)
}

/// Serve until Ctrl-C or SIGTERM, then drain in-flight requests.
pub async fn serve(state: AppState, bind: SocketAddr) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("failed to bind {bind}"))?;
    tracing::info!(addr = %listener.local_addr()?, "Listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
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
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    tracing::info!("Shutdown signal received");
}
