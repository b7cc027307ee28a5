//! Router assembly and the server's run loop, including graceful shutdown.

use std::net::SocketAddr;

use anyhow::{Context, Result};

use super::{http, AppState};

pub fn build_router(state: AppState) -> axum::Router {
    http::router().with_state(state)
}

/// Runs the server until SIGINT/SIGTERM, then tears down every still-live
/// session through the same path `DELETE /game/{id}` uses, so no background
/// worker is ever abandoned mid-flight.
pub async fn run_server(addr: SocketAddr, state: AppState) -> Result<()> {
    let app = build_router(state.clone());

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    tracing::info!(%addr, "gargamel-server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server loop failed")?;

    tracing::info!("shutdown signal received, tearing down live sessions");
    for session in state.registry.list().await {
        crate::session::teardown::teardown(session).await;
    }
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
