//! Gateway server bootstrap.

use std::future::Future;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;

use crate::gateway_routes::{build_herald_router, GatewayState};

#[derive(Debug, Clone, PartialEq, Eq)]
/// Public struct `GatewayServerConfig` used across Herald components.
pub struct GatewayServerConfig {
    /// IP address or resolvable host name.
    pub host: String,
    pub port: u16,
}

/// Serves the ingress routes until `shutdown` resolves.
pub async fn run_herald_gateway<F>(
    config: &GatewayServerConfig,
    state: Arc<GatewayState>,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let host = config.host.trim();
    let listener = TcpListener::bind((host, config.port))
        .await
        .with_context(|| format!("failed to bind herald gateway on {host}:{}", config.port))?;
    let local_addr = listener
        .local_addr()
        .context("failed to resolve bound gateway address")?;
    tracing::info!(addr = %local_addr, chat_id = state.chat_id, "herald gateway listening");

    let app = build_herald_router(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("herald gateway exited unexpectedly")?;
    tracing::info!("herald gateway stopped");
    Ok(())
}
