//! HTTP API: the chat endpoint and a health probe.

mod chat;
mod routes;
pub mod types;

pub use routes::{router, AppState};

use std::sync::Arc;

use tracing::info;

use crate::chat::ChatService;
use crate::config::Config;

/// Build the service from configuration and serve until Ctrl-C.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let service = Arc::new(ChatService::from_config(&config)?);
    let state = AppState::new(service, config.server.error_status);
    let app = router(state, config.server.cors_allow_credentials);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
