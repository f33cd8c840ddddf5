//! newshound - HTTP Server Entry Point
//!
//! Starts the HTTP server that exposes the chat API.

use newshound::{api, config::Config};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "newshound=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Missing required keys stop the process here
    let config = Config::from_env()?;
    info!(
        "Loaded configuration: model={}, news_tools={}",
        config.model,
        config.news_api_key.is_some()
    );

    info!(
        "Starting server on {}:{}",
        config.server.host, config.server.port
    );

    api::serve(config).await?;

    Ok(())
}
