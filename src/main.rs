use std::sync::Arc;

use anyhow::{Context, Result};
use fieldbot::api::{create_router, AppState};
use fieldbot::command::CommandStore;
use fieldbot::config::load_config_or_default;
use fieldbot::droplog::DropLog;
use fieldbot::status::StatusStore;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fieldbot=info".into()),
        )
        .init();

    info!("Fieldbot coordinator starting...");

    let config_path =
        std::env::var("FIELDBOT_CONFIG").unwrap_or_else(|_| "fieldbot.toml".to_string());
    let config = load_config_or_default(&config_path)
        .map_err(|e| anyhow::anyhow!("Failed to load config from {}: {}", config_path, e))?;

    info!(
        bind_addr = %config.server.bind_addr,
        grid_size = config.workspace.grid_size,
        "Configuration loaded"
    );

    let state = AppState {
        commands: Arc::new(CommandStore::new()),
        status: Arc::new(StatusStore::new()),
        drop_log: Arc::new(DropLog::new()),
        grid_size: config.workspace.grid_size,
    };

    let router = create_router(state);
    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr)
        .await
        .context("Failed to bind coordinator API port")?;
    info!(addr = %config.server.bind_addr, "Coordinator API listening");

    let server_handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            tracing::error!(error = %e, "Coordinator API server error");
        }
    });

    // Wait for shutdown signal
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl_c signal")?;
    info!("Shutdown signal received");

    server_handle.abort();
    info!("Coordinator stopped");

    Ok(())
}
