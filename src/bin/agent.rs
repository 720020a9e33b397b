use std::time::Duration;

use anyhow::{Context, Result};
use fieldbot::agent::{Agent, HttpCoordinator, RandomDrain};
use fieldbot::config::load_config_or_default;
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

    let config_path =
        std::env::var("FIELDBOT_CONFIG").unwrap_or_else(|_| "fieldbot.toml".to_string());
    let config = load_config_or_default(&config_path)
        .map_err(|e| anyhow::anyhow!("Failed to load config from {}: {}", config_path, e))?;

    info!(
        coordinator_url = %config.agent.coordinator_url,
        poll_interval_ms = config.agent.poll_interval_ms,
        "Fertilizer bot agent starting at base (0, 0) with full battery"
    );

    let coordinator = HttpCoordinator::new(config.agent.coordinator_url.clone());
    let drain = Box::new(RandomDrain::new(config.agent.drain_probability));
    let agent = Agent::new(coordinator, drain, &config.agent);

    let handle = agent.start(Duration::from_millis(config.agent.poll_interval_ms));

    // Wait for shutdown signal
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl_c signal")?;
    info!("Shutdown signal received");

    handle.abort();
    info!("Agent stopped");

    Ok(())
}
