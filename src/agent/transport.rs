//! Agent-to-coordinator transport.
//!
//! The agent only needs two calls: fetch the next pending command and
//! post a telemetry report. `HttpCoordinator` is the production
//! transport; `LocalCoordinator` applies the same semantics directly
//! against in-process stores, which tests use to drive the loop
//! deterministically.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

use crate::api::apply_telemetry;
use crate::command::{Command, CommandStore};
use crate::droplog::DropLog;
use crate::status::{StatusStore, TelemetryReport};

/// Coordinator API as seen from the agent.
#[async_trait]
pub trait Coordinator: Send + Sync {
    /// Fetch the oldest pending command, or None when the queue is drained.
    async fn fetch_next_command(&self) -> Result<Option<Command>>;

    /// Post a telemetry report (partial status, optional completion).
    async fn report(&self, report: &TelemetryReport) -> Result<()>;
}

#[derive(Deserialize)]
struct CommandEnvelope {
    command: Option<Command>,
}

/// HTTP transport against a remote coordinator.
pub struct HttpCoordinator {
    base_url: String,
    client: reqwest::Client,
}

impl HttpCoordinator {
    /// Creates a transport for the coordinator at `base_url`
    /// (e.g. "http://localhost:5001").
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Coordinator for HttpCoordinator {
    async fn fetch_next_command(&self) -> Result<Option<Command>> {
        let url = format!("{}/api/command", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to fetch next command")?;

        if !response.status().is_success() {
            anyhow::bail!("Command fetch failed with status {}", response.status());
        }

        let envelope: CommandEnvelope = response
            .json()
            .await
            .context("Failed to parse command envelope")?;
        Ok(envelope.command)
    }

    async fn report(&self, report: &TelemetryReport) -> Result<()> {
        let url = format!("{}/api/status", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(report)
            .send()
            .await
            .context("Failed to send telemetry report")?;

        if !response.status().is_success() {
            anyhow::bail!("Telemetry report failed with status {}", response.status());
        }

        Ok(())
    }
}

/// In-process transport applying the same store semantics as the HTTP
/// handlers.
pub struct LocalCoordinator {
    pub commands: Arc<CommandStore>,
    pub status: Arc<StatusStore>,
    pub drop_log: Arc<DropLog>,
}

#[async_trait]
impl Coordinator for LocalCoordinator {
    async fn fetch_next_command(&self) -> Result<Option<Command>> {
        Ok(self.commands.next_pending())
    }

    async fn report(&self, report: &TelemetryReport) -> Result<()> {
        apply_telemetry(&self.commands, &self.status, &self.drop_log, report)?;
        Ok(())
    }
}
