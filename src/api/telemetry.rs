//! Telemetry, status, and audit-log endpoints.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{ApiError, AppState, MAX_DROP_HISTORY};
use crate::command::{CommandStore, CommandStoreError};
use crate::droplog::{DropLog, FertilizerEvent};
use crate::status::{AgentStatus, StatusStore, TelemetryReport};

/// Success response for POST /api/status
#[derive(Serialize)]
pub struct StatusResponse {
    success: bool,
}

/// Query parameters for GET /api/logs
#[derive(Deserialize)]
pub struct LogParams {
    pub limit: Option<usize>,
}

/// Health response for GET /api/health
#[derive(Serialize)]
pub struct HealthResponse {
    ok: bool,
    time: chrono::DateTime<Utc>,
}

/// Applies a telemetry report against the stores.
///
/// Order matters: an unknown `command_id` is rejected before anything
/// is written (fail fast, no partial writes). The status update comes
/// before the fertilizer event so the event records the post-update
/// position and battery. Marking an already-executed command again is
/// a no-op.
///
/// Shared between the HTTP handler and the in-process coordinator
/// transport so both apply identical semantics.
pub fn apply_telemetry(
    commands: &CommandStore,
    status: &StatusStore,
    drop_log: &DropLog,
    report: &TelemetryReport,
) -> Result<AgentStatus, CommandStoreError> {
    if let Some(id) = &report.command_id {
        if !commands.contains(id) {
            return Err(CommandStoreError::UnknownCommand(id.clone()));
        }
    }

    let snapshot = status.apply(report);

    if let Some(id) = &report.command_id {
        // Existence was checked above and commands are never deleted,
        // so this cannot fail
        commands.mark_executed(id, Utc::now())?;
        info!(command_id = %id, "Command marked executed");
    }

    if report.fertilizer_dropped {
        drop_log.append(snapshot.x, snapshot.y, snapshot.battery, true);
        info!(
            x = snapshot.x,
            y = snapshot.y,
            battery = snapshot.battery,
            "Fertilizer drop recorded"
        );
    }

    Ok(snapshot)
}

/// POST /api/status - Agent reports telemetry
///
/// Partial status update; optionally marks a command executed and
/// records a fertilizer drop.
pub async fn report_telemetry(
    State(state): State<Arc<AppState>>,
    Json(report): Json<TelemetryReport>,
) -> Result<Json<StatusResponse>, ApiError> {
    apply_telemetry(&state.commands, &state.status, &state.drop_log, &report)
        .map_err(|e| ApiError::NotFound(e.to_string()))?;

    Ok(Json(StatusResponse { success: true }))
}

/// GET /api/status - Current agent status
///
/// Creates the default record (position origin, full battery) on first
/// read if the agent has never reported.
pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<AgentStatus> {
    Json(state.status.current())
}

/// GET /api/logs - Fertilizer drop history, newest first, capped at 50
pub async fn drop_history(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LogParams>,
) -> Json<Vec<FertilizerEvent>> {
    let limit = params
        .limit
        .unwrap_or(MAX_DROP_HISTORY)
        .min(MAX_DROP_HISTORY)
        .max(1);
    Json(state.drop_log.recent(limit))
}

/// GET /api/health - Liveness check
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        time: Utc::now(),
    })
}
