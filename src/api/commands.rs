//! Command submission, dispatch, and history endpoints.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{ApiError, AppState, MAX_COMMAND_HISTORY};
use crate::command::Command;

/// Request body for POST /api/move
#[derive(Deserialize)]
pub struct MoveRequest {
    x: Option<i64>,
    y: Option<i64>,
}

/// Success response for command submission
#[derive(Serialize)]
pub struct SubmitResponse {
    success: bool,
    #[serde(rename = "commandId")]
    command_id: String,
}

/// Response envelope for GET /api/command
#[derive(Serialize)]
pub struct CommandEnvelope {
    pub command: Option<Command>,
}

/// Query parameters for GET /api/commands
#[derive(Deserialize)]
pub struct HistoryParams {
    pub limit: Option<usize>,
}

/// POST /api/move - Enqueue a move command
///
/// Rejects before any state mutation when the target is missing or
/// outside the workspace grid.
pub async fn submit_move(
    State(state): State<Arc<AppState>>,
    Json(request): Json<MoveRequest>,
) -> Result<Json<SubmitResponse>, ApiError> {
    let (x, y) = match (request.x, request.y) {
        (Some(x), Some(y)) => (x, y),
        _ => {
            return Err(ApiError::InvalidCoordinate(
                "x and y coordinates are required".to_string(),
            ));
        }
    };

    let n = state.grid_size;
    if x < 0 || x >= n || y < 0 || y >= n {
        return Err(ApiError::InvalidCoordinate(format!(
            "coordinates must be between 0 and {}",
            n - 1
        )));
    }

    let command_id = state.commands.submit(Command::new_move(x, y));
    info!(command_id = %command_id, x = x, y = y, "Move command enqueued");

    Ok(Json(SubmitResponse {
        success: true,
        command_id,
    }))
}

/// POST /api/drop - Enqueue a fertilizer drop command
pub async fn submit_drop(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SubmitResponse>, ApiError> {
    let command_id = state.commands.submit(Command::new_drop());
    info!(command_id = %command_id, "Drop command enqueued");

    Ok(Json(SubmitResponse {
        success: true,
        command_id,
    }))
}

/// GET /api/command - Agent fetches the next pending command
///
/// Non-blocking; returns the oldest pending command by creation time,
/// or `{"command": null}` when the queue is drained. Fetching does not
/// claim the command; only a completion report marks it executed.
pub async fn next_command(State(state): State<Arc<AppState>>) -> Json<CommandEnvelope> {
    Json(CommandEnvelope {
        command: state.commands.next_pending(),
    })
}

/// GET /api/commands - Command history, newest first, capped at 20
pub async fn command_history(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HistoryParams>,
) -> Json<Vec<Command>> {
    let limit = params
        .limit
        .unwrap_or(MAX_COMMAND_HISTORY)
        .min(MAX_COMMAND_HISTORY)
        .max(1);
    Json(state.commands.recent(limit))
}
