// Coordinator HTTP API

mod commands;
mod telemetry;

pub use telemetry::apply_telemetry;

use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use tower_http::cors::CorsLayer;

use crate::command::CommandStore;
use crate::droplog::DropLog;
use crate::status::StatusStore;

/// Maximum fertilizer events returned by GET /api/logs
pub const MAX_DROP_HISTORY: usize = 50;
/// Maximum commands returned by GET /api/commands
pub const MAX_COMMAND_HISTORY: usize = 20;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub commands: Arc<CommandStore>,
    pub status: Arc<StatusStore>,
    pub drop_log: Arc<DropLog>,
    /// Side length N of the workspace grid; valid cells are [0, N)
    pub grid_size: i64,
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Application error types
pub enum ApiError {
    /// Move target missing or outside the workspace grid
    InvalidCoordinate(String),
    /// Referenced command/entity id does not exist
    NotFound(String),
    /// Unexpected store failure; detail is logged server-side only
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ApiError::InvalidCoordinate(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal store error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal error".to_string(),
                )
            }
        };
        let body = Json(ErrorResponse {
            error: error_message,
        });
        (status, body).into_response()
    }
}

/// Create API router with all coordinator endpoints.
///
/// CORS is universally permissive, matching the deployment where the
/// dashboard frontend is served from a different origin.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/move", post(commands::submit_move))
        .route("/api/drop", post(commands::submit_drop))
        .route("/api/command", get(commands::next_command))
        .route("/api/commands", get(commands::command_history))
        .route(
            "/api/status",
            post(telemetry::report_telemetry).get(telemetry::get_status),
        )
        .route("/api/logs", get(telemetry::drop_history))
        .route("/api/health", get(telemetry::health))
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}
