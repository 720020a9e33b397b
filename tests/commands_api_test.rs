// Integration tests for command submission and dispatch endpoints

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use fieldbot::api::{create_router, AppState};
use fieldbot::command::CommandStore;
use fieldbot::droplog::DropLog;
use fieldbot::status::StatusStore;
use tower::ServiceExt;

fn create_test_app() -> (Router, Arc<CommandStore>) {
    let commands = Arc::new(CommandStore::new());
    let state = AppState {
        commands: Arc::clone(&commands),
        status: Arc::new(StatusStore::new()),
        drop_log: Arc::new(DropLog::new()),
        grid_size: 5,
    };
    (create_router(state), commands)
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

/// POST /api/move with in-bounds coordinates enqueues a pending move.
#[tokio::test]
async fn test_submit_move_enqueues_pending_command() {
    let (app, commands) = create_test_app();

    let response = app
        .clone()
        .oneshot(post_json("/api/move", serde_json::json!({"x": 3, "y": 3})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert!(body["commandId"].is_string());
    assert_eq!(commands.len(), 1);

    let response = app.oneshot(get("/api/command")).await.unwrap();
    let body = body_json(response).await;
    assert_eq!(body["command"]["type"], "move");
    assert_eq!(body["command"]["x"], 3);
    assert_eq!(body["command"]["y"], 3);
    assert_eq!(body["command"]["executed"], false);
}

/// Out-of-bounds targets are rejected with 400 and the queue is unchanged.
#[tokio::test]
async fn test_submit_move_out_of_bounds_rejected() {
    let (app, commands) = create_test_app();

    for target in [
        serde_json::json!({"x": 5, "y": 2}),
        serde_json::json!({"x": 2, "y": 5}),
        serde_json::json!({"x": -1, "y": 0}),
        serde_json::json!({"x": 0, "y": -1}),
    ] {
        let response = app
            .clone()
            .oneshot(post_json("/api/move", target))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    assert_eq!(commands.len(), 0);
}

/// Missing coordinates are rejected with 400.
#[tokio::test]
async fn test_submit_move_missing_coordinates_rejected() {
    let (app, commands) = create_test_app();

    let response = app
        .clone()
        .oneshot(post_json("/api/move", serde_json::json!({"x": 2})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert!(body["error"].is_string());
    assert_eq!(commands.len(), 0);
}

/// Boundary cells of the grid are accepted.
#[tokio::test]
async fn test_submit_move_accepts_grid_corners() {
    let (app, commands) = create_test_app();

    for target in [
        serde_json::json!({"x": 0, "y": 0}),
        serde_json::json!({"x": 4, "y": 4}),
        serde_json::json!({"x": 0, "y": 4}),
        serde_json::json!({"x": 4, "y": 0}),
    ] {
        let response = app
            .clone()
            .oneshot(post_json("/api/move", target))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    assert_eq!(commands.len(), 4);
}

/// POST /api/drop always succeeds and needs no coordinates.
#[tokio::test]
async fn test_submit_drop() {
    let (app, _commands) = create_test_app();

    let response = app
        .clone()
        .oneshot(post_json("/api/drop", serde_json::json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], true);

    let response = app.oneshot(get("/api/command")).await.unwrap();
    let body = body_json(response).await;
    assert_eq!(body["command"]["type"], "drop");
    assert!(body["command"].get("x").is_none());
}

/// GET /api/command returns null when the queue has no pending entries.
#[tokio::test]
async fn test_fetch_empty_queue_returns_null() {
    let (app, _commands) = create_test_app();

    let response = app.oneshot(get("/api/command")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert!(body["command"].is_null());
}

/// Dispatch is FIFO by submission time, not by target distance.
#[tokio::test]
async fn test_fetch_is_fifo() {
    let (app, _commands) = create_test_app();

    let response = app
        .clone()
        .oneshot(post_json("/api/drop", serde_json::json!({})))
        .await
        .unwrap();
    let drop_id = body_json(response).await["commandId"].clone();

    app.clone()
        .oneshot(post_json("/api/move", serde_json::json!({"x": 2, "y": 0})))
        .await
        .unwrap();

    let response = app.oneshot(get("/api/command")).await.unwrap();
    let body = body_json(response).await;
    assert_eq!(body["command"]["id"], drop_id);
    assert_eq!(body["command"]["type"], "drop");
}

/// Fetch does not claim: repeated fetches return the same command until
/// a completion report arrives.
#[tokio::test]
async fn test_fetch_does_not_claim() {
    let (app, _commands) = create_test_app();

    app.clone()
        .oneshot(post_json("/api/move", serde_json::json!({"x": 1, "y": 1})))
        .await
        .unwrap();

    let first = body_json(app.clone().oneshot(get("/api/command")).await.unwrap()).await;
    let second = body_json(app.oneshot(get("/api/command")).await.unwrap()).await;
    assert_eq!(first["command"]["id"], second["command"]["id"]);
}

/// GET /api/commands returns newest first, capped at 20.
#[tokio::test]
async fn test_command_history_capped_and_newest_first() {
    let (app, _commands) = create_test_app();

    let mut last_id = serde_json::Value::Null;
    for _ in 0..25 {
        let response = app
            .clone()
            .oneshot(post_json("/api/drop", serde_json::json!({})))
            .await
            .unwrap();
        last_id = body_json(response).await["commandId"].clone();
    }

    let body = body_json(app.oneshot(get("/api/commands")).await.unwrap()).await;
    let history = body.as_array().unwrap();
    assert_eq!(history.len(), 20);
    assert_eq!(history[0]["id"], last_id);
}
