use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::{AppState, error::CommandError};

// POST /monitor/start
pub async fn post_start(State(state): State<AppState>) -> Response {
    match state.monitor.start().await {
        Ok(status) => (
            StatusCode::OK,
            Json(json!({ "message": "Monitoring started.", "monitor": status })),
        )
            .into_response(),
        Err(e) => CommandError::from(e).into_response(),
    }
}

// POST /monitor/stop
pub async fn post_stop(State(state): State<AppState>) -> Response {
    let was_running = state.monitor.stop().await;
    let message = if was_running {
        "Monitoring stopped."
    } else {
        "Monitoring was not running."
    };

    (
        StatusCode::OK,
        Json(json!({ "message": message, "monitor": state.monitor.status().await })),
    )
        .into_response()
}

// GET /monitor/status
pub async fn get_status(State(state): State<AppState>) -> Response {
    Json(json!({ "monitor": state.monitor.status().await })).into_response()
}
