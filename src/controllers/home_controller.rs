use axum::{
    Json,
    extract::State,
    http::{StatusCode, Uri},
    response::IntoResponse,
};
use serde_json::json;

use crate::AppState;

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

// GET /
pub async fn index(State(state): State<AppState>) -> impl IntoResponse {
    let status = state.monitor.status().await;
    Json(json!({
        "service": "trend-notifier",
        "config_path": state.store.path().display().to_string(),
        "monitor": status,
    }))
}

pub async fn not_found(uri: Uri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": format!("no command at {}", uri.path()) })),
    )
}
