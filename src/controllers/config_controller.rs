use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::{AppState, error::CommandError};

// GET /config
// The caller is the viewer: it gets the location and the document as stored.
pub async fn get_open_config(State(state): State<AppState>) -> Response {
    match state.store.open().await {
        Ok((path, raw)) => {
            let document = serde_json::from_str::<serde_json::Value>(&raw).ok();
            Json(json!({
                "path": path.display().to_string(),
                "raw": raw,
                "document": document,
            }))
            .into_response()
        }
        Err(e) => {
            tracing::error!("open config failed: {}", e);
            CommandError::from(e).into_response()
        }
    }
}
