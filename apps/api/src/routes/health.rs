use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns a simple status object with service version.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "coach-api"
    }))
}

/// GET /meta
pub async fn meta_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "ai_enabled": state.ai_enabled() }))
}
