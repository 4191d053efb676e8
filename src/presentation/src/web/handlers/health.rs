//! Health check handler

use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::web::state::AppState;

pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "agent_available": state.agent_available(),
        "engine_available": state.engine_available(),
        "active_sessions": state.sessions.len().await,
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}
