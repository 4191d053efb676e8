//! Conversation history of the calling session

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use super::error::ApiResult;
use crate::web::session::Session;
use crate::web::state::AppState;

/// Clearing a session that was never created is a no-op.
pub async fn clear_history(
    State(state): State<AppState>,
    session: Session,
) -> ApiResult<Json<Value>> {
    if let Some(agent) = state.existing_agent(&session.id).await? {
        agent.lock().await.clear_history();
    }
    Ok(Json(json!({
        "success": true,
        "message": "Conversation history cleared",
    })))
}

pub async fn get_history(
    State(state): State<AppState>,
    session: Session,
) -> ApiResult<Json<Value>> {
    let turns = match state.existing_agent(&session.id).await? {
        Some(agent) => agent.lock().await.history(),
        None => Vec::new(),
    };
    Ok(Json(json!({
        "success": true,
        "count": turns.len(),
        "history": turns,
    })))
}
