//! Conversational generation

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use super::error::{ApiError, ApiResult};
use crate::web::session::Session;
use crate::web::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub context: Option<Value>,
}

pub async fn chat(
    State(state): State<AppState>,
    session: Session,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return ApiError::from(rejection).into_response(),
    };
    session.respond(generate(&state, &session, request).await)
}

async fn generate(
    state: &AppState,
    session: &Session,
    request: ChatRequest,
) -> ApiResult<Json<Value>> {
    let message = request.message.trim();
    if message.is_empty() {
        return Err(ApiError::bad_request("No message provided"));
    }

    let agent = state.agent(&session.id).await?;
    let result = agent
        .lock()
        .await
        .generate(message, request.context.as_ref())
        .await;

    if !result.success {
        return Err(ApiError::upstream(
            result.error.unwrap_or_else(|| "Failed to generate response".to_string()),
        ));
    }

    Ok(Json(json!({
        "success": true,
        "message": result.explanation,
        "commands": result.commands,
        "model_used": result.model_used,
        "timestamp": result.timestamp,
        "sessionId": session.id,
    })))
}
