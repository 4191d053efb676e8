//! Structure registry of the calling session

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::PathBuf;

use super::error::{ApiError, ApiResult};
use crate::web::session::Session;
use crate::web::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct LoadStructureRequest {
    #[serde(default)]
    pub pdb_id: Option<String>,
    #[serde(default)]
    pub file_path: Option<PathBuf>,
    #[serde(default)]
    pub name: Option<String>,
}

pub async fn load_structure(
    State(state): State<AppState>,
    session: Session,
    payload: Result<Json<LoadStructureRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return ApiError::from(rejection).into_response(),
    };
    session.respond(load(&state, &session, request).await)
}

async fn load(
    state: &AppState,
    session: &Session,
    request: LoadStructureRequest,
) -> ApiResult<Json<Value>> {
    let agent = state.agent(&session.id).await?;
    let outcome = agent
        .lock()
        .await
        .load_structure(
            request.pdb_id.as_deref(),
            request.file_path.as_deref(),
            request.name.as_deref(),
        )
        .await?;
    Ok(Json(json!(outcome)))
}

/// An unknown session lists nothing and is not registered.
pub async fn list_structures(
    State(state): State<AppState>,
    session: Session,
) -> ApiResult<Json<Value>> {
    let structures = match state.existing_agent(&session.id).await? {
        Some(agent) => agent.lock().await.structures(),
        None => Vec::new(),
    };
    Ok(Json(json!({
        "success": true,
        "count": structures.len(),
        "structures": structures,
    })))
}
