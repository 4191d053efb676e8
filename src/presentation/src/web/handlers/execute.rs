//! Command execution against the engine

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use domain::entities::ExecutionReport;
use serde::Deserialize;

use super::error::{ApiError, ApiResult};
use crate::web::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ExecuteRequest {
    #[serde(default)]
    pub commands: Vec<String>,
    #[serde(default = "default_retry")]
    pub retry_on_error: bool,
}

fn default_retry() -> bool {
    true
}

/// Engine absence is reported inside the report, not as an HTTP error.
pub async fn execute_commands(
    State(state): State<AppState>,
    payload: Result<Json<ExecuteRequest>, JsonRejection>,
) -> ApiResult<Json<ExecutionReport>> {
    let Json(request) = payload?;
    if request.commands.is_empty() {
        return Err(ApiError::bad_request("No commands provided"));
    }
    tracing::info!(
        count = request.commands.len(),
        retry = request.retry_on_error,
        "executing commands"
    );
    let report = state
        .runner
        .run(&request.commands, request.retry_on_error)
        .await;
    Ok(Json(report))
}
