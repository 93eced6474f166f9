//! Axum route handlers for the History API.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::history::HistorySession;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreResponse {
    pub batch_id: Uuid,
}

/// GET /api/v1/history
pub async fn handle_list_history(
    State(state): State<AppState>,
) -> Result<Json<Vec<HistorySession>>, AppError> {
    Ok(Json(state.history.list().await?))
}

/// GET /api/v1/history/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<HistorySession>, AppError> {
    state
        .history
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))
}

/// DELETE /api/v1/history/:id
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.history.delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Session {id} not found")))
    }
}

/// DELETE /api/v1/history
pub async fn handle_clear_history(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.history.clear().await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/history/:id/restore
///
/// Seeds a new batch from a stored session; the stored copy is untouched.
pub async fn handle_restore_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<RestoreResponse>, AppError> {
    let session = state
        .history
        .restore(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))?;
    let batch_id = state.batches.restore(session);
    Ok(Json(RestoreResponse { batch_id }))
}
