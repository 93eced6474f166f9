//! Credential and temperature endpoints.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsResponse {
    /// The key itself is never echoed back.
    pub has_api_key: bool,
    pub temperature: f32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyRequest {
    pub api_key: String,
}

#[derive(Debug, Deserialize)]
pub struct TemperatureRequest {
    pub temperature: f32,
}

#[derive(Debug, Serialize)]
pub struct TemperatureResponse {
    pub temperature: f32,
}

/// GET /api/v1/settings
pub async fn handle_get_settings(
    State(state): State<AppState>,
) -> Result<Json<SettingsResponse>, AppError> {
    Ok(Json(SettingsResponse {
        has_api_key: state.settings.api_key().await?.is_some(),
        temperature: state.settings.temperature().await?,
    }))
}

/// PUT /api/v1/settings/api-key
pub async fn handle_set_api_key(
    State(state): State<AppState>,
    Json(request): Json<ApiKeyRequest>,
) -> Result<StatusCode, AppError> {
    state.settings.set_api_key(&request.api_key).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/settings/api-key
pub async fn handle_clear_api_key(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.settings.clear_api_key().await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/settings/temperature
///
/// Out-of-range values are clamped; the stored value is returned.
pub async fn handle_set_temperature(
    State(state): State<AppState>,
    Json(request): Json<TemperatureRequest>,
) -> Result<Json<TemperatureResponse>, AppError> {
    let temperature = state.settings.set_temperature(request.temperature).await?;
    Ok(Json(TemperatureResponse { temperature }))
}
