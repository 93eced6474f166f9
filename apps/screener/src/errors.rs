use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::analysis::AnalysisError;
use crate::storage::StorageError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("An API key must be configured before analysing candidates")]
    ConfigurationRequired,

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Storage quota exceeded: {0}")]
    StorageQuotaExceeded(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<AnalysisError> for AppError {
    fn from(e: AnalysisError) -> Self {
        match e {
            AnalysisError::MissingCredential => AppError::ConfigurationRequired,
            other => AppError::Llm(other.to_string()),
        }
    }
}

impl From<StorageError> for AppError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::QuotaExceeded { .. } => AppError::StorageQuotaExceeded(e.to_string()),
            other => AppError::Storage(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            AppError::ConfigurationRequired => (
                StatusCode::PRECONDITION_REQUIRED,
                "CONFIGURATION_REQUIRED",
                self.to_string(),
            ),
            // Provider detail is shown to the user; screening is advisory.
            AppError::Llm(msg) => {
                tracing::error!("LLM error: {msg}");
                (StatusCode::BAD_GATEWAY, "LLM_ERROR", msg.clone())
            }
            AppError::StorageQuotaExceeded(msg) => {
                tracing::error!("Storage quota exceeded: {msg}");
                (
                    StatusCode::INSUFFICIENT_STORAGE,
                    "STORAGE_QUOTA_EXCEEDED",
                    msg.clone(),
                )
            }
            AppError::Storage(msg) => {
                tracing::error!("Storage error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORAGE_ERROR",
                    "A storage error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credential_maps_to_428() {
        let err: AppError = AnalysisError::MissingCredential.into();
        assert_eq!(
            err.into_response().status(),
            StatusCode::PRECONDITION_REQUIRED
        );
    }

    #[test]
    fn test_quota_maps_to_507() {
        let err: AppError = StorageError::QuotaExceeded {
            key: "screener:history".into(),
        }
        .into();
        assert_eq!(
            err.into_response().status(),
            StatusCode::INSUFFICIENT_STORAGE
        );
    }

    #[test]
    fn test_provider_error_maps_to_502() {
        let err: AppError = AnalysisError::Provider("boom".into()).into();
        assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);
    }
}
