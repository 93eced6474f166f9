pub mod health;
pub mod settings;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};

use crate::batch::handlers as batches;
use crate::history::handlers as history;
use crate::state::AppState;

/// Upper bound for one multipart batch upload.
const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Settings
        .route("/api/v1/settings", get(settings::handle_get_settings))
        .route(
            "/api/v1/settings/api-key",
            put(settings::handle_set_api_key).delete(settings::handle_clear_api_key),
        )
        .route(
            "/api/v1/settings/temperature",
            put(settings::handle_set_temperature),
        )
        // Batches
        .route(
            "/api/v1/batches",
            post(batches::handle_create_batch).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route(
            "/api/v1/batches/:id",
            get(batches::handle_get_batch).delete(batches::handle_reset_batch),
        )
        .route(
            "/api/v1/batches/:id/results",
            get(batches::handle_batch_results),
        )
        .route(
            "/api/v1/batches/:id/items/:item_id/interview-plan",
            post(batches::handle_interview_plan),
        )
        .route(
            "/api/v1/batches/:id/items/:item_id/raw-text",
            get(batches::handle_raw_text),
        )
        // History
        .route(
            "/api/v1/history",
            get(history::handle_list_history).delete(history::handle_clear_history),
        )
        .route(
            "/api/v1/history/:id",
            get(history::handle_get_session).delete(history::handle_delete_session),
        )
        .route(
            "/api/v1/history/:id/restore",
            post(history::handle_restore_session),
        )
        .with_state(state)
}
