//! Axum route handlers for the Batch API.

use std::future::Future;

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use tracing::{error, info};
use uuid::Uuid;

use crate::batch::orchestrator::{BatchOutcome, Orchestrator};
use crate::batch::ranking::{rank, RankQuery};
use crate::batch::registry::{BatchRegistry, BatchSnapshot, Removal};
use crate::errors::AppError;
use crate::intake::{intake_all, Upload};
use crate::models::analysis::InterviewPlan;
use crate::models::batch::{BatchItem, ItemStatus};
use crate::models::candidate::JobContext;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBatchResponse {
    pub batch_id: Uuid,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTextResponse {
    pub item_id: Uuid,
    pub text: String,
}

/// Reads `title`, `description` and every `files` part of the upload form.
async fn read_batch_form(multipart: &mut Multipart) -> Result<(JobContext, Vec<Upload>), AppError> {
    let mut job = JobContext::default();
    let mut uploads = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed upload: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "title" | "description" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Malformed '{name}' field: {e}")))?;
                if name == "title" {
                    job.title = value;
                } else {
                    job.description = value;
                }
            }
            "files" => {
                let file_name = field.file_name().unwrap_or("resume").to_string();
                let content_type = field.content_type().map(String::from);
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read '{file_name}': {e}")))?;
                uploads.push(Upload {
                    file_name,
                    content_type,
                    data,
                });
            }
            _ => {}
        }
    }

    Ok((job, uploads))
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/batches
///
/// Multipart form: `title`, `description`, one or more `files`.
/// Starts the run in the background and returns its id immediately; poll
/// GET /api/v1/batches/:id for progress.
pub async fn handle_create_batch(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<CreateBatchResponse>), AppError> {
    let (job, uploads) = read_batch_form(&mut multipart).await?;
    let files = intake_all(uploads).await?;
    Orchestrator::validate(&files, &job)?;

    let config = state.settings.analysis_config().await?;
    if config.api_key.is_none() {
        return Err(AppError::ConfigurationRequired);
    }

    let batch_id = state.batches.start(job.clone(), &files);
    let orchestrator = state.orchestrator.clone();
    let observer = state.batches.observer(batch_id);

    spawn_batch(state.batches.clone(), batch_id, async move {
        orchestrator.run(files, job, config, &observer).await
    });

    info!("Accepted batch {batch_id}");
    Ok((StatusCode::ACCEPTED, Json(CreateBatchResponse { batch_id })))
}

/// GET /api/v1/batches/:id
pub async fn handle_get_batch(
    State(state): State<AppState>,
    Path(batch_id): Path<Uuid>,
) -> Result<Json<BatchSnapshot>, AppError> {
    state
        .batches
        .get(batch_id)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Batch {batch_id} not found")))
}

/// GET /api/v1/batches/:id/results?sort=&recommendation=&minScore=
pub async fn handle_batch_results(
    State(state): State<AppState>,
    Path(batch_id): Path<Uuid>,
    Query(query): Query<RankQuery>,
) -> Result<Json<Vec<BatchItem>>, AppError> {
    let snapshot = state
        .batches
        .get(batch_id)
        .ok_or_else(|| AppError::NotFound(format!("Batch {batch_id} not found")))?;
    let ranked = rank(&snapshot.items, &query).into_iter().cloned().collect();
    Ok(Json(ranked))
}

/// DELETE /api/v1/batches/:id
pub async fn handle_reset_batch(
    State(state): State<AppState>,
    Path(batch_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    match state.batches.remove(batch_id) {
        Removal::Removed => Ok(StatusCode::NO_CONTENT),
        Removal::NotFound => Err(AppError::NotFound(format!("Batch {batch_id} not found"))),
        Removal::StillRunning => Err(AppError::Conflict(format!(
            "Batch {batch_id} is still processing"
        ))),
    }
}

/// POST /api/v1/batches/:id/items/:item_id/interview-plan
pub async fn handle_interview_plan(
    State(state): State<AppState>,
    Path((batch_id, item_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<InterviewPlan>, AppError> {
    let (job, item) = find_item(&state, batch_id, item_id)?;
    let candidate_name = match (&item.status, &item.result) {
        (ItemStatus::Completed, Some(result)) => result.candidate_name.clone(),
        _ => {
            return Err(AppError::Conflict(
                "Interview plans are only available for analysed candidates".to_string(),
            ))
        }
    };
    require_content(&item)?;

    let config = state.settings.analysis_config().await?;
    let plan = state
        .analysis
        .generate_interview_plan(&item.file, &job, &candidate_name, &config)
        .await?;
    Ok(Json(plan))
}

/// GET /api/v1/batches/:id/items/:item_id/raw-text
pub async fn handle_raw_text(
    State(state): State<AppState>,
    Path((batch_id, item_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<RawTextResponse>, AppError> {
    let (_, item) = find_item(&state, batch_id, item_id)?;
    require_content(&item)?;

    let config = state.settings.analysis_config().await?;
    let text = state.analysis.extract_raw_text(&item.file, &config).await?;
    Ok(Json(RawTextResponse { item_id, text }))
}

/// Runs a batch in the background and settles its registry entry however
/// the task ends, including a panic inside the run.
fn spawn_batch<F>(registry: BatchRegistry, batch_id: Uuid, run: F)
where
    F: Future<Output = Result<BatchOutcome, AppError>> + Send + 'static,
{
    let task = tokio::spawn(run);
    tokio::spawn(async move {
        match task.await {
            Ok(Ok(outcome)) => registry.finish(batch_id, outcome),
            Ok(Err(e)) => {
                error!("Batch {batch_id} failed to run: {e}");
                registry.abort(batch_id, &e.to_string());
            }
            Err(e) => {
                error!("Batch {batch_id} task ended unexpectedly: {e}");
                registry.abort(batch_id, "Batch processing stopped unexpectedly");
            }
        }
    });
}

fn find_item(
    state: &AppState,
    batch_id: Uuid,
    item_id: Uuid,
) -> Result<(JobContext, BatchItem), AppError> {
    state
        .batches
        .item(batch_id, item_id)
        .ok_or_else(|| AppError::NotFound(format!("Item {item_id} not found in batch {batch_id}")))
}

/// Restored sessions may have had their file payloads stripped.
fn require_content(item: &BatchItem) -> Result<(), AppError> {
    if item.file.content.is_empty() {
        return Err(AppError::Conflict(format!(
            "The original file '{}' is no longer stored",
            item.file.display_name
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::batch::orchestrator::BatchStatus;
    use crate::models::fixtures::{job, text_file};

    async fn settled(registry: &BatchRegistry, id: Uuid) -> BatchSnapshot {
        for _ in 0..200 {
            let snapshot = registry.get(id).unwrap();
            if !snapshot.processing {
                return snapshot;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("batch {id} still processing");
    }

    async fn crashing_run() -> Result<BatchOutcome, AppError> {
        panic!("analysis task crashed")
    }

    #[tokio::test]
    async fn test_panicking_run_is_aborted_and_can_be_reset() {
        let registry = BatchRegistry::new();
        let id = registry.start(job(), &[text_file("a.txt", "Ada")]);

        spawn_batch(registry.clone(), id, crashing_run());

        let snapshot = settled(&registry, id).await;
        assert_eq!(snapshot.items[0].status, ItemStatus::Error);
        assert!(snapshot.items[0].error.is_some());
        assert_eq!(registry.remove(id), Removal::Removed);
    }

    #[tokio::test]
    async fn test_finished_run_is_recorded() {
        let registry = BatchRegistry::new();
        let file = text_file("a.txt", "Ada");
        let id = registry.start(job(), std::slice::from_ref(&file));

        spawn_batch(registry.clone(), id, async move {
            Ok(BatchOutcome {
                status: BatchStatus::ConfigurationRequired,
                items: vec![BatchItem::idle(file)],
                session: None,
                history_error: None,
            })
        });

        let snapshot = settled(&registry, id).await;
        assert!(snapshot.configuration_required);
        assert_eq!(snapshot.items[0].status, ItemStatus::Idle);
    }
}
