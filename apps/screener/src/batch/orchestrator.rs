//! Batch Orchestrator: drives each candidate file through the analysis
//! client strictly in input order, one provider call at a time.
//!
//! Flow: validate → idle items → for each item: analyzing → completed/error
//!       → history save (skipped when the credential is missing).

use std::collections::HashSet;

use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::analysis::{AnalysisClient, AnalysisConfig};
use crate::errors::AppError;
use crate::history::HistoryStore;
use crate::models::batch::{BatchItem, ItemStatus};
use crate::models::candidate::{CandidateFile, JobContext};
use crate::models::history::HistorySession;

/// Receives the full item list after every status transition.
pub trait BatchObserver: Send + Sync {
    fn on_update(&self, items: &[BatchItem]);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    /// Every item reached a terminal state.
    Completed,
    /// Aborted because no valid credential is configured.
    ConfigurationRequired,
}

#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub status: BatchStatus,
    pub items: Vec<BatchItem>,
    /// Present when the run was persisted to history.
    pub session: Option<HistorySession>,
    /// Set when the analysis finished but persisting it failed.
    pub history_error: Option<String>,
}

#[derive(Clone)]
pub struct Orchestrator {
    client: AnalysisClient,
    history: HistoryStore,
}

impl Orchestrator {
    pub fn new(client: AnalysisClient, history: HistoryStore) -> Self {
        Self { client, history }
    }

    /// Checks the inputs before any item is created.
    pub fn validate(files: &[CandidateFile], job: &JobContext) -> Result<(), AppError> {
        if files.is_empty() {
            return Err(AppError::Validation(
                "At least one candidate file is required".to_string(),
            ));
        }
        if job.description.trim().is_empty() {
            return Err(AppError::Validation(
                "Job description cannot be empty".to_string(),
            ));
        }
        let mut seen: HashSet<Uuid> = HashSet::with_capacity(files.len());
        if let Some(dup) = files.iter().find(|f| !seen.insert(f.id)) {
            return Err(AppError::Validation(format!(
                "Duplicate candidate file id {}",
                dup.id
            )));
        }
        Ok(())
    }

    /// Runs one batch. `job` and `config` are owned snapshots, so edits made
    /// elsewhere after the call starts do not affect this run.
    pub async fn run(
        &self,
        files: Vec<CandidateFile>,
        job: JobContext,
        config: AnalysisConfig,
        observer: &dyn BatchObserver,
    ) -> Result<BatchOutcome, AppError> {
        Self::validate(&files, &job)?;

        let mut items: Vec<BatchItem> = files.into_iter().map(BatchItem::idle).collect();
        observer.on_update(&items);
        let total = items.len();
        info!("Starting batch of {total} candidates");

        for index in 0..total {
            items[index].status = ItemStatus::Analyzing;
            observer.on_update(&items);

            let outcome = self
                .client
                .analyze(&items[index].file, &job, &config)
                .await;

            let item = &mut items[index];
            match outcome {
                Ok(result) => {
                    item.status = ItemStatus::Completed;
                    item.result = Some(result);
                }
                Err(e) if e.is_batch_fatal() => {
                    warn!("Batch halted at item {} of {total}: {e}", index + 1);
                    item.status = ItemStatus::Idle;
                    observer.on_update(&items);
                    return Ok(BatchOutcome {
                        status: BatchStatus::ConfigurationRequired,
                        items,
                        session: None,
                        history_error: None,
                    });
                }
                Err(e) => {
                    warn!("Analysis of '{}' failed: {e}", item.file.display_name);
                    item.status = ItemStatus::Error;
                    item.error = Some(e.to_string());
                }
            }
            observer.on_update(&items);
        }

        let completed = items
            .iter()
            .filter(|i| i.status == ItemStatus::Completed)
            .count();
        info!(
            "Batch finished: {completed} completed, {} failed",
            total - completed
        );

        let (session, history_error) = match self.history.save(&job, &items).await {
            Ok(session) => (session, None),
            Err(e) => {
                error!("Failed to persist batch to history: {e}");
                (None, Some(e.to_string()))
            }
        };

        Ok(BatchOutcome {
            status: BatchStatus::Completed,
            items,
            session,
            history_error,
        })
    }
}
