//! Live batch state for polling clients. Each run has its own entry,
//! updated by the orchestrator's observer as items progress.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::batch::orchestrator::{BatchObserver, BatchOutcome, BatchStatus};
use crate::models::batch::{BatchItem, ItemStatus};
use crate::models::candidate::{CandidateFile, JobContext};
use crate::models::history::HistorySession;

/// Finished batches kept in memory before the oldest are evicted.
const MAX_RETAINED_BATCHES: usize = 50;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSnapshot {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub job: JobContext,
    pub items: Vec<BatchItem>,
    pub processing: bool,
    pub configuration_required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history_error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    Removed,
    NotFound,
    StillRunning,
}

#[derive(Clone, Default)]
pub struct BatchRegistry {
    runs: Arc<Mutex<HashMap<Uuid, BatchSnapshot>>>,
}

impl BatchRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, BatchSnapshot>> {
        self.runs.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Registers a new run with every item idle.
    pub fn start(&self, job: JobContext, files: &[CandidateFile]) -> Uuid {
        let id = Uuid::new_v4();
        let snapshot = BatchSnapshot {
            id,
            created_at: Utc::now(),
            job,
            items: files.iter().cloned().map(BatchItem::idle).collect(),
            processing: true,
            configuration_required: false,
            session_id: None,
            history_error: None,
        };
        self.insert(snapshot);
        info!("Registered batch {id} with {} files", files.len());
        id
    }

    /// Seeds a finished batch from a history session. The session itself is
    /// not referenced afterwards.
    pub fn restore(&self, session: HistorySession) -> Uuid {
        let id = Uuid::new_v4();
        let snapshot = BatchSnapshot {
            id,
            created_at: Utc::now(),
            job: JobContext {
                title: session.job_title,
                description: session.job_description,
            },
            items: session.items,
            processing: false,
            configuration_required: false,
            session_id: Some(session.id),
            history_error: None,
        };
        self.insert(snapshot);
        info!("Restored history session {} as batch {id}", session.id);
        id
    }

    fn insert(&self, snapshot: BatchSnapshot) {
        let mut runs = self.lock();
        runs.insert(snapshot.id, snapshot);
        evict_finished(&mut runs);
    }

    pub fn get(&self, id: Uuid) -> Option<BatchSnapshot> {
        self.lock().get(&id).cloned()
    }

    pub fn item(&self, id: Uuid, item_id: Uuid) -> Option<(JobContext, BatchItem)> {
        let runs = self.lock();
        let snapshot = runs.get(&id)?;
        let item = snapshot.items.iter().find(|i| i.file.id == item_id)?;
        Some((snapshot.job.clone(), item.clone()))
    }

    /// Replaces the item list of a live run. Unknown ids are ignored.
    pub fn update_items(&self, id: Uuid, items: &[BatchItem]) {
        if let Some(snapshot) = self.lock().get_mut(&id) {
            snapshot.items = items.to_vec();
        }
    }

    pub fn finish(&self, id: Uuid, outcome: BatchOutcome) {
        if let Some(snapshot) = self.lock().get_mut(&id) {
            snapshot.items = outcome.items;
            snapshot.processing = false;
            snapshot.configuration_required =
                outcome.status == BatchStatus::ConfigurationRequired;
            snapshot.session_id = outcome.session.map(|s| s.id);
            snapshot.history_error = outcome.history_error;
        }
        debug!("Batch {id} finished");
    }

    /// Marks a run as failed before any item could be analysed.
    pub fn abort(&self, id: Uuid, message: &str) {
        if let Some(snapshot) = self.lock().get_mut(&id) {
            snapshot.processing = false;
            for item in &mut snapshot.items {
                if item.status != ItemStatus::Completed {
                    item.status = ItemStatus::Error;
                    item.error = Some(message.to_string());
                }
            }
        }
    }

    /// Drops a finished run. Running batches are left alone.
    pub fn remove(&self, id: Uuid) -> Removal {
        let mut runs = self.lock();
        match runs.get(&id) {
            None => Removal::NotFound,
            Some(snapshot) if snapshot.processing => Removal::StillRunning,
            Some(_) => {
                runs.remove(&id);
                Removal::Removed
            }
        }
    }

    pub fn observer(&self, id: Uuid) -> RegistryObserver {
        RegistryObserver {
            registry: self.clone(),
            id,
        }
    }
}

fn evict_finished(runs: &mut HashMap<Uuid, BatchSnapshot>) {
    while runs.len() > MAX_RETAINED_BATCHES {
        let oldest = runs
            .values()
            .filter(|s| !s.processing)
            .min_by_key(|s| s.created_at)
            .map(|s| s.id);
        match oldest {
            Some(id) => {
                runs.remove(&id);
            }
            None => break,
        }
    }
}

/// Forwards orchestrator progress into the registry entry of one run.
pub struct RegistryObserver {
    registry: BatchRegistry,
    id: Uuid,
}

impl BatchObserver for RegistryObserver {
    fn on_update(&self, items: &[BatchItem]) {
        self.registry.update_items(self.id, items);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::{completed_item, job, text_file};

    fn outcome(items: Vec<BatchItem>, status: BatchStatus) -> BatchOutcome {
        BatchOutcome {
            status,
            items,
            session: None,
            history_error: None,
        }
    }

    #[test]
    fn test_start_registers_idle_processing_run() {
        let registry = BatchRegistry::new();
        let files = vec![text_file("a.txt", "a"), text_file("b.txt", "b")];
        let id = registry.start(job(), &files);

        let snapshot = registry.get(id).unwrap();
        assert!(snapshot.processing);
        assert_eq!(snapshot.items.len(), 2);
        assert!(snapshot.items.iter().all(|i| i.status == ItemStatus::Idle));
    }

    #[test]
    fn test_observer_updates_items() {
        let registry = BatchRegistry::new();
        let file = text_file("a.txt", "a");
        let id = registry.start(job(), std::slice::from_ref(&file));

        let mut item = BatchItem::idle(file);
        item.status = ItemStatus::Analyzing;
        registry.observer(id).on_update(&[item]);

        assert_eq!(registry.get(id).unwrap().items[0].status, ItemStatus::Analyzing);
    }

    #[test]
    fn test_finish_records_configuration_required() {
        let registry = BatchRegistry::new();
        let file = text_file("a.txt", "a");
        let id = registry.start(job(), std::slice::from_ref(&file));
        registry.finish(
            id,
            outcome(vec![BatchItem::idle(file)], BatchStatus::ConfigurationRequired),
        );

        let snapshot = registry.get(id).unwrap();
        assert!(!snapshot.processing);
        assert!(snapshot.configuration_required);
    }

    #[test]
    fn test_remove_refuses_running_batch() {
        let registry = BatchRegistry::new();
        let id = registry.start(job(), &[text_file("a.txt", "a")]);
        assert_eq!(registry.remove(id), Removal::StillRunning);

        registry.finish(id, outcome(vec![], BatchStatus::Completed));
        assert_eq!(registry.remove(id), Removal::Removed);
        assert_eq!(registry.remove(id), Removal::NotFound);
        // Late observer updates do not resurrect the run.
        registry.update_items(id, &[]);
        assert!(registry.get(id).is_none());
    }

    #[test]
    fn test_restore_copies_session() {
        let registry = BatchRegistry::new();
        let session = HistorySession {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            job_title: "SRE".into(),
            job_description: "Pager".into(),
            items: vec![completed_item("a", 75)],
            total_candidates: 1,
            average_score: 75,
        };
        let id = registry.restore(session.clone());
        assert_ne!(id, session.id);

        let snapshot = registry.get(id).unwrap();
        assert!(!snapshot.processing);
        assert_eq!(snapshot.session_id, Some(session.id));
        assert_eq!(snapshot.items, session.items);
        assert_eq!(snapshot.job.title, "SRE");
    }

    #[test]
    fn test_finished_runs_are_evicted_past_limit() {
        let registry = BatchRegistry::new();
        let first = registry.start(job(), &[text_file("a.txt", "a")]);
        registry.finish(first, outcome(vec![], BatchStatus::Completed));
        for _ in 0..MAX_RETAINED_BATCHES {
            registry.start(job(), &[text_file("a.txt", "a")]);
        }
        // Every other run is still processing, so the finished one goes.
        assert!(registry.get(first).is_none());
    }
}
