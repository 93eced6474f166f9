//! History Store: capped, newest-first list of finished batches kept under
//! a single storage key.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::batch::BatchItem;
use crate::models::candidate::JobContext;
use crate::models::history::HistorySession;
use crate::storage::{KeyValueStore, StorageError};

pub const HISTORY_KEY: &str = "screener:history";
pub const MAX_SESSIONS: usize = 20;

/// Rounded mean over completed items. `None` when nothing completed.
pub fn average_score(items: &[BatchItem]) -> Option<u32> {
    let scores: Vec<u32> = items.iter().filter_map(BatchItem::completed_score).collect();
    if scores.is_empty() {
        return None;
    }
    let total: u64 = scores.iter().map(|&s| u64::from(s)).sum();
    Some((total as f64 / scores.len() as f64).round() as u32)
}

/// Copy of the sessions with every file payload blanked. Used as the
/// fallback write when the full list does not fit.
fn strip_file_content(sessions: &[HistorySession]) -> Vec<HistorySession> {
    sessions
        .iter()
        .cloned()
        .map(|mut session| {
            for item in &mut session.items {
                item.file.content.clear();
            }
            session
        })
        .collect()
}

#[derive(Clone)]
pub struct HistoryStore {
    store: Arc<dyn KeyValueStore>,
    /// Serialises list → persist cycles; shared by every clone.
    write_lock: Arc<Mutex<()>>,
}

impl HistoryStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Records a finished batch. Returns `None` without touching storage
    /// when no item completed.
    pub async fn save(
        &self,
        job: &JobContext,
        items: &[BatchItem],
    ) -> Result<Option<HistorySession>, StorageError> {
        let Some(average_score) = average_score(items) else {
            info!("No completed candidates; history not updated");
            return Ok(None);
        };

        let session = HistorySession {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            job_title: job.title.clone(),
            job_description: job.description.clone(),
            items: items.to_vec(),
            total_candidates: items.len(),
            average_score,
        };

        let _guard = self.write_lock.lock().await;
        let mut sessions = self.list().await?;
        sessions.insert(0, session.clone());
        sessions.truncate(MAX_SESSIONS);
        self.persist(&sessions).await?;

        info!(
            "Saved history session {} ({} candidates, average {})",
            session.id, session.total_candidates, session.average_score
        );
        Ok(Some(session))
    }

    /// Sessions newest-first. Unreadable stored data is treated as empty.
    pub async fn list(&self) -> Result<Vec<HistorySession>, StorageError> {
        let Some(raw) = self.store.get(HISTORY_KEY).await? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str::<Vec<HistorySession>>(&raw) {
            Ok(sessions) => Ok(sessions),
            Err(e) => {
                warn!("Discarding unreadable history: {e}");
                Ok(Vec::new())
            }
        }
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<HistorySession>, StorageError> {
        Ok(self.list().await?.into_iter().find(|s| s.id == id))
    }

    /// Returns an owned copy of a session to seed a new working batch.
    pub async fn restore(&self, id: Uuid) -> Result<Option<HistorySession>, StorageError> {
        self.get(id).await
    }

    /// Returns `false` if no session had this id.
    pub async fn delete(&self, id: Uuid) -> Result<bool, StorageError> {
        let _guard = self.write_lock.lock().await;
        let mut sessions = self.list().await?;
        let before = sessions.len();
        sessions.retain(|s| s.id != id);
        if sessions.len() == before {
            return Ok(false);
        }
        self.persist(&sessions).await?;
        info!("Deleted history session {id}");
        Ok(true)
    }

    pub async fn clear(&self) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;
        self.store.delete(HISTORY_KEY).await?;
        info!("History cleared");
        Ok(())
    }

    /// Writes the list; on a quota failure retries once with file payloads
    /// stripped.
    async fn persist(&self, sessions: &[HistorySession]) -> Result<(), StorageError> {
        let payload = serde_json::to_string(sessions)?;
        match self.store.set(HISTORY_KEY, &payload).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_quota_exceeded() => {
                warn!("History write exceeded storage quota; retrying without file contents");
                let stripped = serde_json::to_string(&strip_file_content(sessions))?;
                self.store.set(HISTORY_KEY, &stripped).await
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::models::batch::ItemStatus;
    use crate::models::fixtures::{completed_item, failed_item, job};
    use crate::storage::MemoryStore;

    fn history(store: Arc<MemoryStore>) -> HistoryStore {
        HistoryStore::new(store)
    }

    /// Hands control back to the runtime before every read, so concurrent
    /// callers interleave between their read and their write.
    #[derive(Default)]
    struct YieldingStore {
        inner: MemoryStore,
    }

    #[async_trait]
    impl KeyValueStore for YieldingStore {
        async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            tokio::task::yield_now().await;
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
            self.inner.set(key, value).await
        }

        async fn delete(&self, key: &str) -> Result<(), StorageError> {
            self.inner.delete(key).await
        }
    }

    #[tokio::test]
    async fn test_concurrent_saves_keep_every_session() {
        let history = HistoryStore::new(Arc::new(YieldingStore::default()));
        let other = history.clone();
        let first = vec![completed_item("a", 70)];
        let second = vec![completed_item("b", 90)];

        let (job_a, job_b) = (job(), job());
        let (a, b) = tokio::join!(history.save(&job_a, &first), other.save(&job_b, &second));
        let a = a.unwrap().unwrap();
        let b = b.unwrap().unwrap();

        let ids: Vec<Uuid> = history.list().await.unwrap().iter().map(|s| s.id).collect();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&a.id));
        assert!(ids.contains(&b.id));
    }

    #[tokio::test]
    async fn test_delete_racing_save_keeps_new_session() {
        let history = HistoryStore::new(Arc::new(YieldingStore::default()));
        let old = history
            .save(&job(), &[completed_item("a", 50)])
            .await
            .unwrap()
            .unwrap();

        let new_items = vec![completed_item("b", 80)];
        let new_job = job();
        let (deleted, saved) = tokio::join!(history.delete(old.id), history.save(&new_job, &new_items));
        assert!(deleted.unwrap());
        let saved = saved.unwrap().unwrap();

        let sessions = history.list().await.unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].id, saved.id);
    }

    #[test]
    fn test_average_score_rounds_mean_of_completed() {
        let items = vec![
            completed_item("a", 80),
            completed_item("b", 60),
            failed_item("c"),
            completed_item("d", 100),
        ];
        assert_eq!(average_score(&items), Some(80));
    }

    #[test]
    fn test_average_score_rounds_half_up() {
        let items = vec![completed_item("a", 70), completed_item("b", 71)];
        assert_eq!(average_score(&items), Some(71));
    }

    #[test]
    fn test_average_score_ignores_completed_without_result() {
        let mut odd = completed_item("a", 90);
        odd.result = None;
        assert_eq!(average_score(&[odd]), None);
    }

    #[tokio::test]
    async fn test_save_without_completed_items_is_noop() {
        let store = Arc::new(MemoryStore::new());
        let history = history(store.clone());
        let saved = history
            .save(&job(), &[failed_item("a"), failed_item("b")])
            .await
            .unwrap();
        assert!(saved.is_none());
        assert_eq!(store.get(HISTORY_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_save_records_summary() {
        let history = history(Arc::new(MemoryStore::new()));
        let items = vec![
            completed_item("a", 80),
            completed_item("b", 60),
            completed_item("c", 100),
            failed_item("d"),
        ];
        let session = history.save(&job(), &items).await.unwrap().unwrap();
        assert_eq!(session.average_score, 80);
        assert_eq!(session.total_candidates, 4);
        assert_eq!(session.job_title, "Backend Engineer");

        let listed = history.list().await.unwrap();
        assert_eq!(listed, vec![session]);
    }

    #[tokio::test]
    async fn test_history_is_capped_newest_first() {
        let history = history(Arc::new(MemoryStore::new()));
        let mut ids = Vec::new();
        for i in 0..=MAX_SESSIONS {
            let session = history
                .save(&job(), &[completed_item(&format!("c{i}"), 50)])
                .await
                .unwrap()
                .unwrap();
            ids.push(session.id);
        }

        let listed = history.list().await.unwrap();
        assert_eq!(listed.len(), MAX_SESSIONS);
        assert_eq!(listed[0].id, ids[MAX_SESSIONS]);
        assert!(listed.iter().all(|s| s.id != ids[0]), "oldest was not evicted");
    }

    #[tokio::test]
    async fn test_quota_failure_retries_with_stripped_content() {
        let mut items = vec![completed_item("a", 90), completed_item("b", 70)];
        for item in &mut items {
            item.file.content = "x".repeat(500);
        }
        let full_len = {
            let probe = history(Arc::new(MemoryStore::new()));
            probe.save(&job(), &items).await.unwrap();
            probe.store.get(HISTORY_KEY).await.unwrap().unwrap().len()
        };
        // Room for the stripped payload but not the full one.
        let store = Arc::new(MemoryStore::with_capacity(HISTORY_KEY.len() + full_len - 100));
        let history = history(store);

        let session = history.save(&job(), &items).await.unwrap().unwrap();
        let listed = history.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        let stored = &listed[0];
        assert_eq!(stored.id, session.id);
        assert_eq!(stored.average_score, 80);
        for (stored_item, original) in stored.items.iter().zip(&items) {
            assert!(stored_item.file.content.is_empty());
            assert_eq!(stored_item.file.id, original.file.id);
            assert_eq!(stored_item.file.display_name, original.file.display_name);
            assert_eq!(stored_item.status, ItemStatus::Completed);
            assert_eq!(stored_item.result, original.result);
        }
        // The returned session keeps the full content.
        assert!(!session.items[0].file.content.is_empty());
    }

    #[tokio::test]
    async fn test_quota_failure_after_strip_surfaces_and_keeps_old_data() {
        let store = Arc::new(MemoryStore::new());
        let seeded = history(store.clone());
        let first = seeded
            .save(&job(), &[completed_item("a", 40)])
            .await
            .unwrap()
            .unwrap();
        let existing = store.get(HISTORY_KEY).await.unwrap().unwrap();

        let tight = Arc::new(MemoryStore::with_capacity(HISTORY_KEY.len() + existing.len()));
        tight.set(HISTORY_KEY, &existing).await.unwrap();
        let history = history(tight.clone());

        let err = history
            .save(&job(), &[completed_item("b", 90)])
            .await
            .unwrap_err();
        assert!(err.is_quota_exceeded());
        let listed = history.list().await.unwrap();
        assert_eq!(listed, vec![first]);
    }

    #[tokio::test]
    async fn test_delete_and_clear() {
        let history = history(Arc::new(MemoryStore::new()));
        let a = history.save(&job(), &[completed_item("a", 10)]).await.unwrap().unwrap();
        let b = history.save(&job(), &[completed_item("b", 20)]).await.unwrap().unwrap();

        assert!(history.delete(a.id).await.unwrap());
        assert!(!history.delete(a.id).await.unwrap());
        let listed = history.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, b.id);

        history.clear().await.unwrap();
        assert!(history.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_restore_returns_independent_copy() {
        let history = history(Arc::new(MemoryStore::new()));
        let saved = history.save(&job(), &[completed_item("a", 66)]).await.unwrap().unwrap();

        let mut restored = history.restore(saved.id).await.unwrap().unwrap();
        restored.items.clear();
        restored.job_title = "changed".into();

        let stored = history.get(saved.id).await.unwrap().unwrap();
        assert_eq!(stored, saved);
    }

    #[tokio::test]
    async fn test_unreadable_history_treated_as_empty() {
        let store = Arc::new(MemoryStore::new());
        store.set(HISTORY_KEY, "not json").await.unwrap();
        assert!(history(store).list().await.unwrap().is_empty());
    }
}
