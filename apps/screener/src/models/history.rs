use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::batch::BatchItem;

/// A persisted record of one finished batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistorySession {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub job_title: String,
    pub job_description: String,
    pub items: Vec<BatchItem>,
    pub total_candidates: usize,
    pub average_score: u32,
}
