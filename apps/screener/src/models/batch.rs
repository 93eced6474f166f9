use serde::{Deserialize, Serialize};

use crate::models::analysis::AnalysisResult;
use crate::models::candidate::CandidateFile;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    #[default]
    Idle,
    Analyzing,
    Completed,
    Error,
}

/// Per-file progress record inside a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchItem {
    pub file: CandidateFile,
    pub status: ItemStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<AnalysisResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchItem {
    pub fn idle(file: CandidateFile) -> Self {
        Self {
            file,
            status: ItemStatus::Idle,
            result: None,
            error: None,
        }
    }

    /// Score of a completed item, if it has one.
    pub fn completed_score(&self) -> Option<u32> {
        match (&self.status, &self.result) {
            (ItemStatus::Completed, Some(result)) => Some(result.score),
            _ => None,
        }
    }
}
