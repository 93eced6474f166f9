//! Analysis client: builds provider requests for one candidate file and
//! parses the structured answers.
//! All provider traffic goes through llm_client; there are no direct HTTP calls here.

use thiserror::Error;

pub mod client;
pub mod prompts;

pub use client::AnalysisClient;

use crate::llm_client::LlmError;

/// Everything a call needs that the user can change at runtime. Taken as a
/// snapshot so later settings edits do not affect an in-flight batch.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    pub api_key: Option<String>,
    pub temperature: f32,
    pub output_language: String,
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("No valid API key is configured")]
    MissingCredential,

    #[error("Model provider error: {0}")]
    Provider(String),

    #[error("Model response did not match the expected structure: {0}")]
    SchemaViolation(#[from] serde_json::Error),
}

impl AnalysisError {
    /// Batch-fatal errors stop the orchestrator instead of being recorded
    /// on the item.
    pub fn is_batch_fatal(&self) -> bool {
        matches!(self, AnalysisError::MissingCredential)
    }
}

impl From<LlmError> for AnalysisError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::Unauthorized(_) => AnalysisError::MissingCredential,
            other => AnalysisError::Provider(other.to_string()),
        }
    }
}
