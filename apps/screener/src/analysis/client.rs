use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::analysis::prompts::{
    analysis_prompt, interview_prompt, with_resume_text, EXTRACT_TEXT_PROMPT,
};
use crate::analysis::{AnalysisConfig, AnalysisError};
use crate::llm_client::schema::{analysis_schema, interview_plan_schema};
use crate::llm_client::{strip_json_fences, ContentPart, GenerationRequest, ModelProvider, MODEL};
use crate::models::analysis::{AnalysisResult, InterviewPlan};
use crate::models::candidate::{CandidateFile, FileKind, JobContext};
use crate::settings::clamp_temperature;

/// Thinking budgets per operation. Extraction is transcription, so no
/// reasoning is requested.
const ANALYSIS_THINKING_BUDGET: u32 = 2048;
const INTERVIEW_THINKING_BUDGET: u32 = 4096;
const EXTRACT_THINKING_BUDGET: u32 = 0;

fn default_mime_type(kind: FileKind) -> &'static str {
    match kind {
        FileKind::Pdf => "application/pdf",
        FileKind::Image => "image/png",
        FileKind::Text => "text/plain",
    }
}

/// Builds the ordered content parts: binary documents travel as an inline
/// part after the instructions, text résumés are folded into the prompt.
fn content_parts(prompt: &str, file: &CandidateFile) -> Vec<ContentPart> {
    match file.kind {
        FileKind::Text => vec![ContentPart::Text(with_resume_text(prompt, &file.content))],
        FileKind::Image | FileKind::Pdf => vec![
            ContentPart::Text(prompt.to_string()),
            ContentPart::InlineData {
                mime_type: file
                    .mime_type
                    .clone()
                    .unwrap_or_else(|| default_mime_type(file.kind).to_string()),
                data: file.content.clone(),
            },
        ],
    }
}

#[derive(Clone)]
pub struct AnalysisClient {
    provider: Arc<dyn ModelProvider>,
}

impl AnalysisClient {
    pub fn new(provider: Arc<dyn ModelProvider>) -> Self {
        Self { provider }
    }

    /// Fit assessment and personality profile for one résumé.
    pub async fn analyze(
        &self,
        file: &CandidateFile,
        job: &JobContext,
        config: &AnalysisConfig,
    ) -> Result<AnalysisResult, AnalysisError> {
        let api_key = require_api_key(config)?;
        let prompt = analysis_prompt(job, &config.output_language);
        let request = GenerationRequest {
            model: MODEL,
            parts: content_parts(&prompt, file),
            response_schema: Some(analysis_schema()),
            temperature: clamp_temperature(config.temperature),
            thinking_budget: ANALYSIS_THINKING_BUDGET,
        };

        info!("Analyzing '{}' ({:?})", file.display_name, file.kind);
        let result: AnalysisResult = self.call_json(api_key, &request).await?;
        info!(
            "Analysis of '{}' finished: score={} recommendation={:?}",
            file.display_name, result.score, result.recommendation
        );
        Ok(result)
    }

    pub async fn generate_interview_plan(
        &self,
        file: &CandidateFile,
        job: &JobContext,
        candidate_name: &str,
        config: &AnalysisConfig,
    ) -> Result<InterviewPlan, AnalysisError> {
        let api_key = require_api_key(config)?;
        let prompt = interview_prompt(job, candidate_name, &config.output_language);
        let request = GenerationRequest {
            model: MODEL,
            parts: content_parts(&prompt, file),
            response_schema: Some(interview_plan_schema()),
            temperature: clamp_temperature(config.temperature),
            thinking_budget: INTERVIEW_THINKING_BUDGET,
        };

        info!("Generating interview plan for {candidate_name}");
        self.call_json(api_key, &request).await
    }

    /// Plain text of a résumé. Text files are returned as-is without a
    /// provider call, even when no credential is configured.
    pub async fn extract_raw_text(
        &self,
        file: &CandidateFile,
        config: &AnalysisConfig,
    ) -> Result<String, AnalysisError> {
        if file.is_text() {
            return Ok(file.content.clone());
        }

        let api_key = require_api_key(config)?;
        let request = GenerationRequest {
            model: MODEL,
            parts: content_parts(EXTRACT_TEXT_PROMPT, file),
            response_schema: None,
            temperature: clamp_temperature(config.temperature),
            thinking_budget: EXTRACT_THINKING_BUDGET,
        };

        info!("Extracting text from '{}'", file.display_name);
        let text = self.provider.generate(api_key, &request).await?;
        Ok(text.trim().to_string())
    }

    async fn call_json<T: DeserializeOwned>(
        &self,
        api_key: &str,
        request: &GenerationRequest,
    ) -> Result<T, AnalysisError> {
        let text = self.provider.generate(api_key, request).await?;
        let text = strip_json_fences(&text);
        if text.is_empty() {
            return Err(AnalysisError::Provider("LLM returned empty content".into()));
        }
        debug!("Parsing structured response ({} bytes)", text.len());
        Ok(serde_json::from_str(text)?)
    }
}

fn require_api_key(config: &AnalysisConfig) -> Result<&str, AnalysisError> {
    config
        .api_key
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .ok_or(AnalysisError::MissingCredential)
}
