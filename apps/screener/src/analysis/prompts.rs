// Prompt templates for the analysis operations.
// Reuses cross-cutting fragments from llm_client::prompts.

use crate::llm_client::prompts::{output_language_instruction, EVIDENCE_INSTRUCTION};
use crate::models::candidate::JobContext;

/// Fit-assessment prompt. Replace `{job_title}` and `{job_description}`.
pub const ANALYSIS_PROMPT_TEMPLATE: &str = r#"You are a senior technical recruiter screening a candidate for the role below.

JOB TITLE: {job_title}

JOB DESCRIPTION:
{job_description}

Read the candidate's résumé and return a structured assessment:
- candidateName: the candidate's full name as written on the résumé ("Unknown" if absent).
- score: 0–100 fit against the job description. 90+ exceptional, 70–89 strong, 50–69 partial, below 50 weak.
- headline: one line describing the candidate.
- summary: three to five sentences on overall fit.
- pros / cons: concrete strengths and weaknesses relative to the role.
- skillsGap: requirements from the job description the résumé does not demonstrate.
- personality: archetype, traits, communicationStyle and cultureFit inferred from tone and history.
- recommendation: exactly one of HIRE, MAYBE, REJECT.
- reasoning: why the recommendation follows from the evidence."#;

/// Interview-plan prompt. Replace `{job_title}`, `{job_description}`, `{candidate_name}`.
pub const INTERVIEW_PROMPT_TEMPLATE: &str = r#"You are preparing a structured interview with {candidate_name} for the role below.

JOB TITLE: {job_title}

JOB DESCRIPTION:
{job_description}

Using the candidate's résumé, produce an interview plan:
- opening: a short script to open the conversation.
- backgroundQuestions: questions about the candidate's history, each with a topic and optional guidance for the interviewer.
- technicalQuestions: questions probing the skills the role needs, each with the key points a strong answer covers. Prioritise the skills the résumé leaves unproven.
- behavioralQuestions: competency questions with a STAR guide describing what a good answer contains.
- closing: a short script to close the interview."#;

pub const EXTRACT_TEXT_PROMPT: &str = "Transcribe all text in the attached résumé exactly as written. \
    Preserve the reading order and section headings. \
    Return plain text only, with no commentary and no markdown.";

/// Replaces `{name}` placeholders in one left-to-right pass. Inserted
/// values are never rescanned, so user text containing braces is kept.
fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start + 1..];
        let hit = values.iter().find_map(|(name, value)| {
            let after = tail.strip_prefix(*name)?.strip_prefix('}')?;
            Some((*value, after))
        });
        match hit {
            Some((value, after)) => {
                out.push_str(value);
                rest = after;
            }
            None => {
                out.push('{');
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    out
}

fn job_title(job: &JobContext) -> &str {
    if job.title.trim().is_empty() {
        "(untitled role)"
    } else {
        job.title.trim()
    }
}

pub fn analysis_prompt(job: &JobContext, language: &str) -> String {
    let body = fill(
        ANALYSIS_PROMPT_TEMPLATE,
        &[
            ("job_title", job_title(job)),
            ("job_description", job.description.trim()),
        ],
    );
    format!(
        "{}\n\n{}\n\n{}",
        body,
        EVIDENCE_INSTRUCTION,
        output_language_instruction(language)
    )
}

pub fn interview_prompt(job: &JobContext, candidate_name: &str, language: &str) -> String {
    let body = fill(
        INTERVIEW_PROMPT_TEMPLATE,
        &[
            ("job_title", job_title(job)),
            ("job_description", job.description.trim()),
            ("candidate_name", candidate_name),
        ],
    );
    format!(
        "{}\n\n{}\n\n{}",
        body,
        EVIDENCE_INSTRUCTION,
        output_language_instruction(language)
    )
}

/// Appends a plain-text résumé to an instruction prompt.
pub fn with_resume_text(prompt: &str, resume_text: &str) -> String {
    format!("{prompt}\n\nCANDIDATE RÉSUMÉ:\n{resume_text}")
}
