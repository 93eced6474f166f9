//! Shared test fixtures.

use serde_json::json;
use uuid::Uuid;

use crate::models::analysis::AnalysisResult;
use crate::models::batch::{BatchItem, ItemStatus};
use crate::models::candidate::{CandidateFile, FileKind, JobContext};

pub fn analysis_json(score: u32) -> serde_json::Value {
    json!({
        "candidateName": "Ada Lovelace",
        "score": score,
        "headline": "Analytical engine pioneer",
        "summary": "Strong mathematical background.",
        "pros": ["Algorithms"],
        "cons": ["No cloud experience"],
        "skillsGap": ["Kubernetes"],
        "personality": {
            "archetype": "Visionary",
            "traits": ["curious", "precise"],
            "communicationStyle": "Written, detailed",
            "cultureFit": "High"
        },
        "recommendation": "HIRE",
        "reasoning": "Exceeds the core requirements."
    })
}

pub fn analysis(name: &str, score: u32) -> AnalysisResult {
    let mut value = analysis_json(score);
    value["candidateName"] = json!(name);
    serde_json::from_value(value).unwrap()
}

pub fn text_file(name: &str, content: &str) -> CandidateFile {
    CandidateFile {
        id: Uuid::new_v4(),
        kind: FileKind::Text,
        content: content.to_string(),
        display_name: name.to_string(),
        mime_type: Some("text/plain".to_string()),
    }
}

pub fn pdf_file(name: &str) -> CandidateFile {
    CandidateFile {
        id: Uuid::new_v4(),
        kind: FileKind::Pdf,
        content: "JVBERi0xLjQK".to_string(),
        display_name: name.to_string(),
        mime_type: Some("application/pdf".to_string()),
    }
}

pub fn job() -> JobContext {
    JobContext {
        title: "Backend Engineer".to_string(),
        description: "Rust, PostgreSQL, distributed systems.".to_string(),
    }
}

pub fn completed_item(name: &str, score: u32) -> BatchItem {
    BatchItem {
        file: text_file(&format!("{name}.txt"), &format!("{name} résumé body")),
        status: ItemStatus::Completed,
        result: Some(analysis(name, score)),
        error: None,
    }
}

pub fn failed_item(name: &str) -> BatchItem {
    BatchItem {
        file: text_file(&format!("{name}.txt"), "unreadable"),
        status: ItemStatus::Error,
        result: None,
        error: Some("provider unavailable".to_string()),
    }
}
