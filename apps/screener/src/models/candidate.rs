use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How a candidate document is handed to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Text,
    Image,
    Pdf,
}

/// A résumé materialized in memory. Never mutated once created.
///
/// `content` holds raw UTF-8 text for `FileKind::Text` and a base64 payload
/// for images and PDFs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateFile {
    pub id: Uuid,
    pub kind: FileKind,
    pub content: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

impl CandidateFile {
    pub fn is_text(&self) -> bool {
        self.kind == FileKind::Text
    }
}

/// The role candidates are screened against.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobContext {
    pub title: String,
    pub description: String,
}
