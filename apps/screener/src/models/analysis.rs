use serde::{Deserialize, Deserializer, Serialize};

/// Final call assigned by the model. Serialized in upper case to match the
/// response schema enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Recommendation {
    Hire,
    Maybe,
    Reject,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Personality {
    pub archetype: String,
    pub traits: Vec<String>,
    pub communication_style: String,
    pub culture_fit: String,
}

/// Structured fit assessment returned for one candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub candidate_name: String,
    /// 0 – 100. Values above 100 are clamped on receipt.
    #[serde(deserialize_with = "deserialize_score")]
    pub score: u32,
    pub headline: String,
    pub summary: String,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
    pub skills_gap: Vec<String>,
    pub personality: Personality,
    pub recommendation: Recommendation,
    pub reasoning: String,
}

fn deserialize_score<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    if !raw.is_finite() || raw < 0.0 {
        return Err(serde::de::Error::custom(format!(
            "score must be a non-negative number, got {raw}"
        )));
    }
    Ok(raw.round().min(100.0) as u32)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackgroundQuestion {
    pub topic: String,
    pub question: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guidance: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnicalQuestion {
    pub skill: String,
    pub question: String,
    pub expected_key_points: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BehavioralQuestion {
    pub competency: String,
    pub question: String,
    pub star_guide: String,
}

/// Structured interview script for a single candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewPlan {
    pub opening: String,
    pub background_questions: Vec<BackgroundQuestion>,
    pub technical_questions: Vec<TechnicalQuestion>,
    pub behavioral_questions: Vec<BehavioralQuestion>,
    pub closing: String,
}
