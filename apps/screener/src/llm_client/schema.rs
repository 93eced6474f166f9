//! Response schemas sent with structured-output requests, in the provider's
//! OpenAPI subset. Field names must match the serde models in
//! `models::analysis`.

use serde_json::{json, Value};

fn string_list() -> Value {
    json!({ "type": "ARRAY", "items": { "type": "STRING" } })
}

pub fn analysis_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "candidateName": { "type": "STRING" },
            "score": { "type": "INTEGER", "minimum": 0, "maximum": 100 },
            "headline": { "type": "STRING" },
            "summary": { "type": "STRING" },
            "pros": string_list(),
            "cons": string_list(),
            "skillsGap": string_list(),
            "personality": {
                "type": "OBJECT",
                "properties": {
                    "archetype": { "type": "STRING" },
                    "traits": string_list(),
                    "communicationStyle": { "type": "STRING" },
                    "cultureFit": { "type": "STRING" }
                },
                "required": ["archetype", "traits", "communicationStyle", "cultureFit"]
            },
            "recommendation": { "type": "STRING", "enum": ["HIRE", "MAYBE", "REJECT"] },
            "reasoning": { "type": "STRING" }
        },
        "required": [
            "candidateName", "score", "headline", "summary", "pros", "cons",
            "skillsGap", "personality", "recommendation", "reasoning"
        ],
        "propertyOrdering": [
            "candidateName", "score", "headline", "summary", "pros", "cons",
            "skillsGap", "personality", "recommendation", "reasoning"
        ]
    })
}

pub fn interview_plan_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "opening": { "type": "STRING" },
            "backgroundQuestions": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "topic": { "type": "STRING" },
                        "question": { "type": "STRING" },
                        "guidance": { "type": "STRING" }
                    },
                    "required": ["topic", "question"]
                }
            },
            "technicalQuestions": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "skill": { "type": "STRING" },
                        "question": { "type": "STRING" },
                        "expectedKeyPoints": string_list()
                    },
                    "required": ["skill", "question", "expectedKeyPoints"]
                }
            },
            "behavioralQuestions": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "competency": { "type": "STRING" },
                        "question": { "type": "STRING" },
                        "starGuide": { "type": "STRING" }
                    },
                    "required": ["competency", "question", "starGuide"]
                }
            },
            "closing": { "type": "STRING" }
        },
        "required": [
            "opening", "backgroundQuestions", "technicalQuestions",
            "behavioralQuestions", "closing"
        ]
    })
}
