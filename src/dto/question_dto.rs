use crate::models::question::{Question, QuestionOption};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize)]
pub struct OptionPayload {
    pub text: String,
    #[serde(default)]
    pub is_correct: bool,
}

#[derive(Debug, Deserialize)]
pub struct CreateQuestionPayload {
    pub text: String,
    #[serde(default, deserialize_with = "crate::dto::trim_optional_string")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "crate::dto::trim_optional_string")]
    pub difficulty: Option<String>,
    #[serde(default, deserialize_with = "crate::dto::trim_optional_string")]
    pub version: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
    pub options: Vec<OptionPayload>,
}

fn default_active() -> bool {
    true
}

/// Partial update; a supplied `options` array fully replaces the existing
/// options, it is never merged.
#[derive(Debug, Deserialize)]
pub struct UpdateQuestionPayload {
    #[serde(default, deserialize_with = "crate::dto::trim_optional_string")]
    pub text: Option<String>,
    #[serde(default, deserialize_with = "crate::dto::trim_optional_string")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "crate::dto::trim_optional_string")]
    pub difficulty: Option<String>,
    #[serde(default, deserialize_with = "crate::dto::trim_optional_string")]
    pub version: Option<String>,
    pub active: Option<bool>,
    pub options: Option<Vec<OptionPayload>>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct ListQuestionsQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub category: Option<String>,
    pub active: Option<bool>,
    pub search: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OptionView {
    pub id: Uuid,
    pub text: String,
    pub is_correct: bool,
}

#[derive(Debug, Serialize)]
pub struct QuestionView {
    pub id: Uuid,
    pub text: String,
    pub category: Option<String>,
    pub difficulty: Option<String>,
    pub version: Option<String>,
    pub active: bool,
    pub options: Vec<OptionView>,
}

impl QuestionView {
    pub fn from_parts(question: Question, options: Vec<QuestionOption>) -> Self {
        Self {
            id: question.id,
            text: question.text,
            category: question.category,
            difficulty: question.difficulty,
            version: question.version,
            active: question.active,
            options: options
                .into_iter()
                .map(|o| OptionView {
                    id: o.id,
                    text: o.text,
                    is_correct: o.is_correct,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PaginatedQuestions {
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
    pub items: Vec<QuestionView>,
}
