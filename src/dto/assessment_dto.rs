use crate::models::assessment::{AnswerReview, Assessment};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize)]
pub struct AnswerPayload {
    pub question_id: Uuid,
    pub option_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct SubmitAssessmentPayload {
    pub user_id: Uuid,
    pub answers: Vec<AnswerPayload>,
}

#[derive(Debug, Serialize)]
pub struct AssessmentSummary {
    pub total_questions: usize,
    pub correct: usize,
    pub score: Decimal,
    pub passed: bool,
}

#[derive(Debug, Serialize)]
pub struct SubmitAssessmentResponse {
    pub assessment: Assessment,
    pub summary: AssessmentSummary,
}

#[derive(Debug, Serialize)]
pub struct AssessmentDetail {
    #[serde(flatten)]
    pub assessment: Assessment,
    pub answers: Vec<AnswerReview>,
}
