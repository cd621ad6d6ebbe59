use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Assessment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub score: Decimal,
    pub passed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AssessmentAnswer {
    pub assessment_id: Uuid,
    pub question_id: Uuid,
    pub chosen_option_id: Uuid,
}

/// Answer row joined with the chosen option's correctness, as returned by
/// the attempt detail endpoint. `is_correct` is null when the option has
/// since been deleted from the bank.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AnswerReview {
    pub question_id: Uuid,
    pub chosen_option_id: Uuid,
    pub is_correct: Option<bool>,
}
