use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Singleton record controlling assessment composition and the submission
/// window. Created lazily with defaults on first read.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AssessmentSettings {
    pub question_count: i32,
    pub start_at: Option<DateTime<Utc>>,
    pub end_at: Option<DateTime<Utc>>,
    pub frequency_months: Option<i32>,
    pub updated_at: DateTime<Utc>,
}

pub const DEFAULT_QUESTION_COUNT: i32 = 10;
