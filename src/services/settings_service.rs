use crate::dto::settings_dto::UpdateSettingsPayload;
use crate::error::{Error, Result};
use crate::models::settings::{AssessmentSettings, DEFAULT_QUESTION_COUNT};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;

fn parse_timestamp(raw: &str, key: &str) -> Result<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    // Bare dates are accepted as midnight UTC.
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(ts) = date.and_hms_opt(0, 0, 0) {
            return Ok(ts.and_utc());
        }
    }
    Err(Error::Validation(key.to_string()))
}

/// Validates the payload into a typed window; `end_at` must come strictly
/// after `start_at` when both are present.
pub fn validate_settings(
    payload: &UpdateSettingsPayload,
) -> Result<(Option<DateTime<Utc>>, Option<DateTime<Utc>>)> {
    if payload.question_count < 1 {
        return Err(Error::Validation("invalid_question_count".to_string()));
    }
    let start_at = payload
        .start_at
        .as_deref()
        .map(|raw| parse_timestamp(raw, "invalid_start_at"))
        .transpose()?;
    let end_at = payload
        .end_at
        .as_deref()
        .map(|raw| parse_timestamp(raw, "invalid_end_at"))
        .transpose()?;
    if let (Some(start), Some(end)) = (start_at, end_at) {
        if end <= start {
            return Err(Error::Validation("end_before_start".to_string()));
        }
    }
    Ok((start_at, end_at))
}

#[derive(Clone)]
pub struct SettingsService {
    pool: PgPool,
}

impl SettingsService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns the singleton, creating it with defaults on first read.
    pub async fn get(&self) -> Result<AssessmentSettings> {
        let existing: Option<AssessmentSettings> = sqlx::query_as(
            r#"
            SELECT question_count, start_at, end_at, frequency_months, updated_at
            FROM assessment_settings WHERE id = TRUE
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        if let Some(settings) = existing {
            return Ok(settings);
        }

        // Two concurrent first reads may race; ON CONFLICT keeps that benign.
        let created: AssessmentSettings = sqlx::query_as(
            r#"
            INSERT INTO assessment_settings (id, question_count)
            VALUES (TRUE, $1)
            ON CONFLICT (id) DO UPDATE SET question_count = assessment_settings.question_count
            RETURNING question_count, start_at, end_at, frequency_months, updated_at
            "#,
        )
        .bind(DEFAULT_QUESTION_COUNT)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    pub async fn update(&self, payload: UpdateSettingsPayload) -> Result<AssessmentSettings> {
        let (start_at, end_at) = validate_settings(&payload)?;

        let updated: AssessmentSettings = sqlx::query_as(
            r#"
            INSERT INTO assessment_settings (id, question_count, start_at, end_at, frequency_months, updated_at)
            VALUES (TRUE, $1, $2, $3, $4, NOW())
            ON CONFLICT (id) DO UPDATE
            SET question_count = EXCLUDED.question_count,
                start_at = EXCLUDED.start_at,
                end_at = EXCLUDED.end_at,
                frequency_months = EXCLUDED.frequency_months,
                updated_at = NOW()
            RETURNING question_count, start_at, end_at, frequency_months, updated_at
            "#,
        )
        .bind(payload.question_count)
        .bind(start_at)
        .bind(end_at)
        .bind(payload.frequency_months)
        .fetch_one(&self.pool)
        .await?;

        Ok(updated)
    }
}
