use crate::dto::assessment_dto::{
    AssessmentDetail, AssessmentSummary, SubmitAssessmentPayload, SubmitAssessmentResponse,
};
use crate::error::{Error, Result};
use crate::middleware::auth::AuthContext;
use crate::models::assessment::{AnswerReview, Assessment};
use rust_decimal::{Decimal, RoundingStrategy};
use sqlx::PgPool;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Fixed cutoff above which an attempt is marked passed.
pub const PASSING_SCORE: i64 = 70;

#[derive(Debug, sqlx::FromRow)]
struct OptionRow {
    id: Uuid,
    question_id: Uuid,
    is_correct: bool,
}

/// `round(correct / total * 100, 2)`, half away from zero.
pub fn compute_score(correct: usize, total: usize) -> (Decimal, bool) {
    if total == 0 {
        return (Decimal::new(0, 2), false);
    }
    let mut score = (Decimal::from(correct as i64) * Decimal::from(100)
        / Decimal::from(total as i64))
    .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    // Fixed two-decimal rendering, matching the NUMERIC(5,2) column.
    score.rescale(2);
    let passed = score >= Decimal::from(PASSING_SCORE);
    (score, passed)
}

#[derive(Clone)]
pub struct AssessmentService {
    pool: PgPool,
}

impl AssessmentService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Validates and scores a submission, recording the attempt and its
    /// answers in one transaction. Any integrity violation rolls everything
    /// back; a failed submission persists nothing.
    pub async fn submit(
        &self,
        ctx: &AuthContext,
        payload: SubmitAssessmentPayload,
    ) -> Result<SubmitAssessmentResponse> {
        if !ctx.can_access_user(payload.user_id) {
            return Err(Error::Forbidden);
        }
        if payload.answers.is_empty() {
            return Err(Error::Validation("invalid_input".to_string()));
        }

        let mut tx = self.pool.begin().await?;

        let mut option_ids: Vec<Uuid> = payload.answers.iter().map(|a| a.option_id).collect();
        option_ids.sort_unstable();
        option_ids.dedup();

        let option_rows: Vec<OptionRow> = sqlx::query_as(
            r#"SELECT id, question_id, is_correct FROM question_options WHERE id = ANY($1)"#,
        )
        .bind(&option_ids)
        .fetch_all(&mut *tx)
        .await?;
        let options: HashMap<Uuid, OptionRow> =
            option_rows.into_iter().map(|row| (row.id, row)).collect();

        let mut seen_questions: HashSet<Uuid> = HashSet::new();
        let mut correct = 0usize;
        for answer in &payload.answers {
            let option = match options.get(&answer.option_id) {
                Some(option) if option.question_id == answer.question_id => option,
                _ => return Err(Error::Validation("invalid_answer_mapping".to_string())),
            };
            if !seen_questions.insert(answer.question_id) {
                return Err(Error::Validation("duplicate_question".to_string()));
            }
            if option.is_correct {
                correct += 1;
            }
        }

        let total = payload.answers.len();
        let (score, passed) = compute_score(correct, total);

        let assessment: Assessment = sqlx::query_as(
            r#"
            INSERT INTO assessments (id, user_id, finished_at, score, passed)
            VALUES ($1, $2, NOW(), $3, $4)
            RETURNING id, user_id, started_at, finished_at, score, passed
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(payload.user_id)
        .bind(score)
        .bind(passed)
        .fetch_one(&mut *tx)
        .await?;

        for answer in &payload.answers {
            sqlx::query(
                r#"
                INSERT INTO assessment_answers (assessment_id, question_id, chosen_option_id)
                VALUES ($1, $2, $3)
                "#,
            )
            .bind(assessment.id)
            .bind(answer.question_id)
            .bind(answer.option_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::info!(
            assessment_id = %assessment.id,
            user_id = %payload.user_id,
            %score,
            passed,
            "assessment submitted"
        );

        Ok(SubmitAssessmentResponse {
            assessment,
            summary: AssessmentSummary {
                total_questions: total,
                correct,
                score,
                passed,
            },
        })
    }

    pub async fn get(&self, ctx: &AuthContext, assessment_id: Uuid) -> Result<AssessmentDetail> {
        let assessment: Option<Assessment> = sqlx::query_as(
            r#"
            SELECT id, user_id, started_at, finished_at, score, passed
            FROM assessments WHERE id = $1
            "#,
        )
        .bind(assessment_id)
        .fetch_optional(&self.pool)
        .await?;

        let assessment = assessment.ok_or(Error::NotFound)?;
        if !ctx.can_access_user(assessment.user_id) {
            return Err(Error::Forbidden);
        }

        let answers: Vec<AnswerReview> = sqlx::query_as(
            r#"
            SELECT aa.question_id, aa.chosen_option_id, qo.is_correct
            FROM assessment_answers aa
            LEFT JOIN question_options qo ON qo.id = aa.chosen_option_id
            WHERE aa.assessment_id = $1
            "#,
        )
        .bind(assessment_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(AssessmentDetail { assessment, answers })
    }

    pub async fn list_for_user(
        &self,
        ctx: &AuthContext,
        user_id: Uuid,
    ) -> Result<Vec<Assessment>> {
        if !ctx.can_access_user(user_id) {
            return Err(Error::Forbidden);
        }

        let rows: Vec<Assessment> = sqlx::query_as(
            r#"
            SELECT id, user_id, started_at, finished_at, score, passed
            FROM assessments
            WHERE user_id = $1
            ORDER BY finished_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Administrative hard delete; answers cascade.
    pub async fn delete(&self, assessment_id: Uuid) -> Result<()> {
        let result = sqlx::query(r#"DELETE FROM assessments WHERE id = $1"#)
            .bind(assessment_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }
}
