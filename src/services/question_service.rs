use crate::dto::question_dto::{
    CreateQuestionPayload, ListQuestionsQuery, OptionPayload, PaginatedQuestions, QuestionView,
    UpdateQuestionPayload,
};
use crate::error::{Error, Result};
use crate::models::question::{Question, QuestionOption};
use sqlx::{PgPool, Postgres, Transaction};
use std::collections::HashMap;
use uuid::Uuid;

/// Invariant enforced before any write: a question carries at least one
/// option and at least one of them is correct.
fn validate_options(options: &[OptionPayload]) -> Result<()> {
    if options.is_empty() || options.iter().any(|o| o.text.trim().is_empty()) {
        return Err(Error::Validation("missing_options".to_string()));
    }
    if !options.iter().any(|o| o.is_correct) {
        return Err(Error::Validation(
            "At least one option must be correct".to_string(),
        ));
    }
    Ok(())
}

#[derive(Clone)]
pub struct QuestionService {
    pool: PgPool,
}

impl QuestionService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, payload: CreateQuestionPayload) -> Result<QuestionView> {
        if payload.text.trim().is_empty() {
            return Err(Error::Validation("missing_question_text".to_string()));
        }
        validate_options(&payload.options)?;

        let mut tx = self.pool.begin().await?;

        let question: Question = sqlx::query_as(
            r#"
            INSERT INTO questions (id, text, category, difficulty, version, active)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, text, category, difficulty, version, active, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(payload.text.trim())
        .bind(&payload.category)
        .bind(&payload.difficulty)
        .bind(&payload.version)
        .bind(payload.active)
        .fetch_one(&mut *tx)
        .await?;

        insert_options(&mut tx, question.id, &payload.options).await?;
        tx.commit().await?;

        let options = self.fetch_options(question.id).await?;
        Ok(QuestionView::from_parts(question, options))
    }

    pub async fn get(&self, question_id: Uuid) -> Result<QuestionView> {
        let question: Option<Question> = sqlx::query_as(
            r#"
            SELECT id, text, category, difficulty, version, active, created_at, updated_at
            FROM questions WHERE id = $1
            "#,
        )
        .bind(question_id)
        .fetch_optional(&self.pool)
        .await?;

        let question = question.ok_or(Error::NotFound)?;
        let options = self.fetch_options(question_id).await?;
        Ok(QuestionView::from_parts(question, options))
    }

    /// Partial update. A supplied `options` array is a full replacement of the
    /// existing options (delete-all, re-insert) within the same transaction.
    pub async fn update(
        &self,
        question_id: Uuid,
        payload: UpdateQuestionPayload,
    ) -> Result<QuestionView> {
        if let Some(text) = &payload.text {
            if text.trim().is_empty() {
                return Err(Error::Validation("missing_question_text".to_string()));
            }
        }
        if let Some(options) = &payload.options {
            validate_options(options)?;
        }

        let mut tx = self.pool.begin().await?;

        let question: Option<Question> = sqlx::query_as(
            r#"
            UPDATE questions
            SET text = COALESCE($1, text),
                category = COALESCE($2, category),
                difficulty = COALESCE($3, difficulty),
                version = COALESCE($4, version),
                active = COALESCE($5, active),
                updated_at = NOW()
            WHERE id = $6
            RETURNING id, text, category, difficulty, version, active, created_at, updated_at
            "#,
        )
        .bind(&payload.text)
        .bind(&payload.category)
        .bind(&payload.difficulty)
        .bind(&payload.version)
        .bind(payload.active)
        .bind(question_id)
        .fetch_optional(&mut *tx)
        .await?;

        let question = question.ok_or(Error::NotFound)?;

        if let Some(options) = &payload.options {
            sqlx::query(r#"DELETE FROM question_options WHERE question_id = $1"#)
                .bind(question_id)
                .execute(&mut *tx)
                .await?;
            insert_options(&mut tx, question_id, options).await?;
        }

        tx.commit().await?;

        let options = self.fetch_options(question_id).await?;
        Ok(QuestionView::from_parts(question, options))
    }

    pub async fn delete(&self, question_id: Uuid) -> Result<()> {
        let result = sqlx::query(r#"DELETE FROM questions WHERE id = $1"#)
            .bind(question_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    /// Conjunctive filters; the total is counted independently of the
    /// pagination window; items are stably ordered on `text`.
    pub async fn list(&self, query: ListQuestionsQuery) -> Result<PaginatedQuestions> {
        let (limit, offset) = super::page_window(query.limit, query.offset);
        let search = query.search.as_ref().map(|s| format!("%{}%", s));

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM questions
            WHERE ($1::text IS NULL OR category = $1)
              AND ($2::bool IS NULL OR active = $2)
              AND ($3::text IS NULL OR text ILIKE $3)
            "#,
        )
        .bind(&query.category)
        .bind(query.active)
        .bind(&search)
        .fetch_one(&self.pool)
        .await?;

        let questions: Vec<Question> = sqlx::query_as(
            r#"
            SELECT id, text, category, difficulty, version, active, created_at, updated_at
            FROM questions
            WHERE ($1::text IS NULL OR category = $1)
              AND ($2::bool IS NULL OR active = $2)
              AND ($3::text IS NULL OR text ILIKE $3)
            ORDER BY text ASC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(&query.category)
        .bind(query.active)
        .bind(&search)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let ids: Vec<Uuid> = questions.iter().map(|q| q.id).collect();
        let option_rows: Vec<QuestionOption> = sqlx::query_as(
            r#"
            SELECT id, question_id, text, is_correct, position
            FROM question_options
            WHERE question_id = ANY($1)
            ORDER BY position ASC
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_question: HashMap<Uuid, Vec<QuestionOption>> = HashMap::new();
        for option in option_rows {
            by_question.entry(option.question_id).or_default().push(option);
        }

        let items = questions
            .into_iter()
            .map(|q| {
                let options = by_question.remove(&q.id).unwrap_or_default();
                QuestionView::from_parts(q, options)
            })
            .collect();

        Ok(PaginatedQuestions {
            total,
            limit,
            offset,
            items,
        })
    }

    async fn fetch_options(&self, question_id: Uuid) -> Result<Vec<QuestionOption>> {
        let options: Vec<QuestionOption> = sqlx::query_as(
            r#"
            SELECT id, question_id, text, is_correct, position
            FROM question_options
            WHERE question_id = $1
            ORDER BY position ASC
            "#,
        )
        .bind(question_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(options)
    }
}

async fn insert_options(
    tx: &mut Transaction<'_, Postgres>,
    question_id: Uuid,
    options: &[OptionPayload],
) -> Result<()> {
    for (position, option) in options.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO question_options (id, question_id, text, is_correct, position)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(question_id)
        .bind(option.text.trim())
        .bind(option.is_correct)
        .bind(position as i32)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}
