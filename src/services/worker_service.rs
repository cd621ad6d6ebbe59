use crate::dto::worker_dto::{
    ListWorkersQuery, PaginatedWorkers, RegisterWorkerPayload, UpdateWorkerPayload, WorkerSummary,
    WorkerView,
};
use crate::error::{Error, Result};
use crate::services::worker_schema::{merge_profile, WorkerTableSchema};
use crate::utils::crypto::hash_password;
use crate::utils::phone::is_local_phone;
use serde_json::Value as JsonValue;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;
use validator::ValidateEmail;

/// Required profile fields pulled out of the nested document during
/// validation.
#[derive(Debug, PartialEq)]
pub struct ProfileFields {
    pub full_name: String,
    pub national_id: String,
    pub phone: String,
    pub email: Option<String>,
}

fn profile_str(profile: &JsonValue, section: &str, field: &str) -> Option<String> {
    profile
        .get(section)
        .and_then(|s| s.get(field))
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Shape checks performed before any write: full name present, national ID
/// exactly 13 digits, local phone format, well-formed email when supplied.
pub fn validate_profile(profile: &JsonValue) -> Result<ProfileFields> {
    let full_name = profile_str(profile, "personal", "full_name")
        .ok_or_else(|| Error::Validation("missing_full_name".to_string()))?;

    let national_id = profile_str(profile, "identity", "national_id").unwrap_or_default();
    if national_id.len() != 13 || !national_id.chars().all(|c| c.is_ascii_digit()) {
        return Err(Error::Validation("invalid_national_id_length".to_string()));
    }

    let phone = profile_str(profile, "personal", "phone").unwrap_or_default();
    if !is_local_phone(&phone) {
        return Err(Error::Validation("invalid_phone".to_string()));
    }

    let email = profile_str(profile, "personal", "email");
    if let Some(email) = &email {
        if !email.validate_email() {
            return Err(Error::Validation("invalid_email".to_string()));
        }
    }

    Ok(ProfileFields {
        full_name,
        national_id,
        phone,
        email,
    })
}

/// Worker store: relational row of evolving shape (writes projected through
/// the immutable schema descriptor) overlaid with a free-form JSON profile.
#[derive(Clone)]
pub struct WorkerService {
    pool: PgPool,
    schema: WorkerTableSchema,
}

impl WorkerService {
    /// Loads the schema descriptor and makes sure the overlay table exists.
    /// Re-initializing (a fresh `init`) is the only way to pick up schema
    /// changes.
    pub async fn init(pool: PgPool) -> Result<Self> {
        let schema = WorkerTableSchema::load(&pool).await?;
        if let Err(err) = ensure_overlay_table(&pool).await {
            tracing::warn!("could not ensure worker_profiles table: {}", err);
        }
        Ok(Self { pool, schema })
    }

    pub fn with_schema(pool: PgPool, schema: WorkerTableSchema) -> Self {
        Self { pool, schema }
    }

    pub async fn register(&self, payload: RegisterWorkerPayload) -> Result<WorkerView> {
        let password = payload
            .password
            .ok_or_else(|| Error::Validation("missing_password".to_string()))?;
        let fields = validate_profile(&payload.profile)?;

        self.check_duplicates(&fields, None).await?;

        let worker_id = Uuid::new_v4();
        let password_hash = hash_password(&password)?;
        let projected = self.schema.project(&payload.profile);

        let mut tx = self.pool.begin().await?;

        let mut insert = QueryBuilder::<Postgres>::new("INSERT INTO workers (id");
        for (mapping, _) in &projected {
            insert.push(", ").push(mapping.column);
        }
        insert.push(") VALUES (").push_bind(worker_id);
        for (mapping, value) in &projected {
            insert.push(", ").push_bind(value);
            if let Some(cast) = mapping.cast {
                insert.push("::").push(cast);
            }
        }
        insert.push(")");
        insert.build().execute(&mut *tx).await?;

        sqlx::query(
            r#"INSERT INTO worker_accounts (worker_id, password_hash) VALUES ($1, $2)"#,
        )
        .bind(worker_id)
        .bind(&password_hash)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO worker_profiles (worker_id, profile)
            VALUES ($1, $2)
            ON CONFLICT (worker_id) DO UPDATE SET profile = EXCLUDED.profile, updated_at = NOW()
            "#,
        )
        .bind(worker_id)
        .bind(&payload.profile)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(%worker_id, "worker registered");
        self.get(worker_id).await?.ok_or(Error::NotFound)
    }

    pub async fn update(&self, worker_id: Uuid, payload: UpdateWorkerPayload) -> Result<WorkerView> {
        let existing: Option<Uuid> = sqlx::query_scalar(r#"SELECT id FROM workers WHERE id = $1"#)
            .bind(worker_id)
            .fetch_optional(&self.pool)
            .await?;
        if existing.is_none() {
            return Err(Error::NotFound);
        }

        let fields = validate_profile(&payload.profile)?;
        self.check_duplicates(&fields, Some(worker_id)).await?;

        let projected = self.schema.project(&payload.profile);

        let mut tx = self.pool.begin().await?;

        let mut update = QueryBuilder::<Postgres>::new("UPDATE workers SET updated_at = NOW()");
        for (mapping, value) in &projected {
            update
                .push(", ")
                .push(mapping.column)
                .push(" = ")
                .push_bind(value);
            if let Some(cast) = mapping.cast {
                update.push("::").push(cast);
            }
        }
        update.push(" WHERE id = ").push_bind(worker_id);
        update.build().execute(&mut *tx).await?;

        if let Some(password) = &payload.password {
            let password_hash = hash_password(password)?;
            sqlx::query(
                r#"
                INSERT INTO worker_accounts (worker_id, password_hash)
                VALUES ($1, $2)
                ON CONFLICT (worker_id) DO UPDATE
                SET password_hash = EXCLUDED.password_hash, updated_at = NOW()
                "#,
            )
            .bind(worker_id)
            .bind(&password_hash)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        self.save_overlay(worker_id, &payload.profile).await;
        self.get(worker_id).await?.ok_or(Error::NotFound)
    }

    /// Merged view: relational columns win, overlay fills the rest. Returns
    /// `None` when the worker row itself does not exist.
    pub async fn get(&self, worker_id: Uuid) -> Result<Option<WorkerView>> {
        let relational: Option<JsonValue> =
            sqlx::query_scalar(r#"SELECT to_jsonb(w) FROM workers w WHERE id = $1"#)
                .bind(worker_id)
                .fetch_optional(&self.pool)
                .await?;

        let Some(relational) = relational else {
            return Ok(None);
        };

        let overlay = self.fetch_overlay(worker_id).await;
        let profile = merge_profile(&relational, overlay);

        Ok(Some(WorkerView {
            id: worker_id,
            profile,
        }))
    }

    pub async fn list(&self, query: ListWorkersQuery) -> Result<PaginatedWorkers> {
        let (limit, offset) = super::page_window(query.limit, query.offset);
        let search = query.search.as_ref().map(|s| format!("%{}%", s));

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM workers
            WHERE ($1::text IS NULL
                   OR full_name ILIKE $1 OR national_id ILIKE $1 OR phone ILIKE $1)
            "#,
        )
        .bind(&search)
        .fetch_one(&self.pool)
        .await?;

        let items: Vec<WorkerSummary> = sqlx::query_as(
            r#"
            SELECT id, full_name, national_id, phone, email, status, created_at
            FROM workers
            WHERE ($1::text IS NULL
                   OR full_name ILIKE $1 OR national_id ILIKE $1 OR phone ILIKE $1)
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(&search)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(PaginatedWorkers {
            total,
            limit,
            offset,
            items,
        })
    }

    /// Hard delete; the account row and overlay cascade with the worker.
    pub async fn delete(&self, worker_id: Uuid) -> Result<()> {
        let result = sqlx::query(r#"DELETE FROM workers WHERE id = $1"#)
            .bind(worker_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    /// Upserts the JSON overlay. The overlay is an auxiliary store: if it is
    /// unavailable the failure is logged and the outer operation proceeds
    /// relational-only.
    pub async fn save_overlay(&self, worker_id: Uuid, profile: &JsonValue) {
        let outcome = sqlx::query(
            r#"
            INSERT INTO worker_profiles (worker_id, profile)
            VALUES ($1, $2)
            ON CONFLICT (worker_id) DO UPDATE SET profile = EXCLUDED.profile, updated_at = NOW()
            "#,
        )
        .bind(worker_id)
        .bind(profile)
        .execute(&self.pool)
        .await;

        if let Err(err) = outcome {
            tracing::warn!(%worker_id, "profile overlay unavailable, stored relational-only: {}", err);
        }
    }

    async fn fetch_overlay(&self, worker_id: Uuid) -> JsonValue {
        match sqlx::query_scalar::<_, JsonValue>(
            r#"SELECT profile FROM worker_profiles WHERE worker_id = $1"#,
        )
        .bind(worker_id)
        .fetch_optional(&self.pool)
        .await
        {
            Ok(Some(profile)) => profile,
            Ok(None) => JsonValue::Null,
            Err(err) => {
                tracing::warn!(%worker_id, "profile overlay unavailable on read: {}", err);
                JsonValue::Null
            }
        }
    }

    async fn check_duplicates(&self, fields: &ProfileFields, exclude: Option<Uuid>) -> Result<()> {
        let national_dup: Option<Uuid> = sqlx::query_scalar(
            r#"SELECT id FROM workers WHERE national_id = $1 AND ($2::uuid IS NULL OR id <> $2)"#,
        )
        .bind(&fields.national_id)
        .bind(exclude)
        .fetch_optional(&self.pool)
        .await?;
        if national_dup.is_some() {
            return Err(Error::Conflict("duplicate_national_id".to_string()));
        }

        if let Some(email) = &fields.email {
            let email_dup: Option<Uuid> = sqlx::query_scalar(
                r#"
                SELECT id FROM workers
                WHERE email IS NOT NULL AND LOWER(email) = LOWER($1)
                  AND ($2::uuid IS NULL OR id <> $2)
                "#,
            )
            .bind(email)
            .bind(exclude)
            .fetch_optional(&self.pool)
            .await?;
            if email_dup.is_some() {
                return Err(Error::Conflict("duplicate_email".to_string()));
            }
        }

        Ok(())
    }
}

pub async fn ensure_overlay_table(pool: &PgPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS worker_profiles (
            worker_id UUID PRIMARY KEY REFERENCES workers(id) ON DELETE CASCADE,
            profile JSONB NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_profile() -> JsonValue {
        json!({
            "personal": {
                "full_name": "Somchai Jaidee",
                "phone": "0812345678",
                "email": "somchai@example.th"
            },
            "identity": { "national_id": "1234567890123" }
        })
    }

    #[test]
    fn accepts_a_complete_profile() {
        let fields = validate_profile(&valid_profile()).unwrap();
        assert_eq!(fields.full_name, "Somchai Jaidee");
        assert_eq!(fields.national_id, "1234567890123");
        assert_eq!(fields.phone, "0812345678");
        assert_eq!(fields.email.as_deref(), Some("somchai@example.th"));
    }

    #[test]
    fn rejects_missing_full_name() {
        let mut profile = valid_profile();
        profile["personal"]["full_name"] = json!("   ");
        let err = validate_profile(&profile).unwrap_err();
        assert!(matches!(err, Error::Validation(key) if key == "missing_full_name"));
    }

    #[test]
    fn rejects_short_national_id() {
        let mut profile = valid_profile();
        profile["identity"]["national_id"] = json!("123456789012");
        let err = validate_profile(&profile).unwrap_err();
        assert!(matches!(err, Error::Validation(key) if key == "invalid_national_id_length"));
    }

    #[test]
    fn rejects_non_digit_national_id() {
        let mut profile = valid_profile();
        profile["identity"]["national_id"] = json!("123456789012x");
        let err = validate_profile(&profile).unwrap_err();
        assert!(matches!(err, Error::Validation(key) if key == "invalid_national_id_length"));
    }

    #[test]
    fn rejects_non_local_phone() {
        let mut profile = valid_profile();
        profile["personal"]["phone"] = json!("+66812345678");
        let err = validate_profile(&profile).unwrap_err();
        assert!(matches!(err, Error::Validation(key) if key == "invalid_phone"));
    }

    #[test]
    fn rejects_malformed_email() {
        let mut profile = valid_profile();
        profile["personal"]["email"] = json!("not-an-email");
        let err = validate_profile(&profile).unwrap_err();
        assert!(matches!(err, Error::Validation(key) if key == "invalid_email"));
    }

    #[test]
    fn email_is_optional() {
        let mut profile = valid_profile();
        profile["personal"]
            .as_object_mut()
            .unwrap()
            .remove("email");
        let fields = validate_profile(&profile).unwrap();
        assert_eq!(fields.email, None);
    }
}
