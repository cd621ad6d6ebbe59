use crate::config::get_config;
use crate::dto::auth_dto::{LoginPayload, LoginResponse, SignupPayload, UserView};
use crate::dto::user_dto::{
    CreateUserPayload, ListUsersQuery, PaginatedUsers, UpdateUserPayload,
};
use crate::error::{Error, Result};
use crate::middleware::auth::issue_token;
use crate::models::user::{Role, User};
use crate::utils::crypto::{hash_password, verify_password};
use crate::utils::phone::normalize_phone;
use sqlx::PgPool;
use uuid::Uuid;

fn valid_phone_charset(phone: &str) -> bool {
    let rest_ok = phone.chars().skip(1).all(|c| c.is_ascii_digit());
    let starts_ok = matches!(phone.chars().next(), Some('+') | Some('0'..='9'));
    let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();
    starts_ok && rest_ok && digits >= 8
}

/// Identity store: platform accounts, credentials and role assignments.
#[derive(Clone)]
pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Public self-registration; new accounts always start with the worker
    /// role.
    pub async fn signup(&self, payload: SignupPayload) -> Result<UserView> {
        if !valid_phone_charset(&payload.phone) {
            return Err(Error::Validation("invalid_phone".to_string()));
        }
        let phone = normalize_phone(&payload.phone);
        let email = payload.email.map(|e| e.to_lowercase());

        self.check_phone_email_free(&phone, email.as_deref(), None)
            .await?;

        let password_hash = hash_password(&payload.password)?;

        let mut tx = self.pool.begin().await?;
        let user: User = sqlx::query_as(
            r#"
            INSERT INTO users (full_name, phone, email, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(payload.full_name.trim())
        .bind(&phone)
        .bind(&email)
        .bind(&password_hash)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO user_roles (user_id, role_id)
            SELECT $1, id FROM roles WHERE key = $2
            "#,
        )
        .bind(user.id)
        .bind(Role::Worker.as_str())
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        tracing::info!(user_id = %user.id, "user signed up");
        Ok(UserView::from_user(user, vec![Role::Worker]))
    }

    /// Phone + password login. Tries the phone exactly as supplied, then in
    /// normalized form, so accounts created either way keep working.
    pub async fn login(&self, payload: LoginPayload) -> Result<LoginResponse> {
        let normalized = normalize_phone(&payload.phone);
        let user: Option<User> = sqlx::query_as(
            r#"SELECT * FROM users WHERE phone = $1 OR phone = $2 LIMIT 1"#,
        )
        .bind(&payload.phone)
        .bind(&normalized)
        .fetch_optional(&self.pool)
        .await?;

        let Some(user) = user else {
            return Err(Error::Unauthenticated("invalid_credentials"));
        };
        // A malformed stored hash reads the same as a wrong password.
        if !verify_password(&payload.password, &user.password_hash).unwrap_or(false) {
            return Err(Error::Unauthenticated("invalid_credentials"));
        }

        let roles = self.fetch_roles(user.id).await?;
        let config = get_config();
        let token = issue_token(user.id, &roles, &config.jwt_secret, config.jwt_expires_hours)?;

        sqlx::query(r#"UPDATE users SET last_login = NOW() WHERE id = $1"#)
            .bind(user.id)
            .execute(&self.pool)
            .await?;

        tracing::info!(user_id = %user.id, "user logged in");
        Ok(LoginResponse {
            token,
            user: UserView::from_user(user, roles),
        })
    }

    pub async fn fetch_roles(&self, user_id: Uuid) -> Result<Vec<Role>> {
        let keys: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT r.key FROM roles r
            JOIN user_roles ur ON ur.role_id = r.id
            WHERE ur.user_id = $1
            ORDER BY r.key
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(keys.iter().filter_map(|k| Role::parse(k)).collect())
    }

    pub async fn get(&self, user_id: Uuid) -> Result<UserView> {
        let user: User = sqlx::query_as(r#"SELECT * FROM users WHERE id = $1"#)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        let roles = self.fetch_roles(user_id).await?;
        Ok(UserView::from_user(user, roles))
    }

    pub async fn list(&self, query: ListUsersQuery) -> Result<PaginatedUsers> {
        let (limit, offset) = super::page_window(query.limit, query.offset);
        let search = query.search.as_ref().map(|s| format!("%{}%", s));

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM users
            WHERE ($1::text IS NULL OR full_name ILIKE $1 OR phone ILIKE $1)
              AND ($2::text IS NULL OR status = $2)
            "#,
        )
        .bind(&search)
        .bind(&query.status)
        .fetch_one(&self.pool)
        .await?;

        let users: Vec<User> = sqlx::query_as(
            r#"
            SELECT * FROM users
            WHERE ($1::text IS NULL OR full_name ILIKE $1 OR phone ILIKE $1)
              AND ($2::text IS NULL OR status = $2)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(&search)
        .bind(&query.status)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let mut items = Vec::with_capacity(users.len());
        for user in users {
            let roles = self.fetch_roles(user.id).await?;
            items.push(UserView::from_user(user, roles));
        }
        Ok(PaginatedUsers {
            total,
            limit,
            offset,
            items,
        })
    }

    /// Admin-side account creation; the role set is taken from the payload
    /// instead of defaulting to worker.
    pub async fn create(&self, payload: CreateUserPayload) -> Result<UserView> {
        if !valid_phone_charset(&payload.phone) {
            return Err(Error::Validation("invalid_phone".to_string()));
        }
        if payload.roles.iter().any(|r| !r.is_grantable()) {
            return Err(Error::Validation("unknown_role".to_string()));
        }
        let phone = normalize_phone(&payload.phone);
        let email = payload.email.map(|e| e.to_lowercase());

        self.check_phone_email_free(&phone, email.as_deref(), None)
            .await?;

        let password_hash = hash_password(&payload.password)?;
        let status = payload.status.unwrap_or_else(|| "active".to_string());

        let mut tx = self.pool.begin().await?;
        let user: User = sqlx::query_as(
            r#"
            INSERT INTO users (full_name, phone, email, password_hash, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(payload.full_name.trim())
        .bind(&phone)
        .bind(&email)
        .bind(&password_hash)
        .bind(&status)
        .fetch_one(&mut *tx)
        .await?;

        let roles = if payload.roles.is_empty() {
            vec![Role::Worker]
        } else {
            payload.roles
        };
        for role in &roles {
            sqlx::query(
                r#"
                INSERT INTO user_roles (user_id, role_id)
                SELECT $1, id FROM roles WHERE key = $2
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(user.id)
            .bind(role.as_str())
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        Ok(UserView::from_user(user, roles))
    }

    pub async fn update(&self, user_id: Uuid, payload: UpdateUserPayload) -> Result<UserView> {
        let existing: User = sqlx::query_as(r#"SELECT * FROM users WHERE id = $1"#)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        let phone = match &payload.phone {
            Some(p) => {
                if !valid_phone_charset(p) {
                    return Err(Error::Validation("invalid_phone".to_string()));
                }
                normalize_phone(p)
            }
            None => existing.phone.clone(),
        };
        // Present-but-empty clears the email; absent keeps the current one.
        let email = match &payload.email {
            Some(e) if e.trim().is_empty() => None,
            Some(e) => Some(e.trim().to_lowercase()),
            None => existing.email.clone(),
        };

        self.check_phone_email_free(&phone, email.as_deref(), Some(user_id))
            .await?;

        let password_hash = match &payload.password {
            Some(p) => hash_password(p)?,
            None => existing.password_hash.clone(),
        };

        let mut tx = self.pool.begin().await?;
        let user: User = sqlx::query_as(
            r#"
            UPDATE users
            SET full_name = $1, phone = $2, email = $3, password_hash = $4,
                status = $5, updated_at = NOW()
            WHERE id = $6
            RETURNING *
            "#,
        )
        .bind(payload.full_name.as_deref().unwrap_or(&existing.full_name))
        .bind(&phone)
        .bind(&email)
        .bind(&password_hash)
        .bind(payload.status.as_deref().unwrap_or(&existing.status))
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        // A role list in the payload replaces the assignment set wholesale.
        if let Some(roles) = &payload.roles {
            if roles.iter().any(|r| !r.is_grantable()) {
                return Err(Error::Validation("unknown_role".to_string()));
            }
            sqlx::query(r#"DELETE FROM user_roles WHERE user_id = $1"#)
                .bind(user_id)
                .execute(&mut *tx)
                .await?;
            for role in roles {
                sqlx::query(
                    r#"
                    INSERT INTO user_roles (user_id, role_id)
                    SELECT $1, id FROM roles WHERE key = $2
                    "#,
                )
                .bind(user_id)
                .bind(role.as_str())
                .execute(&mut *tx)
                .await?;
            }
        }
        tx.commit().await?;

        let roles = self.fetch_roles(user.id).await?;
        Ok(UserView::from_user(user, roles))
    }

    pub async fn delete(&self, user_id: Uuid) -> Result<()> {
        let result = sqlx::query(r#"DELETE FROM users WHERE id = $1"#)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    pub async fn grant_role(&self, user_id: Uuid, role_key: &str) -> Result<Vec<Role>> {
        let role = Role::parse(role_key)
            .filter(Role::is_grantable)
            .ok_or_else(|| Error::Validation("unknown_role".to_string()))?;

        let exists: Option<Uuid> = sqlx::query_scalar(r#"SELECT id FROM users WHERE id = $1"#)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        if exists.is_none() {
            return Err(Error::NotFound);
        }

        sqlx::query(
            r#"
            INSERT INTO user_roles (user_id, role_id)
            SELECT $1, id FROM roles WHERE key = $2
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(role.as_str())
        .execute(&self.pool)
        .await?;

        self.fetch_roles(user_id).await
    }

    pub async fn revoke_role(&self, user_id: Uuid, role_key: &str) -> Result<Vec<Role>> {
        let role = Role::parse(role_key)
            .filter(Role::is_grantable)
            .ok_or_else(|| Error::Validation("unknown_role".to_string()))?;

        sqlx::query(
            r#"
            DELETE FROM user_roles
            WHERE user_id = $1 AND role_id = (SELECT id FROM roles WHERE key = $2)
            "#,
        )
        .bind(user_id)
        .bind(role.as_str())
        .execute(&self.pool)
        .await?;

        self.fetch_roles(user_id).await
    }

    /// Lookup by phone for the signup form's availability check. Matches raw
    /// or normalized, same as login.
    pub async fn find_by_phone(&self, phone: &str) -> Result<Option<UserView>> {
        let normalized = normalize_phone(phone);
        let user: Option<User> = sqlx::query_as(
            r#"SELECT * FROM users WHERE phone = $1 OR phone = $2 LIMIT 1"#,
        )
        .bind(phone)
        .bind(&normalized)
        .fetch_optional(&self.pool)
        .await?;

        match user {
            Some(user) => {
                let roles = self.fetch_roles(user.id).await?;
                Ok(Some(UserView::from_user(user, roles)))
            }
            None => Ok(None),
        }
    }

    async fn check_phone_email_free(
        &self,
        phone: &str,
        email: Option<&str>,
        exclude: Option<Uuid>,
    ) -> Result<()> {
        let taken: Option<Uuid> = sqlx::query_scalar(
            r#"
            SELECT id FROM users
            WHERE (phone = $1 OR ($2::text IS NOT NULL AND LOWER(email) = $2))
              AND ($3::uuid IS NULL OR id <> $3)
            LIMIT 1
            "#,
        )
        .bind(phone)
        .bind(email)
        .bind(exclude)
        .fetch_optional(&self.pool)
        .await?;
        if taken.is_some() {
            return Err(Error::Conflict("duplicate_phone_or_email".to_string()));
        }
        Ok(())
    }
}
