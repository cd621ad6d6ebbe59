use crate::models::user::Role;
use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

pub const TOKEN_ISSUER: &str = "skillgauge-api";
pub const TOKEN_AUDIENCE: &str = "skillgauge-spa";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    pub iss: String,
    pub aud: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Caller identity carried through the request once the bearer token has
/// been verified. Roles are parsed into the closed enum here and nowhere
/// else; unknown role strings are dropped.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub roles: Vec<Role>,
}

impl AuthContext {
    pub fn has_any_role(&self, allowed: &[Role]) -> bool {
        allowed.iter().any(|role| self.roles.contains(role))
    }

    /// Owner-or-elevated: callers may act on their own resources; admins,
    /// project managers and foremen may act on anyone's.
    pub fn can_access_user(&self, user_id: Uuid) -> bool {
        self.user_id == user_id || self.has_any_role(Role::ELEVATED)
    }
}

pub fn issue_token(
    user_id: Uuid,
    roles: &[Role],
    secret: &str,
    expires_hours: i64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = Claims {
        sub: user_id.to_string(),
        exp: (Utc::now() + Duration::hours(expires_hours)).timestamp() as usize,
        iss: TOKEN_ISSUER.to_string(),
        aud: TOKEN_AUDIENCE.to_string(),
        roles: roles.iter().map(|r| r.as_str().to_string()).collect(),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

pub fn verify_token(token: &str, secret: &str) -> Option<AuthContext> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.set_issuer(&[TOKEN_ISSUER]);
    validation.set_audience(&[TOKEN_AUDIENCE]);

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .ok()?;

    let user_id = Uuid::parse_str(&data.claims.sub).ok()?;
    let roles = data
        .claims
        .roles
        .iter()
        .filter_map(|r| Role::parse(r))
        .collect();
    Some(AuthContext { user_id, roles })
}

fn unauthorized(key: &str) -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({ "message": key }))).into_response()
}

fn extract_context(req: &Request) -> Result<AuthContext, Response> {
    let Some(auth_header) = req.headers().get(axum::http::header::AUTHORIZATION) else {
        return Err(unauthorized("missing_token"));
    };
    let Ok(auth_str) = auth_header.to_str() else {
        return Err(unauthorized("invalid_token"));
    };
    let Some(token) = auth_str.strip_prefix("Bearer ") else {
        return Err(unauthorized("invalid_token"));
    };

    let config = crate::config::get_config();
    verify_token(token, &config.jwt_secret).ok_or_else(|| unauthorized("invalid_token"))
}

pub async fn require_auth(mut req: Request, next: Next) -> Response {
    match extract_context(&req) {
        Ok(ctx) => {
            req.extensions_mut().insert(ctx);
            next.run(req).await
        }
        Err(resp) => resp,
    }
}

pub async fn require_admin(mut req: Request, next: Next) -> Response {
    match extract_context(&req) {
        Ok(ctx) => {
            if !ctx.has_any_role(&[Role::Admin]) {
                return (
                    StatusCode::FORBIDDEN,
                    Json(json!({ "message": "forbidden" })),
                )
                    .into_response();
            }
            req.extensions_mut().insert(ctx);
            next.run(req).await
        }
        Err(resp) => resp,
    }
}

/// Gate for task management: admins and project managers only.
pub async fn require_manager(mut req: Request, next: Next) -> Response {
    match extract_context(&req) {
        Ok(ctx) => {
            if !ctx.has_any_role(&[Role::Admin, Role::ProjectManager]) {
                return (
                    StatusCode::FORBIDDEN,
                    Json(json!({ "message": "forbidden" })),
                )
                    .into_response();
            }
            req.extensions_mut().insert(ctx);
            next.run(req).await
        }
        Err(resp) => resp,
    }
}
