use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;

pub type Result<T> = std::result::Result<T, Error>;

/// Every user-visible failure renders as `{"message": <stable key>}` so the
/// calling layer can map keys to localized text without parsing free text.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unauthenticated: {0}")]
    Unauthenticated(&'static str),

    #[error("Forbidden")]
    Forbidden,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Not found")]
    NotFound,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Invalid input: {0}")]
    Invalid(#[from] validator::ValidationErrors),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            Error::Unauthenticated(key) => (StatusCode::UNAUTHORIZED, key.to_string()),
            Error::Forbidden => (StatusCode::FORBIDDEN, "forbidden".to_string()),
            Error::Validation(key) => (StatusCode::BAD_REQUEST, key),
            Error::NotFound => (StatusCode::NOT_FOUND, "not_found".to_string()),
            Error::Conflict(key) => (StatusCode::CONFLICT, key),
            Error::Invalid(err) => {
                tracing::debug!("request validation failed: {}", err);
                (StatusCode::BAD_REQUEST, "invalid_input".to_string())
            }
            Error::Json(err) => {
                tracing::debug!("bad JSON payload: {}", err);
                (StatusCode::BAD_REQUEST, "invalid_input".to_string())
            }
            Error::Database(err) => {
                tracing::error!("database error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error".to_string(),
                )
            }
            Error::Config(msg) | Error::Internal(msg) => {
                tracing::error!("internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error".to_string(),
                )
            }
            Error::Io(err) => {
                tracing::error!("io error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error".to_string(),
                )
            }
        };

        let body = Json(json!({ "message": message }));
        (status, body).into_response()
    }
}

/// Maps a unique-violation constraint name to the taxonomy key the pre-write
/// duplicate checks would have produced. Two requests racing past a pre-check
/// must still surface as 409, not 500.
fn unique_violation_key(constraint: Option<&str>) -> String {
    let key = match constraint {
        Some(name) if name.contains("national_id") => "duplicate_national_id",
        Some(name) if name.starts_with("users_") => "duplicate_phone_or_email",
        Some(name) if name.contains("email") => "duplicate_email",
        _ => "conflict",
    };
    key.to_string()
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Error::NotFound,
            sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
                Error::Conflict(unique_violation_key(db.constraint()))
            }
            sqlx::Error::Database(db) if db.code().as_deref() == Some("23503") => {
                Error::Validation("invalid_reference".to_string())
            }
            other => Error::Database(other),
        }
    }
}

impl From<argon2::password_hash::Error> for Error {
    fn from(err: argon2::password_hash::Error) -> Self {
        Error::Internal(format!("password hash error: {}", err))
    }
}

impl From<jsonwebtoken::errors::Error> for Error {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        Error::Internal(format!("token error: {}", err))
    }
}
