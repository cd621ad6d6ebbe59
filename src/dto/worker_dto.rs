use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

/// Nested profile document (`personal` / `identity` / `address` /
/// `employment` / `credentials`, plus whatever extra sections the client
/// sends). Known fields are projected onto worker-table columns; the rest
/// lives in the JSON overlay.
#[derive(Debug, Deserialize)]
pub struct RegisterWorkerPayload {
    pub profile: JsonValue,
    #[serde(default, deserialize_with = "crate::dto::trim_optional_string")]
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateWorkerPayload {
    pub profile: JsonValue,
    #[serde(default, deserialize_with = "crate::dto::trim_optional_string")]
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct ListWorkersQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub search: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct WorkerView {
    pub id: Uuid,
    pub profile: JsonValue,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WorkerSummary {
    pub id: Uuid,
    pub full_name: String,
    pub national_id: String,
    pub phone: String,
    pub email: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct PaginatedWorkers {
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
    pub items: Vec<WorkerSummary>,
}
