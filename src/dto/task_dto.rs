use crate::models::task::{TaskPriority, TaskStatus};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CreateTaskPayload {
    pub title: String,
    pub project_id: Uuid,
    #[serde(default)]
    pub site_id: Option<Uuid>,
    #[serde(default = "default_priority")]
    pub priority: TaskPriority,
    #[serde(default = "default_status")]
    pub status: TaskStatus,
    #[serde(default)]
    pub assignee_user_id: Option<Uuid>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
}

fn default_priority() -> TaskPriority {
    TaskPriority::Medium
}

fn default_status() -> TaskStatus {
    TaskStatus::Todo
}

/// Partial update. The nullable columns use a double `Option`: an absent
/// field is left untouched, an explicit `null` clears the column. Serde folds
/// a bare `null` into the outer `Option`, so those fields carry their own
/// deserializer.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateTaskPayload {
    pub title: Option<String>,
    pub project_id: Option<Uuid>,
    #[serde(deserialize_with = "present_maybe_null")]
    pub site_id: Option<Option<Uuid>>,
    pub priority: Option<TaskPriority>,
    pub status: Option<TaskStatus>,
    #[serde(deserialize_with = "present_maybe_null")]
    pub assignee_user_id: Option<Option<Uuid>>,
    #[serde(deserialize_with = "present_maybe_null")]
    pub due_date: Option<Option<NaiveDate>>,
}

fn present_maybe_null<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl UpdateTaskPayload {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.project_id.is_none()
            && self.site_id.is_none()
            && self.priority.is_none()
            && self.status.is_none()
            && self.assignee_user_id.is_none()
            && self.due_date.is_none()
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct ListTasksQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub status: Option<TaskStatus>,
    pub project_id: Option<Uuid>,
    pub assignee_id: Option<Uuid>,
    pub search: Option<String>,
}

/// A task joined with the names a board view needs; project is mandatory,
/// site and assignee are not.
#[derive(Debug, Serialize, FromRow)]
pub struct TaskView {
    pub id: Uuid,
    pub title: String,
    pub status: String,
    pub priority: String,
    pub due_date: Option<NaiveDate>,
    pub project_id: Uuid,
    pub project_name: String,
    pub site_id: Option<Uuid>,
    pub site_name: Option<String>,
    pub assignee_user_id: Option<Uuid>,
    pub assignee_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PaginatedTasks {
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
    pub items: Vec<TaskView>,
}
