use crate::dto::task_dto::{
    CreateTaskPayload, ListTasksQuery, PaginatedTasks, TaskView, UpdateTaskPayload,
};
use crate::error::{Error, Result};
use sqlx::PgPool;
use uuid::Uuid;

const TASK_VIEW_SELECT: &str = r#"
    SELECT t.id, t.title, t.status, t.priority, t.due_date,
           t.project_id, p.name AS project_name,
           t.site_id, s.name AS site_name,
           t.assignee_user_id, u.full_name AS assignee_name
    FROM tasks t
    JOIN projects p ON p.id = t.project_id
    LEFT JOIN sites s ON s.id = t.site_id
    LEFT JOIN users u ON u.id = t.assignee_user_id
"#;

#[derive(Clone)]
pub struct TaskService {
    pool: PgPool,
}

impl TaskService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, payload: CreateTaskPayload) -> Result<TaskView> {
        let title = payload.title.trim();
        if title.is_empty() {
            return Err(Error::Validation("missing_title".to_string()));
        }

        let task_id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO tasks (id, project_id, site_id, title, priority, status,
                               assignee_user_id, due_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(task_id)
        .bind(payload.project_id)
        .bind(payload.site_id)
        .bind(title)
        .bind(payload.priority.as_str())
        .bind(payload.status.as_str())
        .bind(payload.assignee_user_id)
        .bind(payload.due_date)
        .execute(&self.pool)
        .await?;

        self.fetch_view(task_id).await?.ok_or(Error::NotFound)
    }

    pub async fn get(&self, task_id: Uuid) -> Result<TaskView> {
        self.fetch_view(task_id).await?.ok_or(Error::NotFound)
    }

    pub async fn update(&self, task_id: Uuid, payload: UpdateTaskPayload) -> Result<TaskView> {
        if payload.is_empty() {
            return Err(Error::Validation("nothing_to_update".to_string()));
        }
        let title = payload.title.as_deref().map(str::trim);
        if title == Some("") {
            return Err(Error::Validation("missing_title".to_string()));
        }

        let updated: Option<Uuid> = sqlx::query_scalar(
            r#"
            UPDATE tasks
            SET title = COALESCE($1, title),
                project_id = COALESCE($2, project_id),
                priority = COALESCE($3, priority),
                status = COALESCE($4, status),
                site_id = CASE WHEN $5 THEN $6 ELSE site_id END,
                assignee_user_id = CASE WHEN $7 THEN $8 ELSE assignee_user_id END,
                due_date = CASE WHEN $9 THEN $10 ELSE due_date END,
                updated_at = NOW()
            WHERE id = $11
            RETURNING id
            "#,
        )
        .bind(title)
        .bind(payload.project_id)
        .bind(payload.priority.map(|p| p.as_str()))
        .bind(payload.status.map(|s| s.as_str()))
        .bind(payload.site_id.is_some())
        .bind(payload.site_id.flatten())
        .bind(payload.assignee_user_id.is_some())
        .bind(payload.assignee_user_id.flatten())
        .bind(payload.due_date.is_some())
        .bind(payload.due_date.flatten())
        .bind(task_id)
        .fetch_optional(&self.pool)
        .await?;

        if updated.is_none() {
            return Err(Error::NotFound);
        }
        self.fetch_view(task_id).await?.ok_or(Error::NotFound)
    }

    pub async fn delete(&self, task_id: Uuid) -> Result<()> {
        let result = sqlx::query(r#"DELETE FROM tasks WHERE id = $1"#)
            .bind(task_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    /// Conjunctive filters; search matches the task title or the project
    /// name. Due soonest first, untimed tasks last.
    pub async fn list(&self, query: ListTasksQuery) -> Result<PaginatedTasks> {
        let (limit, offset) = super::page_window(query.limit, query.offset);
        let search = query.search.as_ref().map(|s| format!("%{}%", s));
        let status = query.status.map(|s| s.as_str());

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM tasks t
            JOIN projects p ON p.id = t.project_id
            WHERE ($1::text IS NULL OR t.status = $1)
              AND ($2::uuid IS NULL OR t.project_id = $2)
              AND ($3::uuid IS NULL OR t.assignee_user_id = $3)
              AND ($4::text IS NULL OR t.title ILIKE $4 OR p.name ILIKE $4)
            "#,
        )
        .bind(status)
        .bind(query.project_id)
        .bind(query.assignee_id)
        .bind(&search)
        .fetch_one(&self.pool)
        .await?;

        let sql = format!(
            r#"
            {TASK_VIEW_SELECT}
            WHERE ($1::text IS NULL OR t.status = $1)
              AND ($2::uuid IS NULL OR t.project_id = $2)
              AND ($3::uuid IS NULL OR t.assignee_user_id = $3)
              AND ($4::text IS NULL OR t.title ILIKE $4 OR p.name ILIKE $4)
            ORDER BY t.due_date ASC, t.title ASC
            LIMIT $5 OFFSET $6
            "#
        );
        let items: Vec<TaskView> = sqlx::query_as(&sql)
            .bind(status)
            .bind(query.project_id)
            .bind(query.assignee_id)
            .bind(&search)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(PaginatedTasks {
            total,
            limit,
            offset,
            items,
        })
    }

    async fn fetch_view(&self, task_id: Uuid) -> Result<Option<TaskView>> {
        let sql = format!("{TASK_VIEW_SELECT} WHERE t.id = $1");
        let view: Option<TaskView> = sqlx::query_as(&sql)
            .bind(task_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(view)
    }
}
