use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use uuid::Uuid;

use crate::dto::task_dto::{CreateTaskPayload, ListTasksQuery, UpdateTaskPayload};
use crate::AppState;

#[axum::debug_handler]
pub async fn create_task(
    State(state): State<AppState>,
    Json(payload): Json<CreateTaskPayload>,
) -> crate::error::Result<Response> {
    let task = state.task_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(task)).into_response())
}

#[axum::debug_handler]
pub async fn get_task(
    State(state): State<AppState>,
    Path(task_id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let task = state.task_service.get(task_id).await?;
    Ok(Json(task).into_response())
}

#[axum::debug_handler]
pub async fn update_task(
    State(state): State<AppState>,
    Path(task_id): Path<Uuid>,
    Json(payload): Json<UpdateTaskPayload>,
) -> crate::error::Result<Response> {
    let task = state.task_service.update(task_id, payload).await?;
    Ok(Json(task).into_response())
}

#[axum::debug_handler]
pub async fn delete_task(
    State(state): State<AppState>,
    Path(task_id): Path<Uuid>,
) -> crate::error::Result<Response> {
    state.task_service.delete(task_id).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

#[axum::debug_handler]
pub async fn list_tasks(
    State(state): State<AppState>,
    Query(query): Query<ListTasksQuery>,
) -> crate::error::Result<Response> {
    let page = state.task_service.list(query).await?;
    Ok(Json(page).into_response())
}
