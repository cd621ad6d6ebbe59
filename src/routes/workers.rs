use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use uuid::Uuid;

use crate::dto::worker_dto::{ListWorkersQuery, RegisterWorkerPayload, UpdateWorkerPayload};
use crate::error::Error;
use crate::AppState;

#[axum::debug_handler]
pub async fn register_worker(
    State(state): State<AppState>,
    Json(payload): Json<RegisterWorkerPayload>,
) -> crate::error::Result<Response> {
    let worker = state.worker_service.register(payload).await?;
    Ok((StatusCode::CREATED, Json(worker)).into_response())
}

#[axum::debug_handler]
pub async fn get_worker(
    State(state): State<AppState>,
    Path(worker_id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let worker = state
        .worker_service
        .get(worker_id)
        .await?
        .ok_or(Error::NotFound)?;
    Ok(Json(worker).into_response())
}

#[axum::debug_handler]
pub async fn update_worker(
    State(state): State<AppState>,
    Path(worker_id): Path<Uuid>,
    Json(payload): Json<UpdateWorkerPayload>,
) -> crate::error::Result<Response> {
    let worker = state.worker_service.update(worker_id, payload).await?;
    Ok(Json(worker).into_response())
}

#[axum::debug_handler]
pub async fn delete_worker(
    State(state): State<AppState>,
    Path(worker_id): Path<Uuid>,
) -> crate::error::Result<Response> {
    state.worker_service.delete(worker_id).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

#[axum::debug_handler]
pub async fn list_workers(
    State(state): State<AppState>,
    Query(query): Query<ListWorkersQuery>,
) -> crate::error::Result<Response> {
    let page = state.worker_service.list(query).await?;
    Ok(Json(page).into_response())
}
