use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use uuid::Uuid;

use crate::dto::question_dto::{CreateQuestionPayload, ListQuestionsQuery, UpdateQuestionPayload};
use crate::AppState;

#[axum::debug_handler]
pub async fn create_question(
    State(state): State<AppState>,
    Json(payload): Json<CreateQuestionPayload>,
) -> crate::error::Result<Response> {
    let question = state.question_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(question)).into_response())
}

#[axum::debug_handler]
pub async fn get_question(
    State(state): State<AppState>,
    Path(question_id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let question = state.question_service.get(question_id).await?;
    Ok(Json(question).into_response())
}

#[axum::debug_handler]
pub async fn update_question(
    State(state): State<AppState>,
    Path(question_id): Path<Uuid>,
    Json(payload): Json<UpdateQuestionPayload>,
) -> crate::error::Result<Response> {
    let question = state.question_service.update(question_id, payload).await?;
    Ok(Json(question).into_response())
}

#[axum::debug_handler]
pub async fn delete_question(
    State(state): State<AppState>,
    Path(question_id): Path<Uuid>,
) -> crate::error::Result<Response> {
    state.question_service.delete(question_id).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

#[axum::debug_handler]
pub async fn list_questions(
    State(state): State<AppState>,
    Query(query): Query<ListQuestionsQuery>,
) -> crate::error::Result<Response> {
    let page = state.question_service.list(query).await?;
    Ok(Json(page).into_response())
}
