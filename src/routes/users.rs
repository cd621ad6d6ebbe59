use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::dto::user_dto::{
    CreateUserPayload, ListUsersQuery, PhoneQuery, RoleKeyPayload, UpdateUserPayload,
};
use crate::AppState;

#[axum::debug_handler]
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<ListUsersQuery>,
) -> crate::error::Result<Response> {
    let users = state.user_service.list(query).await?;
    Ok(Json(users).into_response())
}

#[axum::debug_handler]
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserPayload>,
) -> crate::error::Result<Response> {
    payload.validate()?;
    let user = state.user_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(user)).into_response())
}

#[axum::debug_handler]
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let user = state.user_service.get(user_id).await?;
    Ok(Json(user).into_response())
}

#[axum::debug_handler]
pub async fn update_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<UpdateUserPayload>,
) -> crate::error::Result<Response> {
    payload.validate()?;
    let user = state.user_service.update(user_id, payload).await?;
    Ok(Json(user).into_response())
}

#[axum::debug_handler]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> crate::error::Result<Response> {
    state.user_service.delete(user_id).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

#[axum::debug_handler]
pub async fn grant_role(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<RoleKeyPayload>,
) -> crate::error::Result<Response> {
    let roles = state.user_service.grant_role(user_id, &payload.role).await?;
    Ok(Json(json!({ "user_id": user_id, "roles": roles })).into_response())
}

#[axum::debug_handler]
pub async fn revoke_role(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<RoleKeyPayload>,
) -> crate::error::Result<Response> {
    let roles = state.user_service.revoke_role(user_id, &payload.role).await?;
    Ok(Json(json!({ "user_id": user_id, "roles": roles })).into_response())
}

/// Lookup used by the signup form to detect an already-registered phone.
#[axum::debug_handler]
pub async fn lookup_by_phone(
    State(state): State<AppState>,
    Query(query): Query<PhoneQuery>,
) -> crate::error::Result<Response> {
    let user = state
        .user_service
        .find_by_phone(&query.phone)
        .await?
        .ok_or(crate::error::Error::NotFound)?;
    Ok(Json(user).into_response())
}
