use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use validator::Validate;

use crate::dto::auth_dto::{LoginPayload, SignupPayload};
use crate::AppState;

#[axum::debug_handler]
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupPayload>,
) -> crate::error::Result<Response> {
    payload.validate()?;
    let user = state.user_service.signup(payload).await?;
    Ok((StatusCode::CREATED, Json(user)).into_response())
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> crate::error::Result<Response> {
    payload.validate()?;
    let response = state.user_service.login(payload).await?;
    Ok(Json(response).into_response())
}
