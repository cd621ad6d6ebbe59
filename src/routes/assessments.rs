use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    Extension,
};
use uuid::Uuid;

use crate::dto::assessment_dto::SubmitAssessmentPayload;
use crate::middleware::auth::AuthContext;
use crate::AppState;

#[axum::debug_handler]
pub async fn submit_assessment(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Json(payload): Json<SubmitAssessmentPayload>,
) -> crate::error::Result<Response> {
    let response = state.assessment_service.submit(&ctx, payload).await?;
    Ok((StatusCode::CREATED, Json(response)).into_response())
}

#[axum::debug_handler]
pub async fn get_assessment(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(assessment_id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let detail = state.assessment_service.get(&ctx, assessment_id).await?;
    Ok(Json(detail).into_response())
}

#[axum::debug_handler]
pub async fn list_user_assessments(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(user_id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let rows = state.assessment_service.list_for_user(&ctx, user_id).await?;
    Ok(Json(rows).into_response())
}

/// Removal of a recorded attempt is an admin-only correction.
#[axum::debug_handler]
pub async fn delete_assessment(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(assessment_id): Path<Uuid>,
) -> crate::error::Result<Response> {
    if !ctx.has_any_role(&[crate::models::user::Role::Admin]) {
        return Err(crate::error::Error::Forbidden);
    }
    state.assessment_service.delete(assessment_id).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}
