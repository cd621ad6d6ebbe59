use axum::{
    extract::State,
    response::{IntoResponse, Json, Response},
};

use crate::dto::settings_dto::UpdateSettingsPayload;
use crate::AppState;

#[axum::debug_handler]
pub async fn get_settings(State(state): State<AppState>) -> crate::error::Result<Response> {
    let settings = state.settings_service.get().await?;
    Ok(Json(settings).into_response())
}

#[axum::debug_handler]
pub async fn update_settings(
    State(state): State<AppState>,
    Json(payload): Json<UpdateSettingsPayload>,
) -> crate::error::Result<Response> {
    let settings = state.settings_service.update(payload).await?;
    Ok(Json(settings).into_response())
}
