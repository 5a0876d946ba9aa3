use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use uuid::Uuid;
use validator::Validate;

use crate::dto::interview_dto::SubmitMessageRequest;
use crate::AppState;

#[axum::debug_handler]
pub async fn create_interview(State(state): State<AppState>) -> crate::error::Result<Response> {
    let view = state.interview_service.start_session().await;
    Ok((StatusCode::CREATED, Json(view)).into_response())
}

#[axum::debug_handler]
pub async fn get_interview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let view = state.interview_service.get_session(id).await?;
    Ok(Json(view).into_response())
}

#[axum::debug_handler]
pub async fn submit_message(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<SubmitMessageRequest>,
) -> crate::error::Result<Response> {
    req.validate()?;
    let view = state.interview_service.submit(id, &req.text).await?;
    Ok(Json(view).into_response())
}

#[axum::debug_handler]
pub async fn delete_interview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> crate::error::Result<Response> {
    state.interview_service.end_session(id)?;
    Ok(StatusCode::NO_CONTENT.into_response())
}
