use crate::error::AppError;
use crate::models::CreateCourtRequest;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, Json};
use types::court::Court;

pub async fn create_court(
    State(state): State<AppState>,
    Json(payload): Json<CreateCourtRequest>,
) -> Result<(StatusCode, Json<Court>), AppError> {
    let court = state.coordinator.create_court(&payload.name)?;
    Ok((StatusCode::CREATED, Json(court)))
}

pub async fn list_courts(
    State(state): State<AppState>,
) -> Result<Json<Vec<Court>>, AppError> {
    Ok(Json(state.coordinator.list_courts()?))
}
