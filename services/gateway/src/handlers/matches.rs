use crate::error::AppError;
use crate::models::{PointEventRequest, ScoreboardQuery, StartMatchRequest};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use types::errors::CommandError;
use types::ids::MatchId;
use types::view::{MatchView, ScoreboardView};

pub async fn start_match(
    State(state): State<AppState>,
    Json(payload): Json<StartMatchRequest>,
) -> Result<(StatusCode, Json<MatchView>), AppError> {
    let view = state.coordinator.start_match(
        payload.court_id,
        &payload.team_a_name,
        &payload.team_b_name,
        payload.best_of.unwrap_or_default(),
    )?;
    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn active_matches(
    State(state): State<AppState>,
) -> Result<Json<Vec<MatchView>>, AppError> {
    Ok(Json(state.coordinator.active_matches()?))
}

pub async fn match_by_id(
    State(state): State<AppState>,
    Path(match_id): Path<MatchId>,
) -> Result<Json<MatchView>, AppError> {
    let view = state
        .coordinator
        .match_by_id(match_id)?
        .ok_or(CommandError::MatchNotFound { match_id })?;
    Ok(Json(view))
}

pub async fn point_event(
    State(state): State<AppState>,
    Path(match_id): Path<MatchId>,
    Json(payload): Json<PointEventRequest>,
) -> Result<Json<MatchView>, AppError> {
    let source_device = payload.source_device()?;
    let view = state.coordinator.apply_point_event(
        match_id,
        payload.winner,
        source_device,
        payload.expected_seq,
    )?;
    Ok(Json(view))
}

pub async fn undo_last_event(
    State(state): State<AppState>,
    Path(match_id): Path<MatchId>,
) -> Result<Json<MatchView>, AppError> {
    Ok(Json(state.coordinator.undo_last_event(match_id)?))
}

pub async fn scoreboard(
    State(state): State<AppState>,
    Query(query): Query<ScoreboardQuery>,
) -> Result<Json<ScoreboardView>, AppError> {
    let court_ids = query.court_ids()?;
    let view = state.coordinator.scoreboard_view(court_ids.as_deref())?;
    Ok(Json(view))
}
