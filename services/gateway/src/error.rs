use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use types::errors::CommandError;

/// Central error type for the gateway.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("bad request: {0}")]
    BadRequest(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Command(err) => command_response(err),
            AppError::BadRequest(message) => error_response(
                StatusCode::BAD_REQUEST,
                "VALIDATION_FAILURE",
                &message,
                json!({}),
            ),
        }
    }
}

fn command_response(err: CommandError) -> Response {
    let code = err.code();
    let message = err.to_string();
    match err {
        CommandError::DuplicateName { .. } | CommandError::MatchNotLive { .. } => {
            error_response(StatusCode::CONFLICT, code, &message, json!({}))
        }
        CommandError::CourtNotFound { .. } | CommandError::MatchNotFound { .. } => {
            error_response(StatusCode::NOT_FOUND, code, &message, json!({}))
        }
        CommandError::SequenceConflict {
            server_next_seq,
            client_supplied_seq,
        } => error_response(
            StatusCode::CONFLICT,
            code,
            &message,
            json!({
                "server_next_seq": server_next_seq,
                "client_supplied_seq": client_supplied_seq,
            }),
        ),
        CommandError::Validation { .. } => {
            error_response(StatusCode::BAD_REQUEST, code, &message, json!({}))
        }
        CommandError::Storage { .. } => {
            tracing::error!(error = %message, "storage failure");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                code,
                "internal storage failure",
                json!({}),
            )
        }
    }
}

fn error_response(
    status: StatusCode,
    code: &str,
    message: &str,
    extra: serde_json::Value,
) -> Response {
    let mut body = json!({
        "error": code,
        "message": message,
    });
    if let (Some(obj), Some(extra)) = (body.as_object_mut(), extra.as_object()) {
        for (k, v) in extra {
            obj.insert(k.clone(), v.clone());
        }
    }
    (status, Json(body)).into_response()
}
