//! HTTP route handlers

pub mod board;
pub mod game;
pub mod status;
pub mod terrains;

use crate::state::SessionError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

impl IntoResponse for SessionError {
    fn into_response(self) -> Response {
        let (code, status) = match &self {
            SessionError::Loading => (StatusCode::SERVICE_UNAVAILABLE, "loading"),
            SessionError::LoadFailed(_) => (StatusCode::SERVICE_UNAVAILABLE, "failed"),
            SessionError::NoSavedGame => (StatusCode::NOT_FOUND, "ready"),
            SessionError::Interrupted => (StatusCode::INTERNAL_SERVER_ERROR, "ready"),
        };
        let body = Json(json!({
            "status": status,
            "error": self.to_string(),
        }));
        (code, body).into_response()
    }
}
