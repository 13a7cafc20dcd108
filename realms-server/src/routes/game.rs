//! Game API routes

use crate::session::GameView;
use crate::state::{ServerState, SessionError};
use axum::{body::Bytes, extract::State, Json};
use realms_core::{Hex, SavedGame};
use serde_json::Value;
use std::sync::Arc;

/// Current game view
pub async fn get_game(State(state): State<Arc<ServerState>>) -> Result<Json<GameView>, SessionError> {
    state.view().map(Json)
}

/// Start a new game, discarding any save
pub async fn new_game(State(state): State<Arc<ServerState>>) -> Result<Json<GameView>, SessionError> {
    state.run_blocking(|state| state.new_game()).await.map(Json)
}

/// Restore a saved game: the snapshot in the body, or the stored save if the
/// body is empty. An unreadable body counts as no snapshot.
pub async fn load_game(
    State(state): State<Arc<ServerState>>,
    body: Bytes,
) -> Result<Json<GameView>, SessionError> {
    let saved = if body.iter().all(u8::is_ascii_whitespace) {
        None
    } else {
        let text = String::from_utf8_lossy(&body);
        match SavedGame::from_json(&text) {
            Ok(saved) => Some(saved),
            Err(e) => {
                tracing::warn!("Ignoring unreadable snapshot in request: {}", e);
                None
            }
        }
    };
    state
        .run_blocking(move |state| state.restore(saved))
        .await
        .map(Json)
}

/// Pull integral `q`/`r` out of a move request
fn parse_target(req: &Value) -> Option<Hex> {
    let coord = |key: &str| {
        req.get(key)
            .and_then(Value::as_i64)
            .and_then(|v| i32::try_from(v).ok())
    };
    Some(Hex::new(coord("q")?, coord("r")?))
}

/// Attempt a one-hex player move. A malformed payload is ignored.
pub async fn move_player(
    State(state): State<Arc<ServerState>>,
    body: Bytes,
) -> Result<Json<GameView>, SessionError> {
    let req: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    match parse_target(&req) {
        Some(target) => state
            .run_blocking(move |state| state.move_player(target))
            .await
            .map(Json),
        None => {
            tracing::debug!("Ignoring malformed move request: {}", String::from_utf8_lossy(&body));
            state.view().map(Json)
        }
    }
}

/// End the player's turn
pub async fn end_turn(State(state): State<Arc<ServerState>>) -> Result<Json<GameView>, SessionError> {
    state.run_blocking(|state| state.end_turn()).await.map(Json)
}
