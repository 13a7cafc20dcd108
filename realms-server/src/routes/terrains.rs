//! Terrain table endpoint (codex and map legend)

use crate::state::{ServerState, SessionError};
use axum::{extract::State, Json};
use realms_core::TerrainDefinition;
use serde::Serialize;
use std::sync::Arc;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TerrainInfo {
    pub id: String,
    pub move_cost: u32,
    pub passable: bool,
    pub color: String,
}

impl From<&TerrainDefinition> for TerrainInfo {
    fn from(def: &TerrainDefinition) -> Self {
        Self {
            id: def.id.clone(),
            move_cost: def.cost(),
            passable: def.passable,
            color: def.color.clone(),
        }
    }
}

/// All terrain kinds, sorted by id
pub async fn get_terrains(
    State(state): State<Arc<ServerState>>,
) -> Result<Json<Vec<TerrainInfo>>, SessionError> {
    let terrains = state.with_game(|game| {
        game.world()
            .terrains()
            .into_iter()
            .map(TerrainInfo::from)
            .collect()
    })?;
    Ok(Json(terrains))
}
