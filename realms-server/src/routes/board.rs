//! Board geometry endpoint

use crate::state::{ServerState, SessionError};
use axum::{extract::State, Json};
use realms_core::{HexLayout, World, DIRECTIONS};
use serde::Serialize;
use std::sync::Arc;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardCell {
    pub q: i32,
    pub r: i32,
    pub terrain_id: String,
    pub color: String,
    pub passable: bool,
    pub move_cost: u32,
    pub x: f64,
    pub y: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardInfo {
    pub tile_radius: f64,
    pub tile_width: f64,
    pub tile_height: f64,
    /// SVG polygon points for a tile centered at the origin
    pub polygon: String,
    pub directions: Vec<[i32; 2]>,
    pub cells: Vec<BoardCell>,
}

fn board_cells(world: &World, layout: &HexLayout) -> Vec<BoardCell> {
    world
        .cells()
        .iter()
        .filter_map(|cell| {
            let terrain = world.terrain_of(cell)?;
            let (x, y) = layout.to_pixel(cell.hex());
            Some(BoardCell {
                q: cell.q,
                r: cell.r,
                terrain_id: cell.terrain_id.clone(),
                color: terrain.color.clone(),
                passable: terrain.passable,
                move_cost: terrain.cost(),
                x,
                y,
            })
        })
        .collect()
}

fn polygon_points(layout: &HexLayout) -> String {
    layout
        .corners()
        .iter()
        .map(|(x, y)| format!("{},{}", x, y))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Get board geometry with pixel centers for every cell
pub async fn get_board(
    State(state): State<Arc<ServerState>>,
) -> Result<Json<BoardInfo>, SessionError> {
    let layout = HexLayout::default();
    let cells = state.with_game(|game| board_cells(game.world(), &layout))?;

    Ok(Json(BoardInfo {
        tile_radius: layout.radius,
        tile_width: layout.tile_width(),
        tile_height: layout.tile_height(),
        polygon: polygon_points(&layout),
        directions: DIRECTIONS.iter().map(|&(dq, dr)| [dq, dr]).collect(),
        cells,
    }))
}
