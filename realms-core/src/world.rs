//! Static world: terrain table and the cell grid
//!
//! Loaded once per session and never mutated afterwards. A new game or a
//! restored save may swap the whole `World`, never edit it in place.

use crate::hex::Hex;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Number;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Cost charged when a terrain carries no usable `moveCost`
pub const DEFAULT_MOVE_COST: u32 = 1;

/// File names of the two static tables inside a data directory
pub const TERRAIN_FILE: &str = "terrains.json";
pub const MAP_FILE: &str = "map.json";

// ============================================================================
// TYPES
// ============================================================================

/// Terrain kind, keyed by `id`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TerrainDefinition {
    #[serde(default)]
    pub id: String,
    #[serde(
        default,
        deserialize_with = "lenient_move_cost",
        skip_serializing_if = "Option::is_none"
    )]
    pub move_cost: Option<Number>,
    #[serde(default)]
    pub passable: bool,
    #[serde(default)]
    pub color: String,
}

impl TerrainDefinition {
    pub fn new(id: &str, move_cost: u32, passable: bool, color: &str) -> Self {
        Self {
            id: id.to_string(),
            move_cost: Some(Number::from(move_cost)),
            passable,
            color: color.to_string(),
        }
    }

    /// Whole action points charged to enter a cell of this terrain.
    /// A fractional cost rounds up; the declared value is kept as written.
    pub fn cost(&self) -> u32 {
        let Some(cost) = &self.move_cost else {
            return DEFAULT_MOVE_COST;
        };
        match cost.as_u64() {
            Some(whole) => u32::try_from(whole).unwrap_or(u32::MAX),
            // `as` saturates, and the parser only admits finite values >= 0
            None => cost.as_f64().map_or(DEFAULT_MOVE_COST, |c| c.ceil() as u32),
        }
    }
}

/// Accepts any JSON value; anything but a finite number >= 0 becomes `None`.
fn lenient_move_cost<'de, D>(deserializer: D) -> Result<Option<Number>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(cost))
            if cost.as_f64().is_some_and(|c| c.is_finite() && c >= 0.0) =>
        {
            Some(cost)
        }
        _ => None,
    })
}

/// One occupied grid position
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldCell {
    pub q: i32,
    pub r: i32,
    pub terrain_id: String,
}

impl WorldCell {
    pub fn new(q: i32, r: i32, terrain_id: &str) -> Self {
        Self {
            q,
            r,
            terrain_id: terrain_id.to_string(),
        }
    }

    pub fn hex(&self) -> Hex {
        Hex::new(self.q, self.r)
    }
}

/// Errors raised while building or loading a world
#[derive(Debug, Error)]
pub enum WorldError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed table: {0}")]
    Json(#[from] serde_json::Error),

    #[error("duplicate terrain id: {0}")]
    DuplicateTerrain(String),

    #[error("duplicate cell at {0}")]
    DuplicateCell(Hex),

    #[error("cell at {cell} references unknown terrain {terrain_id:?}")]
    UnknownTerrain { cell: Hex, terrain_id: String },
}

// ============================================================================
// WORLD
// ============================================================================

/// Terrain lookup plus coordinate-indexed cells
#[derive(Clone, Debug, Default)]
pub struct World {
    terrain: FxHashMap<String, TerrainDefinition>,
    /// Cells in load order
    cells: Vec<WorldCell>,
    /// Hex -> index into `cells`
    index: FxHashMap<Hex, usize>,
}

impl World {
    /// Build a world, checking id/coordinate uniqueness and terrain references
    pub fn new(
        terrains: impl IntoIterator<Item = TerrainDefinition>,
        cells: Vec<WorldCell>,
    ) -> Result<Self, WorldError> {
        let mut terrain = FxHashMap::default();
        for def in terrains {
            if terrain.contains_key(&def.id) {
                return Err(WorldError::DuplicateTerrain(def.id));
            }
            terrain.insert(def.id.clone(), def);
        }

        let mut index = FxHashMap::default();
        for (i, cell) in cells.iter().enumerate() {
            if !terrain.contains_key(&cell.terrain_id) {
                return Err(WorldError::UnknownTerrain {
                    cell: cell.hex(),
                    terrain_id: cell.terrain_id.clone(),
                });
            }
            if index.insert(cell.hex(), i).is_some() {
                return Err(WorldError::DuplicateCell(cell.hex()));
            }
        }

        Ok(Self {
            terrain,
            cells,
            index,
        })
    }

    /// Build from the id-keyed terrain map used in saved games
    pub fn from_terrain_map(
        terrain_by_id: &BTreeMap<String, TerrainDefinition>,
        cells: Vec<WorldCell>,
    ) -> Result<Self, WorldError> {
        let terrains = terrain_by_id.iter().map(|(id, def)| TerrainDefinition {
            id: id.clone(),
            ..def.clone()
        });
        Self::new(terrains, cells)
    }

    /// Parse the two external tables: a terrain array and a cell array
    pub fn from_json(terrain_json: &str, cells_json: &str) -> Result<Self, WorldError> {
        let terrains: Vec<TerrainDefinition> = serde_json::from_str(terrain_json)?;
        let cells: Vec<WorldCell> = serde_json::from_str(cells_json)?;
        Self::new(terrains, cells)
    }

    /// Load `terrains.json` and `map.json` from a data directory
    pub fn load_dir(dir: &Path) -> Result<Self, WorldError> {
        let read = |name: &str| {
            let path = dir.join(name);
            std::fs::read_to_string(&path).map_err(|source| WorldError::Io { path, source })
        };
        let terrain_json = read(TERRAIN_FILE)?;
        let cells_json = read(MAP_FILE)?;
        Self::from_json(&terrain_json, &cells_json)
    }

    // ========================================================================
    // LOOKUPS
    // ========================================================================

    pub fn cell_at(&self, hex: Hex) -> Option<&WorldCell> {
        self.index.get(&hex).map(|&i| &self.cells[i])
    }

    pub fn terrain_of(&self, cell: &WorldCell) -> Option<&TerrainDefinition> {
        self.terrain.get(&cell.terrain_id)
    }

    pub fn terrain(&self, id: &str) -> Option<&TerrainDefinition> {
        self.terrain.get(id)
    }

    /// The cell and its terrain, only if the cell exists and is passable
    pub fn passable_cell(&self, hex: Hex) -> Option<(&WorldCell, &TerrainDefinition)> {
        let cell = self.cell_at(hex)?;
        let terrain = self.terrain_of(cell)?;
        terrain.passable.then_some((cell, terrain))
    }

    pub fn is_passable(&self, hex: Hex) -> bool {
        self.passable_cell(hex).is_some()
    }

    /// Cost to enter `hex`, if it exists and is passable
    pub fn move_cost(&self, hex: Hex) -> Option<u32> {
        self.passable_cell(hex).map(|(_, terrain)| terrain.cost())
    }

    /// Cells in load order
    pub fn cells(&self) -> &[WorldCell] {
        &self.cells
    }

    /// Terrain definitions sorted by id
    pub fn terrains(&self) -> Vec<&TerrainDefinition> {
        let mut defs: Vec<_> = self.terrain.values().collect();
        defs.sort_by(|a, b| a.id.cmp(&b.id));
        defs
    }

    /// Terrain keyed by id, the shape persisted in saved games
    pub fn terrain_by_id(&self) -> BTreeMap<String, TerrainDefinition> {
        self.terrain
            .iter()
            .map(|(id, def)| (id.clone(), def.clone()))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

// ============================================================================
// TESTS
// ============================================================================
