//! Static data source: terrain and map tables from a data directory

use realms_core::world::{MAP_FILE, TERRAIN_FILE};
use realms_core::{World, WorldError};
use std::path::{Path, PathBuf};

async fn read_table(path: PathBuf) -> Result<String, WorldError> {
    tokio::fs::read_to_string(&path)
        .await
        .map_err(|source| WorldError::Io { path, source })
}

/// Fetch both tables concurrently; either failing fails the load
pub async fn load_world(dir: &Path) -> Result<World, WorldError> {
    let (terrain_json, cells_json) = tokio::try_join!(
        read_table(dir.join(TERRAIN_FILE)),
        read_table(dir.join(MAP_FILE)),
    )?;
    World::from_json(&terrain_json, &cells_json)
}
