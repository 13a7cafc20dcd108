//! Snapshot persistence
//!
//! Best-effort: failures are logged and swallowed, never surfaced to play.

use realms_core::{GameSnapshot, SavedGame};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Where a session keeps its saved game
pub trait SnapshotStore: Send + Sync {
    /// The saved game, or `None` if there is none or it cannot be read
    fn load(&self) -> Option<SavedGame>;
    fn save(&self, snapshot: &GameSnapshot);
    fn clear(&self);
}

fn parse_saved(text: &str, source: &str) -> Option<SavedGame> {
    match SavedGame::from_json(text) {
        Ok(saved) => Some(saved),
        Err(e) => {
            tracing::warn!("Ignoring unreadable saved game in {}: {}", source, e);
            None
        }
    }
}

// ============================================================================
// JSON FILE
// ============================================================================

/// Saved game as a single JSON file
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, snapshot: &GameSnapshot) -> anyhow::Result<()> {
        let content = snapshot.to_json()?;
        // write beside the target then rename, so a crash never leaves half a save
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, content)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl SnapshotStore for JsonFileStore {
    fn load(&self) -> Option<SavedGame> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => parse_saved(&text, &self.path.display().to_string()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("No saved game at {}", self.path.display());
                None
            }
            Err(e) => {
                tracing::warn!("Failed to read saved game {}: {}", self.path.display(), e);
                None
            }
        }
    }

    fn save(&self, snapshot: &GameSnapshot) {
        if let Err(e) = self.write(snapshot) {
            tracing::warn!("Failed to save game to {}: {}", self.path.display(), e);
        }
    }

    fn clear(&self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!("Failed to clear saved game {}: {}", self.path.display(), e);
            }
        }
    }
}

// ============================================================================
// IN MEMORY
// ============================================================================

/// Keeps the serialized save in memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    slot: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with raw stored text, readable or not
    pub fn with_text(text: &str) -> Self {
        Self {
            slot: Mutex::new(Some(text.to_string())),
        }
    }

    pub fn contents(&self) -> Option<String> {
        self.slot.lock().ok().and_then(|slot| slot.clone())
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self) -> Option<SavedGame> {
        let text = self.contents()?;
        parse_saved(&text, "memory")
    }

    fn save(&self, snapshot: &GameSnapshot) {
        match (snapshot.to_json(), self.slot.lock()) {
            (Ok(text), Ok(mut slot)) => *slot = Some(text),
            (Err(e), _) => tracing::warn!("Failed to serialize game: {}", e),
            (_, Err(_)) => tracing::warn!("Save slot lock poisoned"),
        }
    }

    fn clear(&self) {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use realms_core::{TurnOwner, Unit, WorldCell};
    use std::collections::BTreeMap;

    fn sample_snapshot() -> GameSnapshot {
        GameSnapshot {
            terrain_by_id: BTreeMap::new(),
            world_cells: vec![WorldCell::new(0, 0, "plains")],
            player_unit: Some(Unit::player(5, 5, 10, 2, 3)),
            enemy_unit: Some(Unit::enemy(2, 2, 8, 1)),
            active_turn_owner: TurnOwner::Enemy,
        }
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("save.json"));
        assert!(store.load().is_none());

        store.save(&sample_snapshot());
        let saved = store.load().unwrap();
        assert_eq!(saved, SavedGame::from(sample_snapshot()));

        store.clear();
        assert!(store.load().is_none());
        // clearing twice is fine
        store.clear();
    }

    #[test]
    fn test_file_store_corrupt_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("save.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(JsonFileStore::new(path).load().is_none());
    }

    #[test]
    fn test_file_store_write_failure_is_swallowed() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("missing").join("save.json"));
        store.save(&sample_snapshot());
        assert!(store.load().is_none());
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();
        assert!(store.load().is_none());
        store.save(&sample_snapshot());
        assert_eq!(
            store.load().unwrap().active_turn_owner,
            Some(TurnOwner::Enemy)
        );
        store.clear();
        assert!(store.contents().is_none());

        assert!(MemoryStore::with_text("garbage").load().is_none());
    }
}
