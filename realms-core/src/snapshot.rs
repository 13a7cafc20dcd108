//! Serializable game snapshots
//!
//! `GameSnapshot` is what a session persists. `SavedGame` is what it reads
//! back: the same shape with every field optional, so a partial or damaged
//! save restores what it can.

use crate::game::{TurnOwner, Unit};
use crate::world::{TerrainDefinition, WorldCell};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Full state of a session
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    pub terrain_by_id: BTreeMap<String, TerrainDefinition>,
    pub world_cells: Vec<WorldCell>,
    pub player_unit: Option<Unit>,
    pub enemy_unit: Option<Unit>,
    pub active_turn_owner: TurnOwner,
}

impl GameSnapshot {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// A snapshot as read back from storage; absent fields keep the current value
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedGame {
    pub terrain_by_id: Option<BTreeMap<String, TerrainDefinition>>,
    pub world_cells: Option<Vec<WorldCell>>,
    pub player_unit: Option<Unit>,
    pub enemy_unit: Option<Unit>,
    pub active_turn_owner: Option<TurnOwner>,
}

impl SavedGame {
    /// Parse a stored save leniently.
    ///
    /// Fails only when the text is not a JSON object at all. A key whose value
    /// has the wrong shape is treated as missing.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> serde_json::Result<Self> {
        let Value::Object(mut map) = value else {
            return Err(serde::de::Error::custom("saved game is not a JSON object"));
        };
        Ok(Self {
            terrain_by_id: field(&mut map, "terrainById"),
            world_cells: field(&mut map, "worldCells"),
            player_unit: field(&mut map, "playerUnit"),
            enemy_unit: field(&mut map, "enemyUnit"),
            active_turn_owner: field(&mut map, "activeTurnOwner"),
        })
    }

    /// True if nothing in the save was usable
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

fn field<T: DeserializeOwned>(map: &mut serde_json::Map<String, Value>, key: &str) -> Option<T> {
    map.remove(key)
        .and_then(|value| serde_json::from_value(value).ok())
}

impl From<GameSnapshot> for SavedGame {
    fn from(snapshot: GameSnapshot) -> Self {
        Self {
            terrain_by_id: Some(snapshot.terrain_by_id),
            world_cells: Some(snapshot.world_cells),
            player_unit: snapshot.player_unit,
            enemy_unit: snapshot.enemy_unit,
            active_turn_owner: Some(snapshot.active_turn_owner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_json_keys() {
        let snapshot = GameSnapshot {
            terrain_by_id: BTreeMap::new(),
            world_cells: vec![WorldCell::new(1, 2, "plains")],
            player_unit: Some(Unit::player(5, 5, 10, 2, 3)),
            enemy_unit: Some(Unit::enemy(2, 2, 8, 1)),
            active_turn_owner: TurnOwner::Player,
        };
        let value: Value = serde_json::from_str(&snapshot.to_json().unwrap()).unwrap();

        assert_eq!(value["activeTurnOwner"], "player");
        assert_eq!(value["worldCells"][0]["terrainId"], "plains");
        assert_eq!(value["playerUnit"]["ap"], 3);
        assert!(value["enemyUnit"].get("ap").is_none());
    }

    #[test]
    fn test_lenient_parse_drops_bad_fields() {
        let saved = SavedGame::from_json(
            r#"{
                "playerUnit": {"q": 6, "r": 5, "hp": 10, "power": 2, "ap": 2},
                "enemyUnit": "garbage",
                "activeTurnOwner": "nobody"
            }"#,
        )
        .unwrap();

        assert_eq!(saved.player_unit, Some(Unit::player(6, 5, 10, 2, 2)));
        assert!(saved.enemy_unit.is_none());
        assert!(saved.active_turn_owner.is_none());
        assert!(saved.terrain_by_id.is_none());
    }

    #[test]
    fn test_unreadable_save_is_error() {
        assert!(SavedGame::from_json("not json").is_err());
        assert!(SavedGame::from_json("[1, 2, 3]").is_err());
        assert!(SavedGame::from_json("{}").unwrap().is_empty());
    }
}
