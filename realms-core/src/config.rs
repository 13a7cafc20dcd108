//! GameConfig - starting units and per-turn budget

use crate::hex::Hex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Rules for a new game. Missing keys in a config file take the defaults.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub action_points_per_turn: u32,
    pub player_start: Hex,
    pub player_hp: i32,
    pub player_power: i32,
    pub enemy_start: Hex,
    pub enemy_hp: i32,
    pub enemy_power: i32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            action_points_per_turn: 3,
            player_start: Hex::new(5, 5),
            player_hp: 10,
            player_power: 2,
            enemy_start: Hex::new(2, 2),
            enemy_hp: 8,
            enemy_power: 1,
        }
    }
}

impl GameConfig {
    /// Load from JSON file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save to JSON file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GameConfig::default();
        assert_eq!(config.action_points_per_turn, 3);
        assert_eq!(config.player_start, Hex::new(5, 5));
        assert_eq!(config.enemy_start, Hex::new(2, 2));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.json");
        std::fs::write(&path, r#"{"action_points_per_turn": 5, "enemy_start": {"q": 0, "r": 1}}"#)
            .unwrap();

        let config = GameConfig::load(&path).unwrap();
        assert_eq!(config.action_points_per_turn, 5);
        assert_eq!(config.enemy_start, Hex::new(0, 1));
        assert_eq!(config.player_start, Hex::new(5, 5));
        assert_eq!(config.player_hp, 10);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.json");
        let config = GameConfig {
            player_hp: 20,
            ..GameConfig::default()
        };
        config.save(&path).unwrap();
        assert_eq!(GameConfig::load(&path).unwrap(), config);
    }
}
