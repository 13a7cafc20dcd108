//! Eclipse of Realms Core - hex map rules and turn engine
//!
//! This crate provides the gameplay logic for Eclipse of Realms:
//! - Hex geometry (axial coordinates, pointy-top layout)
//! - Terrain table and world cell grid
//! - Turn state machine and player movement rules
//! - Greedy enemy chase policy
//! - Serializable game snapshots

pub mod config;
pub mod enemy;
pub mod game;
pub mod hex;
pub mod snapshot;
pub mod world;

// Re-exports for convenient access
pub use config::GameConfig;
pub use enemy::{next_enemy_position, EnemyPolicy, GreedyChase};
pub use game::{
    EnemyStep, GameState, LoadOutcome, MoveOutcome, MoveRejection, TurnError, TurnOwner, Unit,
};
pub use hex::{Hex, HexLayout, DIRECTIONS};
pub use snapshot::{GameSnapshot, SavedGame};
pub use world::{TerrainDefinition, World, WorldCell, WorldError};
