//! Game state and turn transitions

use crate::config::GameConfig;
use crate::enemy::EnemyPolicy;
use crate::hex::Hex;
use crate::snapshot::{GameSnapshot, SavedGame};
use crate::world::{World, WorldError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// CORE TYPES
// ============================================================================

/// Side that may currently act
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnOwner {
    #[default]
    Player,
    Enemy,
}

impl TurnOwner {
    pub fn opponent(self) -> Self {
        match self {
            TurnOwner::Player => TurnOwner::Enemy,
            TurnOwner::Enemy => TurnOwner::Player,
        }
    }
}

impl std::fmt::Display for TurnOwner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TurnOwner::Player => f.write_str("player"),
            TurnOwner::Enemy => f.write_str("enemy"),
        }
    }
}

/// A unit on the map. Only the player carries action points.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub q: i32,
    pub r: i32,
    pub hp: i32,
    pub power: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ap: Option<u32>,
}

impl Unit {
    pub fn player(q: i32, r: i32, hp: i32, power: i32, ap: u32) -> Self {
        Self {
            q,
            r,
            hp,
            power,
            ap: Some(ap),
        }
    }

    pub fn enemy(q: i32, r: i32, hp: i32, power: i32) -> Self {
        Self {
            q,
            r,
            hp,
            power,
            ap: None,
        }
    }

    pub fn pos(&self) -> Hex {
        Hex::new(self.q, self.r)
    }

    fn place(&mut self, hex: Hex) {
        self.q = hex.q;
        self.r = hex.r;
    }

    /// Remaining action points; a unit without any has none to spend
    pub fn action_points(&self) -> u32 {
        self.ap.unwrap_or(0)
    }
}

/// A successful player step
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct MoveOutcome {
    pub from: Hex,
    pub to: Hex,
    pub cost: u32,
    pub ap_left: u32,
}

/// Why a player move was refused. State is never touched on rejection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum MoveRejection {
    #[error("not the player's turn")]
    NotPlayerTurn,

    #[error("no player unit")]
    NoPlayerUnit,

    #[error("Impassable terrain")]
    Impassable,

    #[error("Move only to adjacent hex")]
    NotAdjacent,

    #[error("Not enough AP")]
    NotEnoughAp { cost: u32, available: u32 },
}

impl MoveRejection {
    /// User-facing notice; the silent guards have none
    pub fn notice(&self) -> Option<&'static str> {
        match self {
            MoveRejection::NotPlayerTurn | MoveRejection::NoPlayerUnit => None,
            MoveRejection::Impassable => Some("Impassable terrain"),
            MoveRejection::NotAdjacent => Some("Move only to adjacent hex"),
            MoveRejection::NotEnoughAp { .. } => Some("Not enough AP"),
        }
    }
}

/// Turn transition requested out of order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum TurnError {
    #[error("the player does not own the turn")]
    NotPlayerTurn,

    #[error("the enemy does not own the turn")]
    NotEnemyTurn,
}

/// Where the enemy went during its turn
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct EnemyStep {
    pub from: Hex,
    pub to: Hex,
}

impl EnemyStep {
    pub fn moved(&self) -> bool {
        self.from != self.to
    }
}

/// Result of restoring a saved game
#[derive(Debug)]
pub enum LoadOutcome {
    Restored,
    /// Units and turn restored, but the saved map was unusable and the
    /// current one was kept
    KeptWorld(WorldError),
}

// ============================================================================
// GAME STATE
// ============================================================================

/// One session's game: the static world plus the mutable units and turn
#[derive(Clone, Debug)]
pub struct GameState {
    world: World,
    config: GameConfig,

    player: Option<Unit>,
    enemy: Option<Unit>,

    owner: TurnOwner,
}

impl GameState {
    // ========================================================================
    // CONSTRUCTORS
    // ========================================================================

    /// Static data loaded, no game started yet
    pub fn new(world: World, config: GameConfig) -> Self {
        Self {
            world,
            config,
            player: None,
            enemy: None,
            owner: TurnOwner::Player,
        }
    }

    /// Create and immediately start a new game
    pub fn new_game(world: World, config: GameConfig) -> Self {
        let mut state = Self::new(world, config);
        state.start_new_game();
        state
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn player(&self) -> Option<&Unit> {
        self.player.as_ref()
    }

    pub fn enemy(&self) -> Option<&Unit> {
        self.enemy.as_ref()
    }

    pub fn turn_owner(&self) -> TurnOwner {
        self.owner
    }

    pub fn is_player_turn(&self) -> bool {
        self.owner == TurnOwner::Player
    }

    /// True once both units exist
    pub fn has_game(&self) -> bool {
        self.player.is_some() && self.enemy.is_some()
    }

    // ========================================================================
    // LIFECYCLE
    // ========================================================================

    /// Reset both units to their configured start and give the turn to the player
    pub fn start_new_game(&mut self) {
        let c = &self.config;
        self.player = Some(Unit::player(
            c.player_start.q,
            c.player_start.r,
            c.player_hp,
            c.player_power,
            c.action_points_per_turn,
        ));
        self.enemy = Some(Unit::enemy(
            c.enemy_start.q,
            c.enemy_start.r,
            c.enemy_hp,
            c.enemy_power,
        ));
        self.owner = TurnOwner::Player;
    }

    /// Restore from a saved game. Every field absent from `saved` keeps its
    /// current in-memory value.
    pub fn load_game(&mut self, saved: SavedGame) -> LoadOutcome {
        let mut outcome = LoadOutcome::Restored;

        if saved.terrain_by_id.is_some() || saved.world_cells.is_some() {
            let terrain = saved
                .terrain_by_id
                .unwrap_or_else(|| self.world.terrain_by_id());
            let cells = saved
                .world_cells
                .unwrap_or_else(|| self.world.cells().to_vec());
            match World::from_terrain_map(&terrain, cells) {
                Ok(world) => self.world = world,
                Err(e) => outcome = LoadOutcome::KeptWorld(e),
            }
        }

        if let Some(player) = saved.player_unit {
            self.player = Some(player);
        }
        if let Some(enemy) = saved.enemy_unit {
            self.enemy = Some(enemy);
        }
        if let Some(owner) = saved.active_turn_owner {
            self.owner = owner;
        }

        outcome
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            terrain_by_id: self.world.terrain_by_id(),
            world_cells: self.world.cells().to_vec(),
            player_unit: self.player.clone(),
            enemy_unit: self.enemy.clone(),
            active_turn_owner: self.owner,
        }
    }

    // ========================================================================
    // PLAYER ACTIONS
    // ========================================================================

    /// Step the player one hex. Checks run in a fixed order and the first
    /// failure wins.
    pub fn attempt_move_player(&mut self, target: Hex) -> Result<MoveOutcome, MoveRejection> {
        if self.owner != TurnOwner::Player {
            return Err(MoveRejection::NotPlayerTurn);
        }
        let player = self.player.as_mut().ok_or(MoveRejection::NoPlayerUnit)?;

        let (_, terrain) = self
            .world
            .passable_cell(target)
            .ok_or(MoveRejection::Impassable)?;

        let from = player.pos();
        if !from.is_adjacent(target) {
            return Err(MoveRejection::NotAdjacent);
        }

        let cost = terrain.cost();
        let available = player.action_points();
        let ap_left = available
            .checked_sub(cost)
            .ok_or(MoveRejection::NotEnoughAp { cost, available })?;

        player.place(target);
        player.ap = Some(ap_left);

        Ok(MoveOutcome {
            from,
            to: target,
            cost,
            ap_left,
        })
    }

    /// Neighbors the player could step onto right now. For highlighting only;
    /// moves are validated on their own.
    pub fn reachable_neighbors(&self) -> Vec<Hex> {
        let Some(player) = &self.player else {
            return Vec::new();
        };
        let ap = player.action_points();
        if ap == 0 {
            return Vec::new();
        }

        player
            .pos()
            .neighbors()
            .filter(|&hex| self.world.move_cost(hex).is_some_and(|cost| cost <= ap))
            .collect()
    }

    /// Hand the turn to the enemy. Its step is resolved separately by
    /// `resolve_enemy_turn`.
    pub fn end_player_turn(&mut self) -> Result<(), TurnError> {
        if self.owner != TurnOwner::Player {
            return Err(TurnError::NotPlayerTurn);
        }
        self.owner = TurnOwner::Enemy;
        Ok(())
    }

    // ========================================================================
    // ENEMY TURN
    // ========================================================================

    /// Take exactly one enemy step and return the turn to the player with AP
    /// replenished. The turn comes back even if a unit is missing, in which
    /// case no step is reported.
    pub fn resolve_enemy_turn(
        &mut self,
        policy: &impl EnemyPolicy,
    ) -> Result<Option<EnemyStep>, TurnError> {
        if self.owner != TurnOwner::Enemy {
            return Err(TurnError::NotEnemyTurn);
        }

        let step = match (&self.player, &mut self.enemy) {
            (Some(player), Some(enemy)) => {
                let from = enemy.pos();
                let to = policy.next_position(from, player.pos(), &self.world);
                enemy.place(to);
                Some(EnemyStep { from, to })
            }
            _ => None,
        };

        self.owner = TurnOwner::Player;
        if let Some(player) = &mut self.player {
            player.ap = Some(self.config.action_points_per_turn);
        }

        Ok(step)
    }

    /// End the player's turn and resolve the enemy step without a delay
    pub fn end_turn_and_resolve(
        &mut self,
        policy: &impl EnemyPolicy,
    ) -> Result<Option<EnemyStep>, TurnError> {
        self.end_player_turn()?;
        self.resolve_enemy_turn(policy)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enemy::GreedyChase;
    use crate::world::{TerrainDefinition, WorldCell};

    /// 10x10 plains with a mountain at (5,4), a bog (cost 5) at (4,5)
    /// and forest (cost 2) at (5,6)
    fn test_world() -> World {
        let mut cells = Vec::new();
        for q in 0..10 {
            for r in 0..10 {
                let terrain = match (q, r) {
                    (5, 4) => "mountain",
                    (4, 5) => "bog",
                    (5, 6) => "forest",
                    _ => "plains",
                };
                cells.push(WorldCell::new(q, r, terrain));
            }
        }
        World::new(
            vec![
                TerrainDefinition::new("plains", 1, true, "#8fbc5a"),
                TerrainDefinition::new("forest", 2, true, "#2f6b2f"),
                TerrainDefinition::new("bog", 5, true, "#4a5d23"),
                TerrainDefinition::new("mountain", 3, false, "#6b6b6b"),
            ],
            cells,
        )
        .unwrap()
    }

    fn new_game() -> GameState {
        GameState::new_game(test_world(), GameConfig::default())
    }

    fn player_state(game: &GameState) -> (Hex, u32) {
        let player = game.player().unwrap();
        (player.pos(), player.action_points())
    }

    #[test]
    fn test_game_creation() {
        let game = new_game();
        assert_eq!(game.turn_owner(), TurnOwner::Player);
        assert_eq!(player_state(&game), (Hex::new(5, 5), 3));
        assert_eq!(game.enemy().unwrap().pos(), Hex::new(2, 2));
        assert_eq!(game.enemy().unwrap().ap, None);
        assert_eq!(game.player().unwrap().hp, 10);
        assert_eq!(game.enemy().unwrap().hp, 8);
    }

    #[test]
    fn test_move_to_adjacent_plains() {
        let mut game = new_game();
        let outcome = game.attempt_move_player(Hex::new(6, 5)).unwrap();
        assert_eq!(outcome.cost, 1);
        assert_eq!(outcome.ap_left, 2);
        assert_eq!(player_state(&game), (Hex::new(6, 5), 2));
        assert_eq!(game.turn_owner(), TurnOwner::Player);
    }

    #[test]
    fn test_move_not_adjacent() {
        let mut game = new_game();
        let err = game.attempt_move_player(Hex::new(7, 5)).unwrap_err();
        assert_eq!(err, MoveRejection::NotAdjacent);
        assert_eq!(err.notice(), Some("Move only to adjacent hex"));
        assert_eq!(player_state(&game), (Hex::new(5, 5), 3));
    }

    #[test]
    fn test_move_impassable() {
        let mut game = new_game();
        assert_eq!(
            game.attempt_move_player(Hex::new(5, 4)),
            Err(MoveRejection::Impassable)
        );
        // off the map
        assert_eq!(
            game.attempt_move_player(Hex::new(50, 50)),
            Err(MoveRejection::Impassable)
        );
        assert_eq!(player_state(&game), (Hex::new(5, 5), 3));
    }

    #[test]
    fn test_passability_checked_before_adjacency() {
        let mut game = new_game();
        let err = game.attempt_move_player(Hex::new(-3, -3)).unwrap_err();
        assert_eq!(err.notice(), Some("Impassable terrain"));
    }

    #[test]
    fn test_move_not_enough_ap() {
        let mut game = new_game();
        let err = game.attempt_move_player(Hex::new(4, 5)).unwrap_err();
        assert_eq!(err, MoveRejection::NotEnoughAp { cost: 5, available: 3 });
        assert_eq!(err.notice(), Some("Not enough AP"));
        assert_eq!(player_state(&game), (Hex::new(5, 5), 3));
    }

    #[test]
    fn test_rejection_is_idempotent() {
        let mut game = new_game();
        let before = game.snapshot();
        for _ in 0..5 {
            assert!(game.attempt_move_player(Hex::new(7, 5)).is_err());
            assert!(game.attempt_move_player(Hex::new(5, 4)).is_err());
            assert!(game.attempt_move_player(Hex::new(4, 5)).is_err());
        }
        assert_eq!(game.snapshot(), before);
    }

    #[test]
    fn test_ap_accumulates_costs() {
        let mut game = new_game();
        // forest (2) then plains (1) spends the whole budget
        game.attempt_move_player(Hex::new(5, 6)).unwrap();
        assert_eq!(player_state(&game), (Hex::new(5, 6), 1));
        game.attempt_move_player(Hex::new(6, 6)).unwrap();
        assert_eq!(player_state(&game), (Hex::new(6, 6), 0));

        assert!(matches!(
            game.attempt_move_player(Hex::new(7, 6)),
            Err(MoveRejection::NotEnoughAp { cost: 1, available: 0 })
        ));
        assert_eq!(player_state(&game), (Hex::new(6, 6), 0));
    }

    #[test]
    fn test_zero_cost_terrain() {
        let world = World::new(
            vec![TerrainDefinition::new("road", 0, true, "#c2b280")],
            vec![WorldCell::new(0, 0, "road"), WorldCell::new(1, 0, "road")],
        )
        .unwrap();
        let config = GameConfig {
            player_start: Hex::new(0, 0),
            ..GameConfig::default()
        };
        let mut game = GameState::new_game(world, config);
        for _ in 0..10 {
            game.attempt_move_player(Hex::new(1, 0)).unwrap();
            game.attempt_move_player(Hex::new(0, 0)).unwrap();
        }
        assert_eq!(player_state(&game), (Hex::new(0, 0), 3));
    }

    #[test]
    fn test_no_moves_during_enemy_turn() {
        let mut game = new_game();
        game.end_player_turn().unwrap();
        assert_eq!(game.turn_owner(), TurnOwner::Enemy);

        let err = game.attempt_move_player(Hex::new(6, 5)).unwrap_err();
        assert_eq!(err, MoveRejection::NotPlayerTurn);
        assert_eq!(err.notice(), None);
        assert_eq!(player_state(&game), (Hex::new(5, 5), 3));
    }

    #[test]
    fn test_no_player_unit() {
        let mut game = GameState::new(test_world(), GameConfig::default());
        assert_eq!(
            game.attempt_move_player(Hex::new(6, 5)),
            Err(MoveRejection::NoPlayerUnit)
        );
        assert!(game.reachable_neighbors().is_empty());
    }

    #[test]
    fn test_end_turn_cycle() {
        let mut game = new_game();
        game.attempt_move_player(Hex::new(6, 5)).unwrap();

        game.end_player_turn().unwrap();
        assert_eq!(game.end_player_turn(), Err(TurnError::NotPlayerTurn));

        let step = game.resolve_enemy_turn(&GreedyChase).unwrap().unwrap();
        assert_eq!(step.from, Hex::new(2, 2));
        assert_eq!(step.to, Hex::new(3, 2));
        assert!(step.moved());

        assert_eq!(game.turn_owner(), TurnOwner::Player);
        assert_eq!(player_state(&game), (Hex::new(6, 5), 3));
        assert_eq!(game.enemy().unwrap().pos(), Hex::new(3, 2));

        // a second resolve without an end-turn is refused
        assert_eq!(
            game.resolve_enemy_turn(&GreedyChase),
            Err(TurnError::NotEnemyTurn)
        );
    }

    #[test]
    fn test_turn_returns_even_without_units() {
        let mut game = GameState::new(test_world(), GameConfig::default());
        assert_eq!(game.end_turn_and_resolve(&GreedyChase), Ok(None));
        assert_eq!(game.turn_owner(), TurnOwner::Player);
    }

    #[test]
    fn test_turn_returns_when_enemy_stays() {
        let mut game = new_game();
        game.load_game(SavedGame {
            enemy_unit: Some(Unit::enemy(5, 6, 8, 1)),
            ..SavedGame::default()
        });
        game.attempt_move_player(Hex::new(6, 5)).unwrap();

        // enemy at (5,6) is already adjacent to (6,5); stepping onto it is the
        // only improvement
        let step = game.end_turn_and_resolve(&GreedyChase).unwrap().unwrap();
        assert_eq!(step.to, Hex::new(6, 5));

        game.load_game(SavedGame {
            enemy_unit: Some(Unit::enemy(6, 5, 8, 1)),
            ..SavedGame::default()
        });
        let step = game.end_turn_and_resolve(&GreedyChase).unwrap().unwrap();
        assert!(!step.moved());
        assert_eq!(player_state(&game), (Hex::new(6, 5), 3));
    }

    #[test]
    fn test_enemy_stalls_behind_mountain() {
        let mut game = new_game();
        let mut path = Vec::new();
        for _ in 0..10 {
            let step = game.end_turn_and_resolve(&GreedyChase).unwrap().unwrap();
            path.push(step.to);
        }
        // (2,2) -> (3,2) -> (4,2) -> (5,2) -> (5,3), then the mountain at
        // (5,4) leaves no strictly closer hex
        assert_eq!(
            &path[..5],
            &[
                Hex::new(3, 2),
                Hex::new(4, 2),
                Hex::new(5, 2),
                Hex::new(5, 3),
                Hex::new(5, 3),
            ]
        );
        assert_eq!(game.enemy().unwrap().pos(), Hex::new(5, 3));
    }

    #[test]
    fn test_reachable_neighbors() {
        let game = new_game();
        let reachable = game.reachable_neighbors();
        // mountain (5,4) is impassable and bog (4,5) too expensive
        assert_eq!(
            reachable,
            vec![
                Hex::new(6, 5),
                Hex::new(6, 4),
                Hex::new(4, 6),
                Hex::new(5, 6),
            ]
        );
        for hex in reachable {
            assert!(game.clone().attempt_move_player(hex).is_ok());
        }
    }

    #[test]
    fn test_reachable_shrinks_with_ap() {
        let mut game = new_game();
        game.attempt_move_player(Hex::new(6, 5)).unwrap();
        game.attempt_move_player(Hex::new(5, 5)).unwrap();
        // 1 AP left: the forest at (5,6) is out of reach
        assert!(!game.reachable_neighbors().contains(&Hex::new(5, 6)));
        assert!(game.reachable_neighbors().contains(&Hex::new(6, 5)));

        game.attempt_move_player(Hex::new(6, 5)).unwrap();
        assert!(game.reachable_neighbors().is_empty());
    }

    #[test]
    fn test_snapshot_round_trip() {
        let mut game = new_game();
        game.attempt_move_player(Hex::new(6, 5)).unwrap();
        game.end_player_turn().unwrap();
        let snapshot = game.snapshot();

        let mut restored = GameState::new(World::default(), GameConfig::default());
        let outcome = restored.load_game(SavedGame::from(snapshot.clone()));
        assert!(matches!(outcome, LoadOutcome::Restored));
        assert_eq!(restored.snapshot(), snapshot);
        assert_eq!(restored.turn_owner(), TurnOwner::Enemy);

        let json = snapshot.to_json().unwrap();
        let mut from_json = GameState::new(World::default(), GameConfig::default());
        from_json.load_game(SavedGame::from_json(&json).unwrap());
        assert_eq!(from_json.snapshot(), snapshot);
    }

    #[test]
    fn test_partial_load_keeps_current_values() {
        let mut game = new_game();
        game.attempt_move_player(Hex::new(6, 5)).unwrap();

        game.load_game(SavedGame {
            enemy_unit: Some(Unit::enemy(9, 9, 3, 1)),
            ..SavedGame::default()
        });

        assert_eq!(player_state(&game), (Hex::new(6, 5), 2));
        assert_eq!(game.enemy().unwrap().pos(), Hex::new(9, 9));
        assert_eq!(game.enemy().unwrap().hp, 3);
        assert_eq!(game.turn_owner(), TurnOwner::Player);
        assert_eq!(game.world().cells().len(), 100);
    }

    #[test]
    fn test_load_with_broken_map_keeps_world() {
        let mut game = new_game();
        let outcome = game.load_game(SavedGame {
            world_cells: Some(vec![WorldCell::new(0, 0, "lava")]),
            player_unit: Some(Unit::player(1, 1, 10, 2, 1)),
            ..SavedGame::default()
        });

        assert!(matches!(
            outcome,
            LoadOutcome::KeptWorld(WorldError::UnknownTerrain { .. })
        ));
        assert_eq!(game.world().cells().len(), 100);
        assert_eq!(player_state(&game), (Hex::new(1, 1), 1));
    }

    #[test]
    fn test_load_units_at_coordinate_limits() {
        let mut game = new_game();
        let saved = SavedGame::from_json(
            r#"{"playerUnit":{"q":2147483647,"r":0,"hp":10,"power":2,"ap":3},
                "enemyUnit":{"q":-2147483648,"r":-2147483648,"hp":8,"power":1}}"#,
        )
        .unwrap();
        game.load_game(saved);

        assert_eq!(player_state(&game), (Hex::new(i32::MAX, 0), 3));
        assert!(game.reachable_neighbors().is_empty());
        assert_eq!(
            game.attempt_move_player(Hex::new(i32::MAX, 1)),
            Err(MoveRejection::Impassable)
        );

        // both units are off the map, so the enemy has nowhere to go
        let step = game.end_turn_and_resolve(&GreedyChase).unwrap().unwrap();
        assert!(!step.moved());
        assert_eq!(game.snapshot().player_unit.unwrap().q, i32::MAX);
    }

    #[test]
    fn test_new_game_resets() {
        let mut game = new_game();
        game.attempt_move_player(Hex::new(6, 5)).unwrap();
        game.end_turn_and_resolve(&GreedyChase).unwrap();
        game.end_player_turn().unwrap();

        game.start_new_game();
        assert_eq!(game.turn_owner(), TurnOwner::Player);
        assert_eq!(player_state(&game), (Hex::new(5, 5), 3));
        assert_eq!(game.enemy().unwrap().pos(), Hex::new(2, 2));
    }
}
