//! Session operations
//!
//! Every mutation goes through here: it takes the write lock, applies one
//! core operation, persists the result and returns the new view.

use crate::data;
use crate::state::{PendingEnemyTurn, ServerState, Session, SessionError, SessionStatus};
use realms_core::{GameSnapshot, GameState, GreedyChase, Hex, LoadOutcome, SavedGame, TurnOwner, World};
use serde::Serialize;
use std::sync::Arc;

/// What the UI reads back after every request
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameView {
    pub status: &'static str,
    pub snapshot: GameSnapshot,
    pub notice: Option<String>,
    pub reachable: Vec<Hex>,
    pub enemy_pending: bool,
}

impl GameView {
    fn of(session: &Session) -> Self {
        Self {
            status: "ready",
            snapshot: session.game.snapshot(),
            notice: session.notice.clone(),
            reachable: session.game.reachable_neighbors(),
            enemy_pending: session.enemy_pending(),
        }
    }
}

fn ready(status: &SessionStatus) -> Result<&Session, SessionError> {
    match status {
        SessionStatus::Ready(session) => Ok(session),
        SessionStatus::Loading => Err(SessionError::Loading),
        SessionStatus::Failed(e) => Err(SessionError::LoadFailed(e.clone())),
    }
}

fn ready_mut(status: &mut SessionStatus) -> Result<&mut Session, SessionError> {
    match status {
        SessionStatus::Ready(session) => Ok(session),
        SessionStatus::Loading => Err(SessionError::Loading),
        SessionStatus::Failed(e) => Err(SessionError::LoadFailed(e.clone())),
    }
}

impl ServerState {
    // ========================================================================
    // STARTUP
    // ========================================================================

    /// Load the static tables, then restore the saved game or start fresh.
    /// A failure here is final for the session.
    pub async fn load_data(self: Arc<Self>) {
        let dir = self.config.data_dir.clone();
        match data::load_world(&dir).await {
            Ok(world) => {
                let state = self.clone();
                let installed =
                    tokio::task::spawn_blocking(move || state.install_world(world)).await;
                if let Err(e) = installed {
                    tracing::error!("Failed to start session: {}", e);
                    *self.write_status() = SessionStatus::Failed(e.to_string());
                }
            }
            Err(e) => {
                tracing::error!("Failed to load static data from {}: {}", dir.display(), e);
                *self.write_status() = SessionStatus::Failed(e.to_string());
            }
        }
    }

    /// Make the session ready on `world`. May touch the save file, so async
    /// callers run it on the blocking pool.
    pub fn install_world(self: &Arc<Self>, world: World) {
        tracing::info!("Static data loaded: {} cells", world.cells().len());
        let game = GameState::new(world, self.config.game.clone());
        let mut session = Session::new(game);

        match self.store.load() {
            Some(saved) => self.apply_saved(&mut session, saved),
            None => {
                session.game.start_new_game();
                tracing::info!("New game started");
            }
        }
        self.persist(&session);

        *self.write_status() = SessionStatus::Ready(session);
    }

    /// Run a session operation from async code. Operations persist while
    /// holding the session lock, so they go to the blocking pool rather
    /// than stall a runtime worker on file I/O.
    pub async fn run_blocking<R, F>(self: &Arc<Self>, op: F) -> Result<R, SessionError>
    where
        R: Send + 'static,
        F: FnOnce(&Arc<Self>) -> Result<R, SessionError> + Send + 'static,
    {
        let state = self.clone();
        tokio::task::spawn_blocking(move || op(&state))
            .await
            .map_err(|e| {
                tracing::error!("Session operation failed: {}", e);
                SessionError::Interrupted
            })?
    }

    // ========================================================================
    // GAME LIFECYCLE
    // ========================================================================

    /// Discard the save and start over
    pub fn new_game(&self) -> Result<GameView, SessionError> {
        let mut status = self.write_status();
        let session = ready_mut(&mut status)?;

        self.store.clear();
        session.reset();
        session.game.start_new_game();
        tracing::info!("New game started");

        self.persist(session);
        Ok(GameView::of(session))
    }

    /// Restore `saved`, or the stored save when none is given
    pub fn restore(self: &Arc<Self>, saved: Option<SavedGame>) -> Result<GameView, SessionError> {
        let mut status = self.write_status();
        let session = ready_mut(&mut status)?;

        let saved = saved
            .or_else(|| self.store.load())
            .ok_or(SessionError::NoSavedGame)?;
        session.reset();
        self.apply_saved(session, saved);

        self.persist(session);
        Ok(GameView::of(session))
    }

    fn apply_saved(self: &Arc<Self>, session: &mut Session, saved: SavedGame) {
        if let LoadOutcome::KeptWorld(e) = session.game.load_game(saved) {
            tracing::warn!("Saved map unusable, keeping loaded map: {}", e);
        }
        if !session.game.has_game() {
            tracing::warn!("Saved game has no units, starting a new game");
            session.game.start_new_game();
            return;
        }
        tracing::info!("Game restored");

        // a game saved mid enemy turn resumes with the enemy's step
        if session.game.turn_owner() == TurnOwner::Enemy {
            self.schedule_enemy_turn(session);
        }
    }

    // ========================================================================
    // PLAYER ACTIONS
    // ========================================================================

    pub fn move_player(&self, target: Hex) -> Result<GameView, SessionError> {
        let mut status = self.write_status();
        let session = ready_mut(&mut status)?;

        match session.game.attempt_move_player(target) {
            Ok(outcome) => {
                tracing::debug!(
                    "Player moved {} -> {} (cost {}, {} AP left)",
                    outcome.from,
                    outcome.to,
                    outcome.cost,
                    outcome.ap_left
                );
                self.persist(session);
            }
            Err(rejection) => {
                tracing::debug!("Move to {} rejected: {}", target, rejection);
                if let Some(notice) = rejection.notice() {
                    session.notice = Some(notice.to_string());
                }
            }
        }

        Ok(GameView::of(session))
    }

    /// Hand the turn to the enemy; its step follows after the configured pause
    pub fn end_turn(self: &Arc<Self>) -> Result<GameView, SessionError> {
        let mut status = self.write_status();
        let session = ready_mut(&mut status)?;

        if let Err(e) = session.game.end_player_turn() {
            tracing::debug!("End turn ignored: {}", e);
            return Ok(GameView::of(session));
        }
        self.schedule_enemy_turn(session);

        self.persist(session);
        Ok(GameView::of(session))
    }

    pub fn view(&self) -> Result<GameView, SessionError> {
        let status = self.read_status();
        ready(&status).map(GameView::of)
    }

    /// Read access to the ready game
    pub fn with_game<R>(&self, f: impl FnOnce(&GameState) -> R) -> Result<R, SessionError> {
        let status = self.read_status();
        ready(&status).map(|session| f(&session.game))
    }

    // ========================================================================
    // ENEMY TURN
    // ========================================================================

    fn schedule_enemy_turn(self: &Arc<Self>, session: &mut Session) {
        let delay = self.config.enemy_delay;
        if delay.is_zero() {
            resolve_enemy(session);
            return;
        }

        let state = Arc::downgrade(self);
        let generation = session.generation;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let Some(state) = state.upgrade() else {
                tracing::debug!("Session gone, enemy step dropped");
                return;
            };
            let finished =
                tokio::task::spawn_blocking(move || state.finish_enemy_turn(generation)).await;
            if let Err(e) = finished {
                tracing::error!("Enemy step failed: {}", e);
            }
        });
        session.pending = Some(PendingEnemyTurn::new(handle));
    }

    fn finish_enemy_turn(&self, generation: u64) {
        let mut status = self.write_status();
        let SessionStatus::Ready(session) = &mut *status else {
            return;
        };
        if session.generation != generation {
            tracing::debug!("Stale enemy step dropped");
            return;
        }
        if let Some(pending) = session.pending.take() {
            pending.complete();
        }

        resolve_enemy(session);
        self.persist(session);
    }

    fn persist(&self, session: &Session) {
        if session.game.has_game() {
            self.store.save(&session.game.snapshot());
        }
    }
}

fn resolve_enemy(session: &mut Session) {
    match session.game.resolve_enemy_turn(&GreedyChase) {
        Ok(Some(step)) if step.moved() => {
            tracing::info!("Enemy moved {} -> {}", step.from, step.to);
        }
        Ok(Some(step)) => tracing::info!("Enemy holds at {}", step.from),
        Ok(None) => tracing::debug!("Enemy turn passed without units"),
        Err(e) => tracing::debug!("Enemy step skipped: {}", e),
    }
}
