//! Server state management
//!
//! One hosted game session plus its saved-game store.

use crate::persistence::SnapshotStore;
use crate::ServerConfig;
use realms_core::{GameConfig, GameState};
use std::path::PathBuf;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;

/// Enemy step scheduled after the end-turn pause.
///
/// Dropping it aborts the task, so a session that is reset or torn down
/// never receives a stale step.
#[derive(Debug)]
pub struct PendingEnemyTurn {
    handle: Option<JoinHandle<()>>,
}

impl PendingEnemyTurn {
    pub(crate) fn new(handle: JoinHandle<()>) -> Self {
        Self {
            handle: Some(handle),
        }
    }

    /// Called from the task itself once it has applied the step
    pub(crate) fn complete(mut self) {
        self.handle = None;
    }
}

impl Drop for PendingEnemyTurn {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

/// A ready session: the game plus its notice channel
#[derive(Debug)]
pub struct Session {
    pub game: GameState,
    /// Last rejected action's notice, until replaced or cleared
    pub notice: Option<String>,
    /// Bumped on every new/loaded game; pending enemy steps carry it
    pub(crate) generation: u64,
    pub(crate) pending: Option<PendingEnemyTurn>,
}

impl Session {
    pub(crate) fn new(game: GameState) -> Self {
        Self {
            game,
            notice: None,
            generation: 0,
            pending: None,
        }
    }

    /// Forget any scheduled enemy step and the notice; used on new/load
    pub(crate) fn reset(&mut self) {
        self.pending = None;
        self.notice = None;
        self.generation += 1;
    }

    pub fn enemy_pending(&self) -> bool {
        self.pending.is_some()
    }
}

/// Lifecycle of the static data load
#[derive(Debug)]
pub enum SessionStatus {
    Loading,
    Ready(Session),
    /// Terminal: play never starts after a failed load
    Failed(String),
}

impl SessionStatus {
    pub fn label(&self) -> &'static str {
        match self {
            SessionStatus::Loading => "loading",
            SessionStatus::Ready(_) => "ready",
            SessionStatus::Failed(_) => "failed",
        }
    }
}

/// Session is not playable
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Loading…")]
    Loading,

    #[error("{0}")]
    LoadFailed(String),

    #[error("no saved game")]
    NoSavedGame,

    #[error("session operation did not complete")]
    Interrupted,
}

/// Settings the session needs after startup
#[derive(Clone, Debug)]
pub struct SessionConfig {
    pub data_dir: PathBuf,
    pub enemy_delay: Duration,
    pub game: GameConfig,
}

impl From<&ServerConfig> for SessionConfig {
    fn from(config: &ServerConfig) -> Self {
        Self {
            data_dir: config.data_dir.clone(),
            enemy_delay: config.enemy_delay,
            game: config.game.clone(),
        }
    }
}

/// Server-wide shared state
pub struct ServerState {
    pub config: SessionConfig,
    pub(crate) store: Box<dyn SnapshotStore>,
    pub(crate) status: RwLock<SessionStatus>,
}

impl ServerState {
    pub fn new(config: SessionConfig, store: Box<dyn SnapshotStore>) -> Self {
        Self {
            config,
            store,
            status: RwLock::new(SessionStatus::Loading),
        }
    }

    // Nothing panics while holding the lock, so a poisoned guard is still
    // consistent.
    pub(crate) fn read_status(&self) -> RwLockReadGuard<'_, SessionStatus> {
        self.status.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn write_status(&self) -> RwLockWriteGuard<'_, SessionStatus> {
        self.status.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn status_label(&self) -> &'static str {
        self.read_status().label()
    }

    pub fn store(&self) -> &dyn SnapshotStore {
        self.store.as_ref()
    }
}
