//! Eclipse of Realms Server - HTTP host for the browser UI
//!
//! This crate provides the web backend:
//! - Static data loading (terrain + map tables)
//! - One game session with a deferred enemy turn
//! - Best-effort saved game persistence
//! - REST API for game operations
//! - Static file serving for the visualizer

pub mod data;
pub mod persistence;
mod routes;
pub mod session;
pub mod state;

use axum::{
    routing::{get, post},
    Router,
};
use realms_core::GameConfig;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tower_http::services::ServeDir;

pub use persistence::{JsonFileStore, MemoryStore, SnapshotStore};
pub use session::GameView;
pub use state::{ServerState, SessionConfig, SessionError, SessionStatus};

/// Pause before the enemy answers an end-turn
pub const DEFAULT_ENEMY_DELAY: Duration = Duration::from_millis(180);

/// Server configuration
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub port: u16,
    pub static_dir: PathBuf,
    pub data_dir: PathBuf,
    pub save_path: PathBuf,
    pub enemy_delay: Duration,
    pub game: GameConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8002,
            static_dir: PathBuf::from("visualizer"),
            data_dir: PathBuf::from("data"),
            save_path: PathBuf::from("eor-save-v1.json"),
            enemy_delay: DEFAULT_ENEMY_DELAY,
            game: GameConfig::default(),
        }
    }
}

/// Create the router with all routes
pub fn create_router(config: &ServerConfig, state: Arc<ServerState>) -> Router {
    let static_service = ServeDir::new(&config.static_dir);

    Router::new()
        // Status endpoint
        .route("/api/status", get(routes::status::status_handler))
        // Static tables
        .route("/api/terrains", get(routes::terrains::get_terrains))
        .route("/api/board", get(routes::board::get_board))
        // Game API
        .route("/api/game", get(routes::game::get_game))
        .route("/api/game/new", post(routes::game::new_game))
        .route("/api/game/load", post(routes::game::load_game))
        .route("/api/game/move", post(routes::game::move_player))
        .route("/api/game/end-turn", post(routes::game::end_turn))
        // Shared state
        .with_state(state)
        // Static file serving (must be last)
        .fallback_service(static_service)
}

/// Build the shared state for `config`, saving to `save_path`
pub fn create_state(config: &ServerConfig) -> Arc<ServerState> {
    let store = JsonFileStore::new(&config.save_path);
    Arc::new(ServerState::new(SessionConfig::from(config), Box::new(store)))
}

/// Start the HTTP server
pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let state = create_state(&config);
    let router = create_router(&config, state.clone());

    tracing::info!("Eclipse of Realms server starting on http://0.0.0.0:{}", config.port);
    tracing::info!("Static files served from: {}", config.static_dir.display());
    tracing::info!("Game data read from: {}", config.data_dir.display());

    // Requests answer 503 until the tables are in
    tokio::spawn(state.load_data());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
