//! Server command - start the browser game server
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: configure_server(), start_server()
//! - Level 3: (delegated to realms-server crate)
//! - Level 4: configuration validation

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;

use realms_core::GameConfig;
use realms_server::{run_server, ServerConfig};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct ServerArgs {
    /// Port number to listen on
    #[arg(long, default_value = "8002")]
    pub port: u16,

    /// Directory containing static files for the visualizer
    #[arg(long, default_value = "visualizer")]
    pub static_dir: PathBuf,

    /// Directory holding terrains.json and map.json
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,

    /// Saved game file
    #[arg(long, default_value = "eor-save-v1.json")]
    pub save_path: PathBuf,

    /// Pause before the enemy moves, in milliseconds
    #[arg(long, default_value = "180")]
    pub enemy_delay_ms: u64,

    /// Game rules file (JSON); defaults apply when omitted
    #[arg(long)]
    pub config: Option<PathBuf>,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run server command
///
/// This function reads like a table of contents:
/// 1. Configure server
/// 2. Start server (blocking)
pub fn run(args: ServerArgs) -> Result<()> {
    let config = configure_server(&args)?;

    tracing::info!("Starting Eclipse of Realms server on port {}", config.port);

    start_server(config)
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Configure server from command arguments
fn configure_server(args: &ServerArgs) -> Result<ServerConfig> {
    validate_static_dir(&args.static_dir)?;
    validate_data_dir(&args.data_dir)?;

    Ok(ServerConfig {
        port: args.port,
        static_dir: args.static_dir.clone(),
        data_dir: args.data_dir.clone(),
        save_path: args.save_path.clone(),
        enemy_delay: Duration::from_millis(args.enemy_delay_ms),
        game: load_game_config(args.config.as_deref())?,
    })
}

/// Start the server (blocking)
fn start_server(config: ServerConfig) -> Result<()> {
    // Create tokio runtime for async server
    let runtime = tokio::runtime::Runtime::new()?;

    runtime.block_on(async { run_server(config).await })
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

/// Load game rules, falling back to the defaults
pub fn load_game_config(path: Option<&Path>) -> Result<GameConfig> {
    match path {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(GameConfig::default()),
    }
}

/// Validate that static directory exists
fn validate_static_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        tracing::warn!(
            "Static directory does not exist: {}. Server will start but may not serve files.",
            path.display()
        );
    } else if !path.is_dir() {
        anyhow::bail!(
            "Static path exists but is not a directory: {}",
            path.display()
        );
    }

    Ok(())
}

/// The data directory must be a directory if it exists; a missing one
/// surfaces as a load error in the session
fn validate_data_dir(path: &Path) -> Result<()> {
    if path.exists() && !path.is_dir() {
        anyhow::bail!("Data path exists but is not a directory: {}", path.display());
    }
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn default_args() -> ServerArgs {
        ServerArgs {
            port: 8002,
            static_dir: PathBuf::from("test_static"),
            data_dir: PathBuf::from("test_data"),
            save_path: PathBuf::from("save.json"),
            enemy_delay_ms: 180,
            config: None,
        }
    }

    #[test]
    fn test_configure_server_defaults() {
        let config = configure_server(&default_args()).unwrap();
        assert_eq!(config.port, 8002);
        assert_eq!(config.static_dir, PathBuf::from("test_static"));
        assert_eq!(config.enemy_delay, Duration::from_millis(180));
        assert_eq!(config.game, GameConfig::default());
    }

    #[test]
    fn test_validate_static_dir_nonexistent() {
        // Should not error, just warn
        let result = validate_static_dir(Path::new("/nonexistent/path"));
        assert!(result.is_ok());
    }

    #[test]
    fn test_data_dir_must_be_directory() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let args = ServerArgs {
            data_dir: file.path().to_path_buf(),
            ..default_args()
        };
        assert!(configure_server(&args).is_err());
    }

    #[test]
    fn test_custom_game_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.json");
        std::fs::write(&path, r#"{"action_points_per_turn": 4}"#).unwrap();

        let args = ServerArgs {
            config: Some(path),
            ..default_args()
        };
        let config = configure_server(&args).unwrap();
        assert_eq!(config.game.action_points_per_turn, 4);

        let missing = ServerArgs {
            config: Some(dir.path().join("missing.json")),
            ..default_args()
        };
        assert!(configure_server(&missing).is_err());
    }
}
