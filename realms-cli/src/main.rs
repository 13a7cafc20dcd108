//! Eclipse of Realms CLI - Command-line interface
//!
//! Commands:
//! - serve: Start the browser game server
//! - play: Play in the terminal
//! - codex: Print the terrain table

mod codex;
mod play;
mod server;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "realms")]
#[command(about = "Eclipse of Realms - minimal turn-based strategy on hexes")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the browser game server
    Serve(server::ServerArgs),
    /// Play a session in the terminal
    Play(play::PlayArgs),
    /// Print the terrain table
    Codex(codex::CodexArgs),
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so terminal play output stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(args) => server::run(args),
        Commands::Play(args) => play::run(args),
        Commands::Codex(args) => codex::run(args),
    }
}
