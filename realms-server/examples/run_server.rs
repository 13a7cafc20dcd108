//! Example to run the Eclipse of Realms server standalone
//!
//! Run with: cargo run -p realms-server --example run_server

use realms_server::{run_server, ServerConfig};
use std::path::PathBuf;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let config = ServerConfig {
        data_dir: PathBuf::from("data"),
        ..ServerConfig::default()
    };

    tracing::info!("Open http://localhost:{}/ to play", config.port);

    run_server(config).await
}
