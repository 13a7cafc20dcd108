//! Codex command - print the terrain table

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use realms_core::World;

#[derive(Args)]
pub struct CodexArgs {
    /// Directory holding terrains.json and map.json
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,

    /// Print the id-keyed terrain map as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: CodexArgs) -> Result<()> {
    let world = World::load_dir(&args.data_dir)
        .with_context(|| format!("Failed to load game data from {}", args.data_dir.display()))?;
    let stdout = std::io::stdout();
    write_codex(&world, args.json, stdout.lock())
}

fn write_codex<W: Write>(world: &World, json: bool, mut out: W) -> Result<()> {
    if json {
        let table = serde_json::to_string_pretty(&world.terrain_by_id())?;
        writeln!(out, "{}", table)?;
        return Ok(());
    }

    writeln!(out, "{:<12} {:>8} {:>9}  {}", "terrain", "moveCost", "passable", "color")?;
    for terrain in world.terrains() {
        writeln!(
            out,
            "{:<12} {:>8} {:>9}  {}",
            terrain.id,
            terrain.cost(),
            if terrain.passable { "yes" } else { "no" },
            terrain.color
        )?;
    }
    writeln!(out, "{} cells on the map", world.cells().len())?;
    Ok(())
}
