//! Play command - a line-oriented terminal session
//!
//! The enemy answers `end` immediately; there is no pacing delay here.

use std::collections::HashSet;
use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use realms_core::{GameState, GreedyChase, Hex, World};

use crate::server::load_game_config;

const HELP: &str = "\
commands:
  move <q> <r>   step to an adjacent hex (alias: m)
  end            end your turn (alias: e)
  reach          list hexes you can step onto
  show           draw the map (@ you, E enemy, * reachable, # impassable)
  new            start a new game
  quit           leave";

#[derive(Args)]
pub struct PlayArgs {
    /// Directory holding terrains.json and map.json
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,

    /// Game rules file (JSON); defaults apply when omitted
    #[arg(long)]
    pub config: Option<PathBuf>,
}

pub fn run(args: PlayArgs) -> Result<()> {
    let world = World::load_dir(&args.data_dir)
        .with_context(|| format!("Failed to load game data from {}", args.data_dir.display()))?;
    let config = load_game_config(args.config.as_deref())?;
    tracing::info!("Loaded {} cells from {}", world.cells().len(), args.data_dir.display());

    let mut game = GameState::new_game(world, config);
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    play_session(&mut game, stdin.lock(), stdout.lock())
}

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Move(Hex),
    End,
    Reach,
    Show,
    New,
    Help,
    Quit,
}

fn parse_command(line: &str) -> Result<Command, String> {
    let mut words = line.split_whitespace();
    let verb = words.next().unwrap_or_default();
    let command = match verb {
        "move" | "m" => {
            let mut coord = || -> Result<i32, String> {
                let word = words.next().ok_or("usage: move <q> <r>")?;
                word.parse().map_err(|_| format!("not a coordinate: {}", word))
            };
            let q = coord()?;
            let r = coord()?;
            Command::Move(Hex::new(q, r))
        }
        "end" | "e" => Command::End,
        "reach" => Command::Reach,
        "show" => Command::Show,
        "new" => Command::New,
        "help" | "?" => Command::Help,
        "quit" | "q" | "exit" => Command::Quit,
        other => return Err(format!("unknown command: {} (try help)", other)),
    };
    Ok(command)
}

/// Drive a game from `input` until EOF or `quit`
pub fn play_session<R: BufRead, W: Write>(game: &mut GameState, input: R, mut out: W) -> Result<()> {
    writeln!(out, "{}", render_map(game))?;
    writeln!(out, "{}", status_line(game))?;

    for line in input.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let command = match parse_command(line) {
            Ok(command) => command,
            Err(msg) => {
                writeln!(out, "{}", msg)?;
                continue;
            }
        };

        match command {
            Command::Move(target) => match game.attempt_move_player(target) {
                Ok(outcome) => {
                    writeln!(out, "Moved to {} ({} AP left)", outcome.to, outcome.ap_left)?
                }
                Err(rejection) => writeln!(out, "{}", rejection)?,
            },
            Command::End => {
                match game.end_turn_and_resolve(&GreedyChase)? {
                    Some(step) if step.moved() => writeln!(out, "Enemy moves to {}", step.to)?,
                    Some(step) => writeln!(out, "Enemy holds at {}", step.from)?,
                    None => {}
                }
                writeln!(out, "{}", status_line(game))?;
            }
            Command::Reach => {
                let reachable: Vec<String> = game
                    .reachable_neighbors()
                    .iter()
                    .map(|hex| format!("({},{})", hex.q, hex.r))
                    .collect();
                if reachable.is_empty() {
                    writeln!(out, "Nowhere to go; end your turn")?;
                } else {
                    writeln!(out, "Reachable: {}", reachable.join(" "))?;
                }
            }
            Command::Show => {
                writeln!(out, "{}", render_map(game))?;
                writeln!(out, "{}", status_line(game))?;
            }
            Command::New => {
                game.start_new_game();
                writeln!(out, "New game")?;
                writeln!(out, "{}", status_line(game))?;
            }
            Command::Help => writeln!(out, "{}", HELP)?,
            Command::Quit => break,
        }
    }

    Ok(())
}

fn status_line(game: &GameState) -> String {
    let player = game
        .player()
        .map(|p| format!("Hero {} HP {} AP {}", p.pos(), p.hp, p.action_points()))
        .unwrap_or_default();
    let enemy = game
        .enemy()
        .map(|e| format!("Enemy {}", e.pos()))
        .unwrap_or_default();
    format!("[{} turn] {} | {}", game.turn_owner(), player, enemy)
}

/// Widest and tallest stretch of the map drawn at once
const VIEW_SPAN: i32 = 40;

/// Clamp `lo..=hi` to at most `VIEW_SPAN` values, kept around `focus` when given
fn view_range(lo: i32, hi: i32, focus: Option<i32>) -> (i32, i32) {
    if i64::from(hi) - i64::from(lo) < i64::from(VIEW_SPAN) {
        return (lo, hi);
    }
    let start = focus
        .map_or(lo, |f| f.saturating_sub(VIEW_SPAN / 2))
        .clamp(lo, hi - (VIEW_SPAN - 1));
    (start, start + (VIEW_SPAN - 1))
}

/// Text rendering of the map, one axial row per line, shifted like the hex
/// grid. Large maps show a window around the player.
fn render_map(game: &GameState) -> String {
    let world = game.world();
    let cells = world.cells();
    if cells.is_empty() {
        return "(empty map)".to_string();
    }

    let player = game.player().map(|u| u.pos());
    let enemy = game.enemy().map(|u| u.pos());
    let reachable: HashSet<Hex> = game.reachable_neighbors().into_iter().collect();

    let (min_q, max_q) = view_range(
        cells.iter().map(|c| c.q).min().unwrap_or(0),
        cells.iter().map(|c| c.q).max().unwrap_or(0),
        player.map(|p| p.q),
    );
    let (min_r, max_r) = view_range(
        cells.iter().map(|c| c.r).min().unwrap_or(0),
        cells.iter().map(|c| c.r).max().unwrap_or(0),
        player.map(|p| p.r),
    );

    let mut map = String::new();
    for r in min_r..=max_r {
        let mut row = " ".repeat(usize::try_from(r - min_r).unwrap_or(0));
        for q in min_q..=max_q {
            let hex = Hex::new(q, r);
            let glyph = if player == Some(hex) {
                '@'
            } else if enemy == Some(hex) {
                'E'
            } else if reachable.contains(&hex) {
                '*'
            } else {
                match world.cell_at(hex).and_then(|cell| world.terrain_of(cell)) {
                    None => ' ',
                    Some(terrain) if !terrain.passable => '#',
                    Some(terrain) => terrain.id.chars().next().unwrap_or('?'),
                }
            };
            row.push(glyph);
            row.push(' ');
        }
        map.push_str(row.trim_end());
        map.push('\n');
    }
    map.pop();
    map
}
