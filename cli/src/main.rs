use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use mineboard_core::{Board, BoardView, CellCount, Coord, GameConfig, StartTile};

mod command;
mod render;

use command::{Command, HELP};

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Preset {
    Beginner,
    Intermediate,
    Expert,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Start {
    /// Mines are placed before the first move
    Random,
    /// The first revealed cell is never a mine
    Safe,
    /// The first revealed cell always opens an area
    Zero,
}

impl From<Start> for StartTile {
    fn from(start: Start) -> Self {
        match start {
            Start::Random => StartTile::Random,
            Start::Safe => StartTile::SimpleSafe,
            Start::Zero => StartTile::AlwaysZero,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "mineboard", about = "Minesweeper in the terminal", version)]
struct Args {
    /// Standard board, overrides width, height and mines
    #[arg(long, value_enum)]
    preset: Option<Preset>,
    /// Board width
    #[arg(long, default_value_t = 9)]
    width: Coord,
    /// Board height
    #[arg(long, default_value_t = 9)]
    height: Coord,
    /// Number of mines
    #[arg(long, default_value_t = 10)]
    mines: CellCount,
    /// Seed (0 = random)
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Protection for the first revealed cell
    #[arg(long, value_enum, default_value_t = Start::Safe)]
    start: Start,
    /// Resume a game saved with the `s` command
    #[arg(long)]
    load: Option<PathBuf>,
    #[command(flatten)]
    verbose: Verbosity<WarnLevel>,
}

impl Args {
    fn game_config(&self) -> Result<GameConfig> {
        let config = match self.preset {
            Some(Preset::Beginner) => GameConfig::beginner(),
            Some(Preset::Intermediate) => GameConfig::intermediate(),
            Some(Preset::Expert) => GameConfig::expert(),
            None => GameConfig::new((self.width, self.height), self.mines)
                .context("invalid board configuration")?,
        };
        Ok(config)
    }

    fn new_board(&self) -> Result<Board> {
        if let Some(path) = &self.load {
            return load_board(path);
        }

        let seed = if self.seed == 0 {
            rand::random()
        } else {
            self.seed
        };
        let config = self.game_config()?;
        let board = Board::new(config, seed, self.start.into())?;
        log::info!("New {}", summary(&board));
        Ok(board)
    }
}

/// Board size and mine count; the seed stays out since it determines the mines.
fn summary(board: &Board) -> String {
    let (width, height) = board.size();
    format!("{width}x{height} game with {} mines", board.total_mines())
}

fn load_board(path: &Path) -> Result<Board> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let board = serde_json::from_str(&json)
        .with_context(|| format!("{} is not a saved game", path.display()))?;
    log::info!("Resumed game from {}", path.display());
    Ok(board)
}

fn save_board(board: &Board, path: &Path) -> Result<()> {
    let json = serde_json::to_string(board).context("failed to serialize game")?;
    fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    log::info!("Saved game to {}", path.display());
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(args.verbose.tracing_level_filter())
        .with_writer(io::stderr)
        .init();

    let mut board = args.new_board()?;
    println!("Minesweeper {}", summary(&board));
    println!("Coordinates are 1-based. Type 'h' for help.");
    println!("{HELP}");

    let mut lines = io::stdin().lock().lines();
    loop {
        let view = BoardView::from_board(&board);
        println!("\n{}", render::render(&view));
        println!("{}", render::status_line(&view));
        if board.is_finished() {
            break;
        }

        print!("> ");
        io::stdout().flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        let line = line.context("failed to read input")?;
        if line.trim().is_empty() {
            continue;
        }

        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(err) => {
                println!("{err}");
                continue;
            }
        };

        let result = match command {
            Command::Quit => break,
            Command::Help => {
                println!("{HELP}");
                continue;
            }
            Command::Save(path) => {
                if let Err(err) = save_board(&board, &path) {
                    println!("{err:#}");
                }
                continue;
            }
            Command::Reveal(coords) => board.reveal(coords).map(|result| {
                log::debug!(
                    "Reveal {coords:?}: {:?}, {} cells changed",
                    result.outcome,
                    result.changed.len()
                );
            }),
            Command::Chord(coords) => board.chord_reveal(coords).map(|result| {
                log::debug!(
                    "Chord {coords:?}: {:?}, {} cells changed",
                    result.outcome,
                    result.changed.len()
                );
            }),
            Command::Flag(coords) => board.cycle_flag(coords).map(|change| {
                log::debug!("Marked {coords:?} as {:?}", change.mark);
            }),
        };

        if let Err(err) = result {
            println!("{err}");
        }
    }

    Ok(())
}
