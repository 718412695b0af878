use std::path::PathBuf;

use mineboard_core::{Coord, Coord2};
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Reveal(Coord2),
    Chord(Coord2),
    Flag(Coord2),
    Save(PathBuf),
    Help,
    Quit,
}

#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("empty command")]
    Empty,
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("invalid coordinate '{0}'")]
    InvalidNumber(String),
    /// Coordinates typed by the player start at 1.
    #[error("coordinates start at 1")]
    ZeroCoordinate,
    #[error("unknown command '{0}', type 'h' for help")]
    Unknown(String),
}

pub const HELP: &str = "\
Commands:
  r x y   - reveal cell at column x, row y (1-based)
  c x y   - reveal all neighbours of a number whose mines are flagged
  f x y   - cycle marker at x, y: flag, question, none
  s path  - save the game as JSON
  q       - quit
  h/help  - show this help";

impl std::str::FromStr for Command {
    type Err = ParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = line.split_whitespace().collect();
        let Some(name) = parts.first() else {
            return Err(ParseError::Empty);
        };

        match name.to_lowercase().as_str() {
            "q" | "quit" | "exit" => Ok(Self::Quit),
            "h" | "help" => Ok(Self::Help),
            "r" | "reveal" => parse_coords(&parts, "r x y").map(Self::Reveal),
            "c" | "chord" => parse_coords(&parts, "c x y").map(Self::Chord),
            "f" | "flag" => parse_coords(&parts, "f x y").map(Self::Flag),
            "s" | "save" => match parts.get(1) {
                Some(path) => Ok(Self::Save(PathBuf::from(path))),
                None => Err(ParseError::Usage("s path")),
            },
            other => Err(ParseError::Unknown(other.to_owned())),
        }
    }
}

/// Reads 1-based `x y` arguments and converts them to board coordinates.
fn parse_coords(parts: &[&str], usage: &'static str) -> Result<Coord2, ParseError> {
    let [_, x, y] = parts else {
        return Err(ParseError::Usage(usage));
    };
    Ok((parse_axis(x)?, parse_axis(y)?))
}

fn parse_axis(value: &str) -> Result<Coord, ParseError> {
    let value: Coord = value
        .parse()
        .map_err(|_| ParseError::InvalidNumber(value.to_owned()))?;
    value.checked_sub(1).ok_or(ParseError::ZeroCoordinate)
}
