#![no_std]

extern crate alloc;

use alloc::vec::Vec;
use core::ops::{BitOr, Index};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

pub use cell::*;
pub use engine::*;
pub use error::*;
pub use generator::*;
pub use types::*;
pub use view::*;

mod cell;
mod engine;
mod error;
mod generator;
mod types;
mod view;

/// Board dimensions and mine count, validated so that `0 < mines < width * height`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub size: Coord2,
    pub mines: CellCount,
}

impl GameConfig {
    pub const fn new_unchecked(size: Coord2, mines: CellCount) -> Self {
        Self { size, mines }
    }

    pub fn new(size: Coord2, mines: CellCount) -> Result<Self> {
        let config = Self::new_unchecked(size, mines);
        config.validate()?;
        Ok(config)
    }

    pub const fn beginner() -> Self {
        Self::new_unchecked((9, 9), 10)
    }

    pub const fn intermediate() -> Self {
        Self::new_unchecked((16, 16), 40)
    }

    pub const fn expert() -> Self {
        Self::new_unchecked((30, 16), 99)
    }

    pub fn validate(&self) -> Result<()> {
        let (size_x, size_y) = self.size;
        if size_x == 0 || size_y == 0 {
            return Err(GameError::EmptyBoard);
        }
        if self.mines == 0 {
            return Err(GameError::NoMines);
        }
        if self.mines >= self.total_cells() {
            return Err(GameError::TooManyMines);
        }
        Ok(())
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.size.0, self.size.1)
    }

    pub const fn safe_cell_count(&self) -> CellCount {
        self.total_cells() - self.mines
    }

    pub const fn contains(&self, (x, y): Coord2) -> bool {
        x < self.size.0 && y < self.size.1
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        if self.contains(coords) {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }
}

/// Fixed placement of mines on a board. Never changes once built.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MineLayout {
    mine_mask: Array2<bool>,
    mine_count: CellCount,
}

impl MineLayout {
    pub(crate) fn from_mine_mask(mine_mask: Array2<bool>) -> Self {
        let mine_count = mine_mask.iter().filter(|&&is_mine| is_mine).count() as CellCount;
        Self {
            mine_mask,
            mine_count,
        }
    }

    /// Builds a layout with mines at exactly `mine_coords`; duplicates count once.
    pub fn from_mine_coords(size: Coord2, mine_coords: &[Coord2]) -> Result<Self> {
        let mut mine_mask: Array2<bool> = Array2::default(size.to_nd_index());

        for &coords in mine_coords {
            if coords.0 >= size.0 || coords.1 >= size.1 {
                return Err(GameError::InvalidCoords);
            }
            mine_mask[coords.to_nd_index()] = true;
        }

        let layout = Self::from_mine_mask(mine_mask);
        layout.game_config().validate()?;
        Ok(layout)
    }

    pub fn game_config(&self) -> GameConfig {
        GameConfig::new_unchecked(self.size(), self.mine_count)
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        self.game_config().validate_coords(coords)
    }

    pub fn size(&self) -> Coord2 {
        array_size(&self.mine_mask)
    }

    pub fn safe_cell_count(&self) -> CellCount {
        self.total_cells() - self.mine_count
    }

    pub fn total_cells(&self) -> CellCount {
        self.mine_mask.len() as CellCount
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn contains_mine(&self, coords: Coord2) -> bool {
        self[coords]
    }

    pub fn adjacent_mine_count(&self, coords: Coord2) -> u8 {
        self.mine_mask
            .iter_neighbors(coords)
            .filter(|&pos| self[pos])
            .count() as u8
    }

    /// All mine positions, in linear index order.
    pub fn mine_coords(&self) -> impl Iterator<Item = Coord2> + '_ {
        self.mine_mask
            .indexed_iter()
            .filter(|&(_, &is_mine)| is_mine)
            .map(|((y, x), _)| (x as Coord, y as Coord))
    }

    pub(crate) fn iter_neighbors(&self, coords: Coord2) -> NeighborIter {
        self.mine_mask.iter_neighbors(coords)
    }
}

impl Index<Coord2> for MineLayout {
    type Output = bool;

    fn index(&self, coords: Coord2) -> &Self::Output {
        &self.mine_mask[coords.to_nd_index()]
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RevealOutcome {
    NoChange,
    Revealed,
    HitMine,
    Won,
}

impl RevealOutcome {
    pub const fn has_update(self) -> bool {
        use RevealOutcome::*;
        match self {
            NoChange => false,
            Revealed => true,
            HitMine => true,
            Won => true,
        }
    }

    /// Whether the game goes on after this outcome.
    pub const fn is_continue(self) -> bool {
        matches!(self, Self::NoChange | Self::Revealed)
    }
}

impl BitOr for RevealOutcome {
    type Output = RevealOutcome;

    fn bitor(self, rhs: Self) -> Self::Output {
        use RevealOutcome::*;
        match (self, rhs) {
            (HitMine, _) => HitMine,
            (_, HitMine) => HitMine,
            (Won, _) => Won,
            (_, Won) => Won,
            (Revealed, _) => Revealed,
            (_, Revealed) => Revealed,
            (NoChange, NoChange) => NoChange,
        }
    }
}

/// Result of a reveal: what happened, and every cell whose state changed, in the order it changed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RevealResult {
    pub outcome: RevealOutcome,
    pub changed: Vec<Coord2>,
}

impl RevealResult {
    pub const fn no_change() -> Self {
        Self {
            outcome: RevealOutcome::NoChange,
            changed: Vec::new(),
        }
    }

    fn merge(mut self, other: Self) -> Self {
        self.outcome = self.outcome | other.outcome;
        self.changed.extend(other.changed);
        self
    }
}

/// Result of cycling a cell's mark.
///
/// `flagged_delta` is the change in the number of [`Mark::Warning`] cells: `+1` when the cell
/// enters `Warning`, `-1` when it leaves it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FlagChange {
    pub mark: Mark,
    pub flagged_delta: i8,
}

impl FlagChange {
    pub const NO_CHANGE: Self = Self {
        mark: Mark::None,
        flagged_delta: 0,
    };

    pub(crate) const fn between(before: Mark, after: Mark) -> Self {
        let flagged_delta = match (before, after) {
            (Mark::Warning, Mark::Warning) => 0,
            (_, Mark::Warning) => 1,
            (Mark::Warning, _) => -1,
            _ => 0,
        };
        Self {
            mark: after,
            flagged_delta,
        }
    }
}

/// Terminal status of a game.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    InProgress,
    Won,
    Lost,
}
