use serde::{Deserialize, Serialize};

use crate::*;
pub use random::*;

mod random;

pub trait MinefieldGenerator {
    fn generate(self, config: GameConfig) -> Result<MineLayout>;
}

/// How much protection the first revealed cell gets from mine placement.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StartTile {
    /// Mines are placed before any move, the first reveal may hit one.
    Random,
    /// The first revealed cell is never a mine.
    #[default]
    SimpleSafe,
    /// The first revealed cell and its neighbours are never mines, so it always opens a region.
    AlwaysZero,
}

impl StartTile {
    /// Whether mines can only be placed once the first revealed cell is known.
    pub const fn needs_start(self) -> bool {
        !matches!(self, Self::Random)
    }
}
