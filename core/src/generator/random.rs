use alloc::vec::Vec;
use ndarray::Array2;

use super::*;

/// Generation strategy that can optionally try to make the starting tile zero or at least safe, but other than that is
/// purely random.
///
/// Mines are placed by rejection sampling: a uniformly random cell is drawn until one is found that is neither a mine
/// yet nor excluded by the start policy. The same seed always gives the same layout.
#[derive(Clone, Debug, PartialEq)]
pub struct RandomMinefieldGenerator {
    seed: u64,
    start: Coord2,
    start_tile: StartTile,
}

impl RandomMinefieldGenerator {
    pub fn new(seed: u64, start: Coord2, start_tile: StartTile) -> Self {
        Self {
            seed,
            start,
            start_tile,
        }
    }

    /// Generator without any start protection, as used when mines are placed before the first move.
    pub fn unprotected(seed: u64) -> Self {
        Self::new(seed, (0, 0), StartTile::Random)
    }
}

impl MinefieldGenerator for RandomMinefieldGenerator {
    fn generate(self, config: GameConfig) -> Result<MineLayout> {
        use StartTile::*;
        use rand::prelude::*;

        config.validate()?;
        let start = config.validate_coords(self.start)?;
        let total_cells = config.total_cells();
        let zero_area = 1 + NeighborIter::new(start, config.size).count() as CellCount;

        let actual_start_tile = match self.start_tile {
            Random => Random,
            SimpleSafe | AlwaysZero if config.mines + 1 > total_cells => {
                log::warn!("Cannot make start tile safe, fallback to random");
                Random
            }
            SimpleSafe => SimpleSafe,
            AlwaysZero if config.mines + zero_area > total_cells => {
                log::warn!("Cannot make start tile zero, fallback to simple safe");
                SimpleSafe
            }
            AlwaysZero => AlwaysZero,
        };

        let mut excluded: Array2<bool> = Array2::default(config.size.to_nd_index());
        match actual_start_tile {
            Random => {}
            SimpleSafe => {
                excluded[start.to_nd_index()] = true;
            }
            AlwaysZero => {
                excluded[start.to_nd_index()] = true;
                for coords in NeighborIter::new(start, config.size) {
                    excluded[coords.to_nd_index()] = true;
                }
            }
        }

        let mut mines: Array2<bool> = Array2::default(config.size.to_nd_index());
        let mut mines_placed: CellCount = 0;
        let mut rng = SmallRng::seed_from_u64(self.seed);
        let (width, _) = config.size;

        while mines_placed < config.mines {
            let index = rng.random_range(0..usize::from(total_cells));
            let pos = from_linear_index(index, width).to_nd_index();
            if mines[pos] || excluded[pos] {
                continue;
            }
            mines[pos] = true;
            mines_placed += 1;
        }

        let layout = MineLayout::from_mine_mask(mines);
        log::trace!(
            "Mines generated at: {:?}",
            layout.mine_coords().collect::<Vec<_>>()
        );
        Ok(layout)
    }
}
