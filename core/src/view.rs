use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// What a renderer may know about a single cell.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellView {
    pub revealed: bool,
    pub mark: Mark,
    /// Adjacent mine count, known once a safe cell is revealed.
    pub adjacent: Option<u8>,
    /// Mine state, `None` while the game is in progress.
    pub mine: Option<bool>,
}

impl Board {
    pub fn cell_view(&self, coords: Coord2) -> Result<CellView> {
        let cell = self.cell_at(coords)?;
        let mine = self.has_mine_at(coords)?;
        Ok(CellView::new(cell, mine))
    }
}

impl CellView {
    fn new(cell: EngineCell, mine: Option<bool>) -> Self {
        let adjacent = match cell {
            EngineCell::Revealed(count) => Some(count),
            EngineCell::Hidden(_) | EngineCell::Exposed => None,
        };
        Self {
            revealed: !cell.is_unrevealed(),
            mark: cell.mark(),
            adjacent,
            mine,
        }
    }
}

/// Snapshot of everything a renderer needs to redraw the whole board.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardView {
    pub size: Coord2,
    pub outcome: Outcome,
    pub mines_left: isize,
    pub triggered_mine: Option<Coord2>,
    cells: Array2<CellView>,
}

impl BoardView {
    pub fn from_board(board: &Board) -> Self {
        let size = board.size();
        let mine_layout = board.mine_layout();
        let cells = Array2::from_shape_fn(size.to_nd_index(), |(y, x)| {
            let coords = (x as Coord, y as Coord);
            let cell = board.cell_at(coords).unwrap_or_default();
            CellView::new(cell, mine_layout.map(|layout| layout.contains_mine(coords)))
        });

        Self {
            size,
            outcome: board.outcome(),
            mines_left: board.supposed_mines_remaining(),
            triggered_mine: board.triggered_mine(),
            cells,
        }
    }

    pub fn cell(&self, coords: Coord2) -> Option<&CellView> {
        self.cells.get(coords.to_nd_index())
    }

    /// Cells row by row, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = ndarray::ArrayView1<'_, CellView>> {
        self.cells.rows().into_iter()
    }
}
