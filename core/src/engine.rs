use alloc::collections::{BTreeSet, VecDeque};
use alloc::vec::Vec;
use core::fmt;
use core::num::Saturating;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineState {
    #[default]
    Ready,
    Active,
    Won,
    Lost,
}

impl EngineState {
    pub const fn is_ready(self) -> bool {
        matches!(self, Self::Ready)
    }

    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }

    pub const fn outcome(self) -> Outcome {
        match self {
            Self::Ready | Self::Active => Outcome::InProgress,
            Self::Won => Outcome::Won,
            Self::Lost => Outcome::Lost,
        }
    }
}

/// A single game: mine layout plus everything the player has done to it.
///
/// Mines are placed at construction for [`StartTile::Random`], otherwise on the first reveal so the start policy can
/// protect the revealed cell. Nothing about unrevealed mines is observable until the game is finished.
///
/// The serialized form is a save file and carries the seed and the mine layout in the clear. Deserializing checks the
/// save against its own config and layout, see [`GameError::InvalidBoardShape`] and [`GameError::InconsistentSave`].
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SavedBoard")]
pub struct Board {
    config: GameConfig,
    seed: u64,
    start_tile: StartTile,
    mine_layout: Option<MineLayout>,
    board: Array2<EngineCell>,
    revealed_safe_count: Saturating<CellCount>,
    flagged_count: Saturating<CellCount>,
    state: EngineState,
    triggered_mine: Option<Coord2>,
}

/// Unchecked deserialization target, turned into a [`Board`] by [`Board::check_save`].
#[derive(Deserialize)]
struct SavedBoard {
    config: GameConfig,
    seed: u64,
    start_tile: StartTile,
    mine_layout: Option<MineLayout>,
    board: Array2<EngineCell>,
    revealed_safe_count: Saturating<CellCount>,
    flagged_count: Saturating<CellCount>,
    state: EngineState,
    triggered_mine: Option<Coord2>,
}

impl TryFrom<SavedBoard> for Board {
    type Error = GameError;

    fn try_from(saved: SavedBoard) -> Result<Self> {
        let board = Self {
            config: saved.config,
            seed: saved.seed,
            start_tile: saved.start_tile,
            mine_layout: saved.mine_layout,
            board: saved.board,
            revealed_safe_count: saved.revealed_safe_count,
            flagged_count: saved.flagged_count,
            state: saved.state,
            triggered_mine: saved.triggered_mine,
        };
        board.check_save()?;
        Ok(board)
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Board");
        s.field("config", &self.config)
            .field("start_tile", &self.start_tile)
            .field("state", &self.state)
            .field("board", &self.board)
            .field("revealed_safe_count", &self.revealed_safe_count.0)
            .field("flagged_count", &self.flagged_count.0)
            .field("triggered_mine", &self.triggered_mine);
        // seed and layout would give away the mines of a running game
        if self.state.is_finished() {
            s.field("seed", &self.seed)
                .field("mine_layout", &self.mine_layout)
                .finish()
        } else {
            s.finish_non_exhaustive()
        }
    }
}

impl Board {
    pub fn new(config: GameConfig, seed: u64, start_tile: StartTile) -> Result<Self> {
        config.validate()?;

        let mine_layout = if start_tile.needs_start() {
            None
        } else {
            Some(RandomMinefieldGenerator::unprotected(seed).generate(config)?)
        };

        Ok(Self::from_parts(config, seed, start_tile, mine_layout))
    }

    /// Board over a known layout, e.g. a replay or a hand-made puzzle.
    pub fn with_layout(mine_layout: MineLayout) -> Self {
        let config = mine_layout.game_config();
        Self::from_parts(config, 0, StartTile::Random, Some(mine_layout))
    }

    fn from_parts(
        config: GameConfig,
        seed: u64,
        start_tile: StartTile,
        mine_layout: Option<MineLayout>,
    ) -> Self {
        Self {
            config,
            seed,
            start_tile,
            mine_layout,
            board: Array2::default(config.size.to_nd_index()),
            revealed_safe_count: Saturating(0),
            flagged_count: Saturating(0),
            state: Default::default(),
            triggered_mine: None,
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn outcome(&self) -> Outcome {
        self.state.outcome()
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    pub fn size(&self) -> Coord2 {
        self.config.size
    }

    pub fn total_mines(&self) -> CellCount {
        self.config.mines
    }

    /// Revealed safe cells. Mines exposed by a loss are not counted.
    pub fn revealed_safe_count(&self) -> CellCount {
        self.revealed_safe_count.0
    }

    /// Mine count minus the number of [`Mark::Warning`] cells, can go negative when the player over-flags.
    pub fn supposed_mines_remaining(&self) -> isize {
        (self.config.mines as isize) - (self.flagged_count.0 as isize)
    }

    pub fn cell_at(&self, coords: Coord2) -> Result<EngineCell> {
        let coords = self.config.validate_coords(coords)?;
        Ok(self.board[coords.to_nd_index()])
    }

    /// Whether `coords` holds a mine, only answered once the game is finished.
    pub fn has_mine_at(&self, coords: Coord2) -> Result<Option<bool>> {
        let coords = self.config.validate_coords(coords)?;
        Ok(self.mine_layout().map(|layout| layout.contains_mine(coords)))
    }

    /// The full mine layout, only available once the game is finished.
    pub fn mine_layout(&self) -> Option<&MineLayout> {
        if self.state.is_finished() {
            self.mine_layout.as_ref()
        } else {
            None
        }
    }

    pub fn triggered_mine(&self) -> Option<Coord2> {
        self.triggered_mine
    }

    pub fn cycle_flag(&mut self, coords: Coord2) -> Result<FlagChange> {
        let coords = self.config.validate_coords(coords)?;
        self.check_not_finished()?;

        let EngineCell::Hidden(mark) = self.board[coords.to_nd_index()] else {
            return Ok(FlagChange::NO_CHANGE);
        };

        let next = mark.cycle();
        self.board[coords.to_nd_index()] = EngineCell::Hidden(next);

        let change = FlagChange::between(mark, next);
        match change.flagged_delta {
            1 => self.flagged_count += Saturating(1),
            -1 => self.flagged_count -= Saturating(1),
            _ => {}
        }
        Ok(change)
    }

    pub fn reveal(&mut self, coords: Coord2) -> Result<RevealResult> {
        let coords = self.config.validate_coords(coords)?;
        self.check_not_finished()?;

        if self.board[coords.to_nd_index()] == EngineCell::Hidden(Mark::None) {
            self.ensure_mines(coords)?;
            Ok(self.reveal_single_cell(coords))
        } else {
            Ok(RevealResult::no_change())
        }
    }

    pub fn can_chord_reveal_at(&self, coords: Coord2) -> bool {
        if self.state.is_finished() || !self.config.contains(coords) {
            return false;
        }

        if let EngineCell::Revealed(count) = self.board[coords.to_nd_index()] {
            count == self.count_flagged_neighbors(coords)
        } else {
            false
        }
    }

    /// Reveals every unmarked neighbour of a number whose mines are all flagged, otherwise acts like
    /// [`Board::reveal`].
    pub fn chord_reveal(&mut self, coords: Coord2) -> Result<RevealResult> {
        let coords = self.config.validate_coords(coords)?;
        self.check_not_finished()?;

        if !self.can_chord_reveal_at(coords) {
            return self.reveal(coords);
        }

        let mut result = RevealResult::no_change();
        for neighbor_coords in NeighborIter::new(coords, self.size()) {
            if self.state.is_finished() {
                break;
            }
            result = result.merge(self.reveal_single_cell(neighbor_coords));
        }
        Ok(result)
    }

    fn ensure_mines(&mut self, start: Coord2) -> Result<()> {
        if self.mine_layout.is_none() {
            let generator = RandomMinefieldGenerator::new(self.seed, start, self.start_tile);
            self.mine_layout = Some(generator.generate(self.config)?);
        }
        Ok(())
    }

    fn reveal_single_cell(&mut self, coords: Coord2) -> RevealResult {
        let Some(mine_layout) = &self.mine_layout else {
            return RevealResult::no_change();
        };

        if self.board[coords.to_nd_index()] != EngineCell::Hidden(Mark::None) {
            return RevealResult::no_change();
        }

        if mine_layout[coords] {
            self.triggered_mine = Some(coords);
            let changed = self.expose_mines();
            self.end_game(false);
            return RevealResult {
                outcome: RevealOutcome::HitMine,
                changed,
            };
        }

        let safe_cell_count = mine_layout.safe_cell_count();
        let changed = flood_reveal(&mut self.board, mine_layout, coords);
        self.revealed_safe_count += Saturating(changed.len() as CellCount);
        log::trace!("Revealed {} cells from {:?}", changed.len(), coords);

        let outcome = if self.revealed_safe_count.0 == safe_cell_count {
            self.end_game(true);
            RevealOutcome::Won
        } else {
            self.mark_started();
            RevealOutcome::Revealed
        };
        RevealResult { outcome, changed }
    }

    /// Turns every mine into [`EngineCell::Exposed`], dropping any mark on it.
    fn expose_mines(&mut self) -> Vec<Coord2> {
        let mine_coords: Vec<Coord2> = match &self.mine_layout {
            Some(layout) => layout.mine_coords().collect(),
            None => Vec::new(),
        };

        let mut changed = Vec::with_capacity(mine_coords.len());
        for coords in mine_coords {
            let cell = &mut self.board[coords.to_nd_index()];
            if let EngineCell::Hidden(mark) = *cell {
                if mark == Mark::Warning {
                    self.flagged_count -= Saturating(1);
                }
                *cell = EngineCell::Exposed;
                changed.push(coords);
            }
        }
        changed
    }

    fn mark_started(&mut self) {
        if matches!(self.state, EngineState::Ready) {
            self.state = EngineState::Active;
        }
    }

    fn end_game(&mut self, won: bool) {
        if self.state.is_finished() {
            return;
        }

        self.state = if won {
            EngineState::Won
        } else {
            EngineState::Lost
        };
        if won {
            self.triggered_mine = None;
        }
        log::debug!(
            "Game finished: {:?} after {} revealed cells",
            self.state,
            self.revealed_safe_count.0
        );
    }

    fn count_flagged_neighbors(&self, coords: Coord2) -> u8 {
        NeighborIter::new(coords, self.size())
            .filter(|&pos| self.board[pos.to_nd_index()] == EngineCell::Hidden(Mark::Warning))
            .count() as u8
    }

    /// Cross-checks the grid, counters and state of a loaded game against its config and mine layout.
    fn check_save(&self) -> Result<()> {
        self.config.validate()?;
        let [rows, cols] = self.config.size.to_nd_index();
        if self.board.dim() != (rows, cols) {
            return Err(GameError::InvalidBoardShape);
        }

        let layout = self.mine_layout.as_ref();
        match layout {
            Some(layout) => {
                if layout.mine_mask.dim() != (rows, cols) {
                    return Err(GameError::InvalidBoardShape);
                }
                if layout.mine_count != self.config.mines
                    || layout.mine_coords().count() != usize::from(layout.mine_count)
                {
                    return Err(GameError::InconsistentSave);
                }
            }
            None if self.state.is_ready() && self.start_tile.needs_start() => {}
            None => return Err(GameError::InconsistentSave),
        }

        let mut revealed = 0usize;
        let mut flagged = 0usize;
        let mut exposed = 0usize;
        for ((y, x), &cell) in self.board.indexed_iter() {
            let coords = (x as Coord, y as Coord);
            match (cell, layout) {
                (EngineCell::Hidden(Mark::Warning), _) => flagged += 1,
                (EngineCell::Hidden(_), _) => {}
                (EngineCell::Revealed(count), Some(layout))
                    if !layout[coords] && layout.adjacent_mine_count(coords) == count =>
                {
                    revealed += 1
                }
                (EngineCell::Exposed, Some(layout)) if layout[coords] => exposed += 1,
                _ => return Err(GameError::InconsistentSave),
            }
        }

        if revealed != usize::from(self.revealed_safe_count.0)
            || flagged != usize::from(self.flagged_count.0)
        {
            return Err(GameError::InconsistentSave);
        }

        let all_safe_revealed = revealed == usize::from(self.config.safe_cell_count());
        let consistent = match self.state {
            EngineState::Ready => revealed == 0 && exposed == 0 && self.triggered_mine.is_none(),
            EngineState::Active => {
                revealed > 0 && !all_safe_revealed && exposed == 0 && self.triggered_mine.is_none()
            }
            EngineState::Won => all_safe_revealed && exposed == 0 && self.triggered_mine.is_none(),
            EngineState::Lost => {
                exposed == usize::from(self.config.mines)
                    && self.triggered_mine.is_some_and(|coords| {
                        self.config.contains(coords)
                            && self.board[coords.to_nd_index()] == EngineCell::Exposed
                    })
            }
        };
        if consistent {
            Ok(())
        } else {
            Err(GameError::InconsistentSave)
        }
    }

    fn check_not_finished(&self) -> Result<()> {
        if self.state.is_finished() {
            Err(GameError::AlreadyEnded)
        } else {
            Ok(())
        }
    }
}

/// Reveals `start` and, breadth first, every unmarked hidden cell reachable through zero-count cells.
///
/// `start` must be a hidden, unmarked, safe cell. Returns the revealed cells in reveal order; each appears once.
fn flood_reveal(
    board: &mut Array2<EngineCell>,
    mine_layout: &MineLayout,
    start: Coord2,
) -> Vec<Coord2> {
    let mut changed = Vec::new();
    let mut visited = BTreeSet::from([start]);
    let mut to_visit = VecDeque::from([start]);

    while let Some(visit_coords) = to_visit.pop_front() {
        if board[visit_coords.to_nd_index()] != EngineCell::Hidden(Mark::None)
            || mine_layout[visit_coords]
        {
            continue;
        }

        let adjacent_mines = mine_layout.adjacent_mine_count(visit_coords);
        board[visit_coords.to_nd_index()] = EngineCell::Revealed(adjacent_mines);
        changed.push(visit_coords);

        if adjacent_mines == 0 {
            for pos in mine_layout.iter_neighbors(visit_coords) {
                if board[pos.to_nd_index()] == EngineCell::Hidden(Mark::None) && visited.insert(pos)
                {
                    to_visit.push_back(pos);
                }
            }
        }
    }

    changed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(size: Coord2, mines: &[Coord2]) -> MineLayout {
        MineLayout::from_mine_coords(size, mines).unwrap()
    }

    #[test]
    fn reveal_hits_mine_and_sets_triggered_cell() {
        let mut engine = Board::with_layout(layout((2, 2), &[(0, 0), (1, 1)]));

        let result = engine.reveal((0, 0)).unwrap();

        assert_eq!(result.outcome, RevealOutcome::HitMine);
        assert_eq!(result.changed, [(0, 0), (1, 1)]);
        assert_eq!(engine.state(), EngineState::Lost);
        assert_eq!(engine.outcome(), Outcome::Lost);
        assert_eq!(engine.triggered_mine(), Some((0, 0)));
        assert_eq!(engine.cell_at((1, 1)).unwrap(), EngineCell::Exposed);
        assert_eq!(engine.revealed_safe_count(), 0);
    }

    #[test]
    fn reveal_flood_fill_opens_zero_region() {
        let mut engine = Board::with_layout(layout((3, 3), &[(2, 2)]));

        let result = engine.reveal((0, 0)).unwrap();

        assert_eq!(result.outcome, RevealOutcome::Won);
        assert_eq!(result.changed.len(), 8);
        assert_eq!(engine.cell_at((0, 0)).unwrap(), EngineCell::Revealed(0));
        assert_eq!(engine.cell_at((1, 1)).unwrap(), EngineCell::Revealed(1));
        assert_eq!(engine.cell_at((2, 2)).unwrap(), EngineCell::Hidden(Mark::None));
    }

    #[test]
    fn flood_fill_stops_at_numbers() {
        // column of mines splits the board, the right side stays hidden
        let mut engine = Board::with_layout(layout((5, 3), &[(2, 0), (2, 1), (2, 2)]));

        let result = engine.reveal((0, 1)).unwrap();

        assert_eq!(result.outcome, RevealOutcome::Revealed);
        assert_eq!(result.changed.len(), 6);
        assert_eq!(engine.cell_at((1, 1)).unwrap(), EngineCell::Revealed(3));
        assert_eq!(engine.cell_at((1, 0)).unwrap(), EngineCell::Revealed(2));
        assert!(engine.cell_at((3, 1)).unwrap().is_unrevealed());
        assert_eq!(engine.state(), EngineState::Active);
    }

    #[test]
    fn flood_fill_skips_marked_cells() {
        let mut engine = Board::with_layout(layout((4, 1), &[(3, 0)]));
        engine.cycle_flag((1, 0)).unwrap();
        engine.cycle_flag((1, 0)).unwrap();

        let result = engine.reveal((0, 0)).unwrap();

        assert_eq!(result.changed, [(0, 0)]);
        assert_eq!(engine.cell_at((1, 0)).unwrap(), EngineCell::Hidden(Mark::Unknown));
        assert_eq!(engine.cell_at((2, 0)).unwrap(), EngineCell::Hidden(Mark::None));
    }

    #[test]
    fn reveal_is_idempotent() {
        let mut engine = Board::with_layout(layout((4, 1), &[(3, 0)]));

        engine.reveal((2, 0)).unwrap();
        let count = engine.revealed_safe_count();
        let result = engine.reveal((2, 0)).unwrap();

        assert_eq!(result, RevealResult::no_change());
        assert_eq!(engine.revealed_safe_count(), count);
    }

    #[test]
    fn flagged_cell_cannot_be_revealed() {
        let mut engine = Board::with_layout(layout((2, 1), &[(0, 0)]));

        engine.cycle_flag((0, 0)).unwrap();
        let result = engine.reveal((0, 0)).unwrap();

        assert_eq!(result, RevealResult::no_change());
        assert_eq!(engine.state(), EngineState::Ready);
    }

    #[test]
    fn chord_reveal_uses_flagged_neighbors() {
        let mines = &[(0, 1), (2, 1)];
        let mut engine = Board::with_layout(layout((3, 3), mines));

        engine.reveal((1, 1)).unwrap();
        engine.cycle_flag((0, 1)).unwrap();
        engine.cycle_flag((2, 1)).unwrap();
        assert!(engine.can_chord_reveal_at((1, 1)));

        let result = engine.chord_reveal((1, 1)).unwrap();

        assert_eq!(result.outcome, RevealOutcome::Won);
        assert_eq!(result.changed.len(), 6);
        assert_eq!(engine.cell_at((1, 0)).unwrap(), EngineCell::Revealed(2));
        assert_eq!(engine.cell_at((1, 2)).unwrap(), EngineCell::Revealed(2));
    }

    #[test]
    fn chord_reveal_with_wrong_flag_hits_mine() {
        let mut engine = Board::with_layout(layout((3, 1), &[(0, 0)]));

        engine.reveal((1, 0)).unwrap();
        engine.cycle_flag((2, 0)).unwrap();

        let result = engine.chord_reveal((1, 0)).unwrap();

        assert_eq!(result.outcome, RevealOutcome::HitMine);
        assert_eq!(engine.triggered_mine(), Some((0, 0)));
    }

    #[test]
    fn chord_reveal_without_enough_flags_is_no_change() {
        let mut engine = Board::with_layout(layout((3, 1), &[(0, 0)]));

        engine.reveal((1, 0)).unwrap();

        assert!(!engine.can_chord_reveal_at((1, 0)));
        assert_eq!(engine.chord_reveal((1, 0)).unwrap(), RevealResult::no_change());
    }

    #[test]
    fn winning_board_transitions_to_won_state() {
        let mut engine = Board::with_layout(layout((2, 1), &[(0, 0)]));

        assert_eq!(engine.reveal((1, 0)).unwrap().outcome, RevealOutcome::Won);
        assert_eq!(engine.state(), EngineState::Won);
        assert!(engine.is_finished());
        assert_eq!(engine.triggered_mine(), None);
    }

    #[test]
    fn finished_board_rejects_moves() {
        let mut engine = Board::with_layout(layout((2, 1), &[(0, 0)]));
        engine.reveal((0, 0)).unwrap();

        assert_eq!(engine.reveal((1, 0)), Err(GameError::AlreadyEnded));
        assert_eq!(engine.cycle_flag((1, 0)), Err(GameError::AlreadyEnded));
        assert_eq!(engine.chord_reveal((1, 0)), Err(GameError::AlreadyEnded));
    }

    #[test]
    fn out_of_bounds_is_an_error() {
        let mut engine = Board::with_layout(layout((2, 2), &[(0, 0)]));

        assert_eq!(engine.reveal((2, 0)), Err(GameError::InvalidCoords));
        assert_eq!(engine.cycle_flag((0, 2)), Err(GameError::InvalidCoords));
        assert_eq!(engine.cell_at((5, 5)), Err(GameError::InvalidCoords));
        assert_eq!(engine.has_mine_at((2, 2)), Err(GameError::InvalidCoords));
    }

    #[test]
    fn cycle_flag_tracks_supposed_mines() {
        let mut engine = Board::with_layout(layout((3, 3), &[(0, 0), (2, 2)]));

        let first = engine.cycle_flag((1, 1)).unwrap();
        assert_eq!(first, FlagChange { mark: Mark::Warning, flagged_delta: 1 });
        assert_eq!(engine.supposed_mines_remaining(), 1);

        let second = engine.cycle_flag((1, 1)).unwrap();
        assert_eq!(second, FlagChange { mark: Mark::Unknown, flagged_delta: -1 });
        assert_eq!(engine.supposed_mines_remaining(), 2);

        let third = engine.cycle_flag((1, 1)).unwrap();
        assert_eq!(third, FlagChange { mark: Mark::None, flagged_delta: 0 });

        for coords in [(0, 1), (1, 0), (1, 2)] {
            engine.cycle_flag(coords).unwrap();
        }
        assert_eq!(engine.supposed_mines_remaining(), -1);
    }

    #[test]
    fn cycle_flag_on_revealed_cell_is_no_change() {
        let mut engine = Board::with_layout(layout((3, 1), &[(0, 0)]));
        engine.reveal((1, 0)).unwrap();

        assert_eq!(engine.cycle_flag((1, 0)).unwrap(), FlagChange::NO_CHANGE);
        assert_eq!(engine.cell_at((1, 0)).unwrap(), EngineCell::Revealed(1));
    }

    #[test]
    fn losing_clears_marks_on_mines() {
        let mut engine = Board::with_layout(layout((3, 1), &[(0, 0), (2, 0)]));
        engine.cycle_flag((2, 0)).unwrap();
        assert_eq!(engine.supposed_mines_remaining(), 1);

        let result = engine.reveal((0, 0)).unwrap();

        assert_eq!(result.changed, [(0, 0), (2, 0)]);
        assert_eq!(engine.cell_at((2, 0)).unwrap().mark(), Mark::None);
        assert_eq!(engine.supposed_mines_remaining(), 2);
    }

    #[test]
    fn mines_stay_hidden_until_finished() {
        let mut engine = Board::with_layout(layout((3, 1), &[(1, 0)]));

        engine.reveal((2, 0)).unwrap();
        assert_eq!(engine.has_mine_at((1, 0)), Ok(None));
        assert!(engine.mine_layout().is_none());

        engine.reveal((0, 0)).unwrap();
        assert!(engine.is_finished());
        assert_eq!(engine.has_mine_at((1, 0)), Ok(Some(true)));
        assert_eq!(engine.has_mine_at((0, 0)), Ok(Some(false)));
        assert!(engine.mine_layout().is_some());
    }

    #[test]
    fn safe_start_places_mines_on_first_reveal() {
        let config = GameConfig::new((4, 4), 15).unwrap();
        for seed in 0..8 {
            let mut engine = Board::new(config, seed, StartTile::SimpleSafe).unwrap();
            assert_eq!(engine.state(), EngineState::Ready);

            let result = engine.reveal((1, 2)).unwrap();

            assert_eq!(result.outcome, RevealOutcome::Won);
            assert_eq!(result.changed, [(1, 2)]);
        }
    }

    #[test]
    fn always_zero_start_opens_region() {
        let mut engine = Board::new(GameConfig::beginner(), 11, StartTile::AlwaysZero).unwrap();

        let result = engine.reveal((4, 4)).unwrap();

        assert_eq!(engine.cell_at((4, 4)).unwrap(), EngineCell::Revealed(0));
        assert!(result.changed.len() >= 9);
    }

    #[test]
    fn random_start_places_mines_at_construction() {
        let config = GameConfig::new((2, 1), 1).unwrap();
        let mut lost = false;
        for seed in 0..16 {
            let mut engine = Board::new(config, seed, StartTile::Random).unwrap();
            lost |= engine.reveal((0, 0)).unwrap().outcome == RevealOutcome::HitMine;
        }
        assert!(lost);
    }

    #[test]
    fn new_rejects_invalid_config() {
        let config = GameConfig::new_unchecked((2, 2), 4);
        assert_eq!(
            Board::new(config, 0, StartTile::SimpleSafe),
            Err(GameError::TooManyMines)
        );
    }

    #[test]
    fn serde_round_trip_preserves_game() {
        let mut engine = Board::new(GameConfig::beginner(), 5, StartTile::AlwaysZero).unwrap();
        engine.reveal((0, 0)).unwrap();
        engine.cycle_flag((8, 8)).ok();

        let json = serde_json::to_string(&engine).unwrap();
        let restored: Board = serde_json::from_str(&json).unwrap();

        assert_eq!(restored, engine);
    }

    #[test]
    fn serde_round_trip_accepts_finished_games() {
        let mut lost = Board::with_layout(layout((3, 1), &[(0, 0), (2, 0)]));
        lost.reveal((0, 0)).unwrap();
        let mut won = Board::with_layout(layout((2, 1), &[(0, 0)]));
        won.reveal((1, 0)).unwrap();

        for engine in [lost, won] {
            let json = serde_json::to_string(&engine).unwrap();
            let restored: Board = serde_json::from_str(&json).unwrap();
            assert_eq!(restored, engine);
        }
    }

    #[test]
    fn load_rejects_grid_of_wrong_shape() {
        use alloc::string::ToString;

        let engine = Board::new(GameConfig::beginner(), 5, StartTile::SimpleSafe).unwrap();
        let small = Board::new(GameConfig::new((2, 2), 1).unwrap(), 5, StartTile::SimpleSafe).unwrap();

        let mut save = serde_json::to_value(&engine).unwrap();
        save["board"] = serde_json::to_value(&small).unwrap()["board"].clone();
        let json = serde_json::to_string(&save).unwrap();

        let err = serde_json::from_str::<Board>(&json).unwrap_err();
        assert!(err.to_string().contains("Board shape does not match declared size"));
    }

    #[test]
    fn load_rejects_layout_that_disagrees_with_config() {
        let mut engine = Board::with_layout(layout((5, 1), &[(2, 0)]));
        engine.reveal((0, 0)).unwrap();

        let mut save = serde_json::to_value(&engine).unwrap();
        save["config"]["mines"] = serde_json::json!(2);

        assert!(serde_json::from_value::<Board>(save).is_err());
    }

    #[test]
    fn load_rejects_counters_that_disagree_with_grid() {
        let mut played = Board::with_layout(layout((5, 1), &[(2, 0)]));
        played.reveal((0, 0)).unwrap();
        assert_eq!(played.revealed_safe_count(), 2);
        let fresh = Board::with_layout(layout((5, 1), &[(2, 0)]));

        let mut save = serde_json::to_value(&fresh).unwrap();
        save["board"] = serde_json::to_value(&played).unwrap()["board"].clone();

        assert!(serde_json::from_value::<Board>(save).is_err());
    }

    #[test]
    fn load_rejects_revealed_cells_without_layout() {
        let mut played = Board::new(GameConfig::beginner(), 5, StartTile::AlwaysZero).unwrap();
        played.reveal((0, 0)).unwrap();
        let fresh = Board::new(GameConfig::beginner(), 5, StartTile::AlwaysZero).unwrap();

        let mut save = serde_json::to_value(&fresh).unwrap();
        save["board"] = serde_json::to_value(&played).unwrap()["board"].clone();

        assert!(serde_json::from_value::<Board>(save).is_err());
    }

    #[test]
    fn debug_output_hides_seed_and_layout_until_finished() {
        use alloc::format;

        let mut engine = Board::new(GameConfig::beginner(), 987_654_321, StartTile::Random).unwrap();
        let running = format!("{engine:?}");
        assert!(!running.contains("987654321"));
        assert!(!running.contains("mine_layout"));
        assert!(!running.contains("mine_mask"));

        let mine = engine.mine_layout.as_ref().unwrap().mine_coords().next().unwrap();
        engine.reveal(mine).unwrap();
        let finished = format!("{engine:?}");
        assert!(finished.contains("987654321"));
        assert!(finished.contains("mine_mask"));
    }

    #[test]
    fn single_corner_mine_on_largest_board_cascades_everywhere() {
        let mut engine = Board::with_layout(layout((255, 255), &[(254, 254)]));

        let result = engine.reveal((0, 0)).unwrap();

        assert_eq!(result.outcome, RevealOutcome::Won);
        assert_eq!(result.changed.len(), 65024);
        assert_eq!(engine.revealed_safe_count(), 65024);
        assert_eq!(engine.cell_at((253, 253)).unwrap(), EngineCell::Revealed(1));
    }
}
