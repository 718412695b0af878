use std::fmt::Write as _;

use mineboard_core::{BoardView, CellView, Coord2, Mark, Outcome};

/// Character drawn for a cell; `triggered` marks the mine that ended the game.
fn cell_char(cell: &CellView, triggered: bool) -> char {
    match (cell.revealed, cell.adjacent, cell.mine, cell.mark) {
        _ if triggered => 'X',
        (true, Some(0), _, _) => ' ',
        (true, Some(count), _, _) => char::from_digit(count.into(), 10).unwrap_or('?'),
        (true, None, _, _) => '*',
        (false, _, _, Mark::Warning) => 'F',
        (false, _, _, Mark::Unknown) => '?',
        (false, _, Some(true), Mark::None) => '*',
        (false, _, _, Mark::None) => '.',
    }
}

/// Draws the board with 1-based column and row labels.
pub fn render(view: &BoardView) -> String {
    let mut s = String::new();
    let (width, _) = view.size;

    s.push_str("    ");
    for x in 0..width {
        let _ = write!(s, "{:>2} ", u16::from(x) + 1);
    }
    s.push('\n');
    s.push_str("   ");
    s.push_str(&"-".repeat(usize::from(width) * 3 + 1));
    s.push('\n');

    for (y, row) in view.rows().enumerate() {
        let _ = write!(s, "{:>2} | ", y + 1);
        for (x, cell) in row.iter().enumerate() {
            let coords: Coord2 = (x as u8, y as u8);
            let ch = cell_char(cell, view.triggered_mine == Some(coords));
            let _ = write!(s, "{ch}  ");
        }
        s.push('\n');
    }
    s
}

pub fn status_line(view: &BoardView) -> String {
    match view.outcome {
        Outcome::InProgress => format!("Mines left: {}", view.mines_left),
        Outcome::Won => "Congratulations! You cleared the board!".to_owned(),
        Outcome::Lost => "Boom! You hit a mine. Game over.".to_owned(),
    }
}
