//! Win detection for card tic-tac-toe.

use super::super::board::{Board, Cell};
use super::super::types::Color;

/// Four cell indices that win when uniformly colored.
pub type WinLine = [usize; 4];

/// Every winning line, in evaluation order: rows, columns, diagonals.
pub const WIN_LINES: [WinLine; 10] = [
    // Rows
    [0, 1, 2, 3],
    [4, 5, 6, 7],
    [8, 9, 10, 11],
    [12, 13, 14, 15],
    // Columns
    [0, 4, 8, 12],
    [1, 5, 9, 13],
    [2, 6, 10, 14],
    [3, 7, 11, 15],
    // Diagonals
    [0, 5, 10, 15],
    [3, 6, 9, 12],
];

/// Lines containing `index`, in evaluation order.
pub fn lines_through(index: usize) -> impl Iterator<Item = &'static WinLine> {
    WIN_LINES.iter().filter(move |line| line.contains(&index))
}

/// Returns the color holding all four cells of some line.
///
/// The first matching line wins; only one color can hold a complete line
/// because a winning placement ends the game.
pub fn check_win(board: &Board) -> Option<Color> {
    WIN_LINES.iter().find_map(|line| line_owner(board, line))
}

/// Returns the color holding every cell of `line`, if any.
fn line_owner(board: &Board, line: &WinLine) -> Option<Color> {
    let first = board.get(line[0]).and_then(Cell::owner)?;
    line[1..]
        .iter()
        .all(|&i| board.get(i).and_then(Cell::owner) == Some(first))
        .then_some(first)
}
