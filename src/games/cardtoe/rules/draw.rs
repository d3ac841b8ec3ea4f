//! Draw detection for card tic-tac-toe.

use super::super::board::Board;
use super::super::types::Decks;
use super::placement::has_any_legal_move;
use super::win::check_win;
use tracing::{debug, instrument};

/// A full board with no winner.
#[instrument(skip_all)]
pub fn check_draw(board: &Board) -> bool {
    board.is_full() && check_win(board).is_none()
}

/// Neither color can place any remaining card.
///
/// Can trigger before the board is full: locked cells and rank ordering
/// may leave both hands without a productive placement.
#[instrument(skip_all)]
pub fn check_automatic_draw(board: &Board, decks: &Decks) -> bool {
    let green = has_any_legal_move(board, &decks.green);
    let red = has_any_legal_move(board, &decks.red);
    let stuck = !green && !red;
    if stuck {
        debug!(occupied = board.occupied_count(), "Both colors out of legal moves");
    }
    stuck
}

#[cfg(test)]
mod tests {
    use super::super::super::board::Cell;
    use super::super::super::types::Color;
    use super::*;

    #[test]
    fn test_empty_board_not_draw() {
        assert!(!check_draw(&Board::new()));
        assert!(!check_automatic_draw(&Board::new(), &Decks::new()));
    }

    #[test]
    fn test_full_board_without_line_is_draw() {
        // Columns alternate in pairs so no row, column or diagonal is uniform:
        // G G R R / R R G G / G G R R / R R G G
        let mut board = Board::new();
        for i in 0..16 {
            let row = i / 4;
            let col = i % 4;
            let owner = if (row % 2 == 0) == (col < 2) { Color::Green } else { Color::Red };
            board.set(i, Cell::Occupied { rank: 1, owner }).unwrap();
        }
        assert!(check_draw(&board));
    }

    #[test]
    fn test_automatic_draw_with_exhausted_decks() {
        let mut decks = Decks::new();
        for card in decks.green.cards().to_vec() {
            decks.green.find_mut(&card.id).unwrap().used = true;
        }
        for card in decks.red.cards().to_vec() {
            decks.red.find_mut(&card.id).unwrap().used = true;
        }
        let mut board = Board::new();
        board.set(0, Cell::Occupied { rank: 5, owner: Color::Red }).unwrap();
        assert!(check_automatic_draw(&board, &decks));
        assert!(!check_draw(&board));
    }
}
