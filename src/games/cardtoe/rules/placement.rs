//! Placement legality and the single board-mutating primitive.

use super::super::action::{MoveError, Placement};
use super::super::board::{Board, CELL_COUNT, Cell};
use super::super::types::{Card, Color, Deck};
use tracing::{error, instrument, trace};

/// Returns true if `acting` may put `card` on `index`.
///
/// - locked cells never accept a card;
/// - empty cells always do;
/// - an occupied cell accepts only an opponent-owned occupant of lower rank.
///
/// An index outside the board is a caller bug: it is logged and refused.
pub fn can_place(board: &Board, index: usize, card: &Card, acting: Color) -> bool {
    let Some(cell) = board.get(index) else {
        error!(index, "can_place called with out-of-range cell index");
        return false;
    };

    if board.is_locked(index) {
        return false;
    }

    match cell {
        Cell::Empty => true,
        Cell::Occupied { rank, owner } => owner != acting && card.outranks(rank),
    }
}

/// Places `card` on `index`, locking the cell if something was covered.
///
/// Legality is the caller's responsibility; only an out-of-range index is
/// refused. The card is marked used.
#[instrument(skip(board, card), fields(card_id = %card.id, rank = card.rank))]
pub fn apply_move(
    board: &mut Board,
    index: usize,
    card: &mut Card,
) -> Result<Placement, MoveError> {
    let previous = board.get(index).ok_or_else(|| {
        error!(index, "apply_move called with out-of-range cell index");
        MoveError::OutOfBounds(index)
    })?;

    let placement = if previous.is_empty() {
        Placement::Placed
    } else {
        board.lock(index)?;
        Placement::Overwrote { previous }
    };

    board.set(
        index,
        Cell::Occupied {
            rank: card.rank,
            owner: card.owner,
        },
    )?;
    card.used = true;

    trace!(?placement, "Card placed");
    Ok(placement)
}

/// Applies a placement to a copy of `board`, leaving the original untouched.
///
/// Used for lookahead: the card itself is not consumed.
pub fn simulate(board: &Board, index: usize, card: &Card) -> Board {
    let mut copy = board.clone();
    let mut probe = card.clone();
    if apply_move(&mut copy, index, &mut probe).is_err() {
        error!(index, "simulate called with out-of-range cell index");
    }
    copy
}

/// All legal `(index, card)` pairs for the unused cards in `cards`.
///
/// Cells are scanned row-major and cards in deck order, which is the
/// tie-break order the heuristic engine relies on.
pub fn legal_moves<'a>(board: &Board, cards: &'a [Card]) -> Vec<(usize, &'a Card)> {
    let mut moves = Vec::new();
    for index in 0..CELL_COUNT {
        for card in cards {
            if !card.used && can_place(board, index, card, card.owner) {
                moves.push((index, card));
            }
        }
    }
    moves
}

/// Returns true if any unused card of `deck` can be placed anywhere.
#[instrument(skip_all)]
pub fn has_any_legal_move(board: &Board, deck: &Deck) -> bool {
    deck.unused()
        .any(|card| (0..CELL_COUNT).any(|index| can_place(board, index, card, card.owner)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn green(rank: u8) -> Card {
        Card::new(rank, Color::Green, 1)
    }

    fn red(rank: u8) -> Card {
        Card::new(rank, Color::Red, 1)
    }

    #[test]
    fn test_empty_cell_accepts_any_card() {
        let board = Board::new();
        assert!(can_place(&board, 0, &green(1), Color::Green));
        assert!(can_place(&board, 15, &red(5), Color::Red));
    }

    #[test]
    fn test_out_of_range_is_refused() {
        let board = Board::new();
        assert!(!can_place(&board, 16, &green(5), Color::Green));
        let mut board = board;
        let mut card = green(5);
        assert_eq!(
            apply_move(&mut board, 42, &mut card),
            Err(MoveError::OutOfBounds(42))
        );
        assert!(!card.used);
    }

    #[test]
    fn test_cannot_cover_own_card() {
        let mut board = Board::new();
        apply_move(&mut board, 3, &mut green(1)).unwrap();
        assert!(!can_place(&board, 3, &green(5), Color::Green));
    }

    #[test]
    fn test_overwrite_requires_strictly_higher_rank() {
        let mut board = Board::new();
        apply_move(&mut board, 3, &mut green(3)).unwrap();
        assert!(!can_place(&board, 3, &red(3), Color::Red));
        assert!(can_place(&board, 3, &red(4), Color::Red));
    }

    #[test]
    fn test_overwrite_locks_cell() {
        let mut board = Board::new();
        apply_move(&mut board, 3, &mut green(2)).unwrap();
        let placement = apply_move(&mut board, 3, &mut red(4)).unwrap();
        assert_eq!(
            placement,
            Placement::Overwrote {
                previous: Cell::Occupied { rank: 2, owner: Color::Green }
            }
        );
        assert!(board.is_locked(3));
        assert!(!can_place(&board, 3, &green(5), Color::Green));
    }

    #[test]
    fn test_simulate_leaves_original_untouched() {
        let board = Board::new();
        let card = green(2);
        let after = simulate(&board, 7, &card);
        assert!(board.is_empty(7));
        assert_eq!(after.get(7).and_then(Cell::rank), Some(2));
        assert!(!card.used);
    }

    #[test]
    fn test_legal_moves_scan_order() {
        let board = Board::new();
        let deck = Deck::build(Color::Red);
        let moves = legal_moves(&board, deck.cards());
        assert_eq!(moves.len(), CELL_COUNT * deck.unused_count());
        assert_eq!(moves[0].0, 0);
        assert_eq!(moves[0].1.id, "red-1-1");
        assert_eq!(moves[1].1.id, "red-1-2");
    }
}
