//! Tier 2: secure a cell the opponent could win on next turn.

use super::super::board::{Board, CELL_COUNT};
use super::super::rules::{can_place, check_win, simulate};
use super::super::types::{Card, Color};
use super::{LEGACY_CELLS, max_rank, outranking_count};
use tracing::trace;

/// Bonus for a blocking card no opponent card can overwrite.
const UNBREAKABLE_BONUS: i32 = 100;

/// Empty cells where some opponent card would complete a line.
pub fn threatened_cells(board: &Board, opponent: &[Card], acting: Color) -> Vec<usize> {
    let rival = acting.opponent();
    (0..CELL_COUNT)
        .filter(|&index| board.is_empty(index))
        .filter(|&index| {
            opponent
                .iter()
                .any(|card| check_win(&simulate(board, index, card)) == Some(rival))
        })
        .collect()
}

/// How hard a block with `card` is to undo.
pub fn security(card: &Card, opponent: &[Card]) -> i32 {
    let rank = i32::from(card.rank);
    let base = rank * 15;
    let stronger = outranking_count(opponent, card.rank) as i32;
    if stronger == 0 {
        base + UNBREAKABLE_BONUS
    } else {
        base - stronger * 20 - (i32::from(max_rank(opponent)) - rank) * 10
    }
}

/// Highest-security block inside the legacy cells, committed only when its
/// security is positive.
pub fn find<'a>(
    board: &Board,
    own: &'a [Card],
    opponent: &[Card],
    acting: Color,
) -> Option<(usize, &'a Card)> {
    let threats = threatened_cells(board, opponent, acting);
    if threats.is_empty() {
        return None;
    }

    let mut best: Option<(usize, &Card, i32)> = None;
    for index in (0..LEGACY_CELLS).filter(|i| threats.contains(i)) {
        for card in own.iter().filter(|c| can_place(board, index, c, acting)) {
            let score = security(card, opponent);
            trace!(index, card_id = %card.id, score, "Block candidate");
            if best.is_none_or(|(_, _, top)| score > top) {
                best = Some((index, card, score));
            }
        }
    }

    best.filter(|&(_, _, score)| score > 0)
        .map(|(index, card, _)| (index, card))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::cardtoe::board::Cell;
    use crate::games::cardtoe::types::Deck;

    fn red_at(board: &mut Board, cells: &[usize]) {
        for &i in cells {
            board.set(i, Cell::Occupied { rank: 1, owner: Color::Red }).unwrap();
        }
    }

    #[test]
    fn test_blocks_with_unbreakable_card() {
        let mut board = Board::new();
        red_at(&mut board, &[0, 1, 2]);
        let green = Deck::build(Color::Green);
        let red = Deck::build(Color::Red);
        assert_eq!(threatened_cells(&board, red.cards(), Color::Green), vec![3]);
        let (index, card) = find(&board, green.cards(), red.cards(), Color::Green).unwrap();
        assert_eq!(index, 3);
        assert_eq!(card.id, "green-5-1");
    }

    #[test]
    fn test_threat_outside_legacy_cells_is_ignored() {
        let mut board = Board::new();
        red_at(&mut board, &[12, 13, 14]);
        let green = Deck::build(Color::Green);
        let red = Deck::build(Color::Red);
        assert_eq!(threatened_cells(&board, red.cards(), Color::Green), vec![15]);
        assert!(find(&board, green.cards(), red.cards(), Color::Green).is_none());
    }

    #[test]
    fn test_weak_block_is_not_committed() {
        let mut board = Board::new();
        red_at(&mut board, &[0, 1, 2]);
        let green = [Card::new(1, Color::Green, 1)];
        let red = Deck::build(Color::Red);
        assert!(security(&green[0], red.cards()) < 0);
        assert!(find(&board, &green, red.cards(), Color::Green).is_none());
    }

    #[test]
    fn test_security_formula() {
        let red = Deck::build(Color::Red);
        assert_eq!(security(&Card::new(5, Color::Green, 1), red.cards()), 175);
        // Two fives outrank a four: 60 - 40 - 10
        assert_eq!(security(&Card::new(4, Color::Green, 1), red.cards()), 10);
    }
}
