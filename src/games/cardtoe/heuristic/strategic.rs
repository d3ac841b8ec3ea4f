//! Tier 3: composite positional score.
//!
//! Each legal placement is scored as the sum of six terms; see [`score`].
//! The maximum wins and ties keep the earliest candidate in scan order.

use super::super::board::{Board, CELL_COUNT, Cell};
use super::super::rules::{can_place, check_win, lines_through, simulate};
use super::super::types::{Card, Color};
use super::{LEGACY_CELLS, max_rank, outranking_count};
use tracing::trace;

/// Center of the legacy 3x3 area.
const LEGACY_CENTER: usize = 4;

/// Ranks at or above this count as high cards for conservation.
const HIGH_RANK: u8 = 4;

/// Positional value from the legacy 3x3 table; cells past it score 0.
pub fn position_value(index: usize) -> i32 {
    match index {
        LEGACY_CENTER => 5,
        0 | 2 | 6 | 8 => 3,
        i if i < LEGACY_CELLS => 1,
        _ => 0,
    }
}

/// Best-scoring legal placement.
pub fn find<'a>(
    board: &Board,
    own: &'a [Card],
    opponent: &[Card],
    acting: Color,
) -> Option<(usize, &'a Card)> {
    let mut best: Option<(usize, &Card, f64)> = None;
    for index in 0..CELL_COUNT {
        for card in own.iter().filter(|c| can_place(board, index, c, acting)) {
            let value = score(board, index, card, own, opponent);
            trace!(index, card_id = %card.id, value, "Strategic candidate");
            if best.is_none_or(|(_, _, top)| value > top) {
                best = Some((index, card, value));
            }
        }
    }
    best.map(|(index, card, _)| (index, card))
}

/// Composite score for playing `card` at `index`.
pub fn score(board: &Board, index: usize, card: &Card, own: &[Card], opponent: &[Card]) -> f64 {
    let after = simulate(board, index, card);
    f64::from(position_value(index))
        + f64::from(conservation(card, own))
        + f64::from(defensive(board, index, card, own, opponent))
        + f64::from(baiting(&after, card, own, opponent))
        + f64::from(permanence(card, opponent))
        + threat_creation(&after, index, card, opponent)
}

/// Discourages spending high cards while many remain.
pub fn conservation(card: &Card, own: &[Card]) -> i32 {
    if card.rank < HIGH_RANK {
        return 0;
    }
    let high = own.iter().filter(|c| c.rank >= HIGH_RANK).count();
    if high >= 3 { -20 } else { 10 }
}

/// Value of denying the opponent a threat at `index`.
pub fn defensive(board: &Board, index: usize, card: &Card, own: &[Card], opponent: &[Card]) -> i32 {
    let rival = card.owner.opponent();
    let unbreakable = outranking_count(opponent, card.rank) == 0;
    opponent
        .iter()
        .filter(|o| can_place(board, index, o, rival))
        .filter(|o| creates_threat(&simulate(board, index, o), index, rival))
        .map(|o| {
            let priority = threat_priority(index, o, own);
            if unbreakable { priority * 3 } else { priority * 2 }
        })
        .sum()
}

fn threat_priority(index: usize, opponent_card: &Card, own: &[Card]) -> i32 {
    let mut priority = i32::from(opponent_card.rank) * 5;
    if !own.iter().any(|c| c.outranks(opponent_card.rank)) {
        priority += 20;
    }
    if index == LEGACY_CENTER {
        priority += 10;
    }
    priority
}

/// A win for `color`, or a line through `index` with three of its cells and
/// an empty fourth.
fn creates_threat(board: &Board, index: usize, color: Color) -> bool {
    if check_win(board) == Some(color) {
        return true;
    }
    lines_through(index).any(|line| {
        let held = line
            .iter()
            .filter(|&&i| board.get(i).and_then(Cell::owner) == Some(color))
            .count();
        let empty = line.iter().filter(|&&i| board.is_empty(i)).count();
        held == 3 && empty == 1
    })
}

/// Reward for keeping a card that can punish the opponent's likely reply.
pub fn baiting(after: &Board, card: &Card, own: &[Card], opponent: &[Card]) -> i32 {
    let rival = card.owner.opponent();
    let reserve: Vec<&Card> = own.iter().filter(|c| c.id != card.id).collect();

    (0..CELL_COUNT)
        .filter(|&e| after.is_empty(e))
        .filter_map(|e| {
            let mut best: Option<(&Card, i32)> = None;
            for o in opponent {
                let probe = simulate(after, e, o);
                let value = position_value(e)
                    + i32::from(o.rank) * 2
                    + threat_level(&probe, e, rival) * 5;
                if best.is_none_or(|(_, top)| value > top) {
                    best = Some((o, value));
                }
            }
            best
        })
        .filter(|&(o, value)| value > 10 && reserve.iter().any(|c| c.outranks(o.rank)))
        .map(|(o, _)| i32::from(o.rank) * 2)
        .sum()
}

/// Lines through `index` where `color` holds three or more cells and its
/// opponent none.
fn threat_level(board: &Board, index: usize, color: Color) -> i32 {
    let (held, blocked) = (Some(color), Some(color.opponent()));
    lines_through(index)
        .filter(|line| {
            let owners: Vec<_> = line.iter().map(|&i| board.get(i).and_then(Cell::owner)).collect();
            owners.iter().filter(|&&o| o == held).count() >= 3
                && !owners.iter().any(|&o| o == blocked)
        })
        .count() as i32
}

/// Reward for placements the opponent can never overwrite.
pub fn permanence(card: &Card, opponent: &[Card]) -> i32 {
    let stronger = outranking_count(opponent, card.rank) as i32;
    let top = i32::from(max_rank(opponent));
    let rank = i32::from(card.rank);
    if stronger == 0 {
        if rank > top { 70 } else { 50 }
    } else {
        -(stronger * 15 + (top - rank) * 8)
    }
}

/// Weighted count of lines through `index` that the placement advances.
pub fn threat_creation(after: &Board, index: usize, card: &Card, opponent: &[Card]) -> f64 {
    let factor = if outranking_count(opponent, card.rank) > 0 { 0.1 } else { 3.0 };
    let (own, rival) = (Some(card.owner), Some(card.owner.opponent()));
    let total: f64 = lines_through(index)
        .map(|line| {
            let owners: Vec<_> = line.iter().map(|&i| after.get(i).and_then(Cell::owner)).collect();
            if owners.iter().any(|&o| o == rival) {
                return 0.0;
            }
            match owners.iter().filter(|&&o| o == own).count() {
                3 => 3.0 * factor,
                2 => factor,
                _ => 0.0,
            }
        })
        .sum();
    total * 3.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::cardtoe::types::Deck;

    fn occupy(board: &mut Board, cells: &[usize], rank: u8, owner: Color) {
        for &i in cells {
            board.set(i, Cell::Occupied { rank, owner }).unwrap();
        }
    }

    #[test]
    fn test_position_table() {
        assert_eq!(position_value(4), 5);
        assert_eq!(position_value(8), 3);
        assert_eq!(position_value(7), 1);
        assert_eq!(position_value(9), 0);
        assert_eq!(position_value(15), 0);
    }

    #[test]
    fn test_conservation() {
        let green = Deck::build(Color::Green);
        let five = Card::new(5, Color::Green, 1);
        assert_eq!(conservation(&five, green.cards()), -20);
        assert_eq!(conservation(&Card::new(2, Color::Green, 1), green.cards()), 0);
        let scarce = [five.clone(), Card::new(1, Color::Green, 1)];
        assert_eq!(conservation(&five, &scarce), 10);
    }

    #[test]
    fn test_permanence() {
        let red = Deck::build(Color::Red);
        assert_eq!(permanence(&Card::new(5, Color::Green, 1), red.cards()), 50);
        assert_eq!(permanence(&Card::new(5, Color::Green, 1), &[Card::new(4, Color::Red, 1)]), 70);
        // Two fives outrank a four: -(30 + 8)
        assert_eq!(permanence(&Card::new(4, Color::Green, 1), red.cards()), -38);
    }

    #[test]
    fn test_threat_creation_discounted_when_outrankable() {
        let mut board = Board::new();
        occupy(&mut board, &[0, 1], 1, Color::Green);
        let red = Deck::build(Color::Red);
        let three = Card::new(3, Color::Green, 1);
        let after = simulate(&board, 2, &three);
        // Row 0 holds three green, column 2 only one.
        let expected = 3.0 * 0.1 * 3.0;
        assert!((threat_creation(&after, 2, &three, red.cards()) - expected).abs() < 1e-9);

        let five = Card::new(5, Color::Green, 1);
        let after = simulate(&board, 2, &five);
        assert!((threat_creation(&after, 2, &five, red.cards()) - 27.0).abs() < 1e-9);
    }

    #[test]
    fn test_defensive_counts_opponent_threats() {
        let mut board = Board::new();
        occupy(&mut board, &[12, 13], 1, Color::Red);
        let green = Deck::build(Color::Green);
        let red = [Card::new(2, Color::Red, 1)];
        let five = Card::new(5, Color::Green, 1);
        // Red at 14 would hold three of the bottom row with 15 empty.
        // priority = 10, no +20 (green outranks), no center bonus; unbreakable.
        assert_eq!(defensive(&board, 14, &five, green.cards(), &red), 30);
        assert_eq!(defensive(&board, 0, &five, green.cards(), &red), 0);
    }

    #[test]
    fn test_baiting_rewards_reserve_that_outranks() {
        let board = Board::new();
        let own = [Card::new(1, Color::Green, 1), Card::new(5, Color::Green, 1)];
        let red = [Card::new(4, Color::Red, 1)];
        let after = simulate(&board, 15, &own[0]);
        // Opponent value on 0..8 is position + 8, above 10 only on center
        // and corners (0, 2, 4, 6, 8). Each adds 4 * 2.
        assert_eq!(baiting(&after, &own[0], &own, &red), 40);
        // Playing the five leaves nothing that outranks a four.
        let after = simulate(&board, 15, &own[1]);
        assert_eq!(baiting(&after, &own[1], &own, &red), 0);
    }
}
