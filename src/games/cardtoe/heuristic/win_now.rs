//! Tier 1: complete a line this turn.

use super::super::board::{Board, CELL_COUNT};
use super::super::rules::{can_place, check_win, simulate};
use super::super::types::{Card, Color};

/// First placement (cells row-major, then deck order) that wins for `acting`.
pub fn find<'a>(board: &Board, own: &'a [Card], acting: Color) -> Option<(usize, &'a Card)> {
    (0..CELL_COUNT).find_map(|index| {
        own.iter()
            .filter(|card| can_place(board, index, card, acting))
            .find(|card| check_win(&simulate(board, index, card)) == Some(acting))
            .map(|card| (index, card))
    })
}
