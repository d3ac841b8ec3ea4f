//! Lock permanence invariant: a locked cell never takes another card.

use super::super::board::Cell;
use super::super::game::GameState;
use super::Invariant;

/// Invariant: no placement landed on a cell that was already locked, and
/// every overwritten cell is in the board's locked set.
pub struct LockPermanenceInvariant;

impl Invariant<GameState> for LockPermanenceInvariant {
    fn holds(game: &GameState) -> bool {
        game.history().iter().all(|record| {
            !record.was_locked
                && (record.previous == Cell::Empty || game.board().is_locked(record.index))
        })
    }

    fn description() -> &'static str {
        "Locked cells are never placed on again"
    }
}
