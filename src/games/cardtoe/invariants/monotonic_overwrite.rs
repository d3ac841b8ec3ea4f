//! Monotonic overwrite invariant: covering a card raises rank and flips color.

use super::super::board::Cell;
use super::super::game::GameState;
use super::Invariant;

/// Invariant: every overwrite in the history placed a strictly higher rank
/// of the other color.
pub struct MonotonicOverwriteInvariant;

impl Invariant<GameState> for MonotonicOverwriteInvariant {
    fn holds(game: &GameState) -> bool {
        game.history().iter().all(|record| match record.previous {
            Cell::Empty => true,
            Cell::Occupied { rank, owner } => record.rank > rank && record.color != owner,
        })
    }

    fn description() -> &'static str {
        "Overwrites strictly raise rank and change color"
    }
}
