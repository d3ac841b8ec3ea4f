//! Single-use invariant: each card is placed at most once.

use super::super::game::GameState;
use super::super::types::DECK_SIZE;
use super::Invariant;
use std::collections::HashSet;

/// Invariant: no card identity repeats in the history, every placed card is
/// marked used, and at most 20 placements happen per game.
pub struct SingleUseInvariant;

impl Invariant<GameState> for SingleUseInvariant {
    fn holds(game: &GameState) -> bool {
        let history = game.history();
        let mut seen = HashSet::new();
        history.len() <= DECK_SIZE * 2
            && history.iter().all(|record| {
                seen.insert(record.card_id.as_str())
                    && game
                        .decks()
                        .find_card(&record.card_id)
                        .is_some_and(|card| card.used)
            })
    }

    fn description() -> &'static str {
        "Each card is placed at most once"
    }
}
