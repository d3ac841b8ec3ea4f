//! Contract-based validation for card tic-tac-toe.
//!
//! Each precondition checks one rule and maps its failure to one
//! [`MoveError`] variant; [`LegalMove`] composes them in the order a player
//! would notice the problem.

use super::action::{Move, MoveError};
use super::board::{CELL_COUNT, Cell};
use super::game::GameState;
use super::invariants::{CardToeInvariants, InvariantSet};
use super::types::Card;
use tracing::instrument;

// ─────────────────────────────────────────────────────────────
//  Contract Trait
// ─────────────────────────────────────────────────────────────

/// Preconditions and postconditions of a state transition.
pub trait Contract<S, A> {
    /// Checks preconditions before applying the action.
    fn pre(state: &S, action: &A) -> Result<(), MoveError>;

    /// Checks postconditions after applying the action.
    fn post(before: &S, after: &S) -> Result<(), MoveError>;
}

// ─────────────────────────────────────────────────────────────
//  Move Preconditions
// ─────────────────────────────────────────────────────────────

/// Precondition: the card exists, belongs to the side on move and is unused.
pub struct CardAvailable;

impl CardAvailable {
    /// Returns the card when it may be played.
    #[instrument(skip(game))]
    pub fn check<'a>(mov: &Move, game: &'a GameState) -> Result<&'a Card, MoveError> {
        let card = game
            .decks()
            .find_card(&mov.card_id)
            .ok_or_else(|| MoveError::UnknownCard(mov.card_id.clone()))?;
        if card.owner != game.current_turn() {
            return Err(MoveError::WrongColor {
                card: card.owner,
                turn: game.current_turn(),
            });
        }
        if card.used {
            return Err(MoveError::CardAlreadyUsed(card.id.clone()));
        }
        Ok(card)
    }
}

/// Precondition: the index names a cell on the board.
pub struct CellOnBoard;

impl CellOnBoard {
    /// Rejects indices outside 0..16.
    pub fn check(mov: &Move) -> Result<(), MoveError> {
        if mov.index < CELL_COUNT {
            Ok(())
        } else {
            Err(MoveError::OutOfBounds(mov.index))
        }
    }
}

/// Precondition: the cell has never been overwritten.
pub struct CellUnlocked;

impl CellUnlocked {
    /// Rejects locked cells regardless of rank.
    pub fn check(mov: &Move, game: &GameState) -> Result<(), MoveError> {
        if game.board().is_locked(mov.index) {
            Err(MoveError::CellLocked(mov.index))
        } else {
            Ok(())
        }
    }
}

/// Precondition: the cell is empty or holds a weaker opponent card.
pub struct CellTakeable;

impl CellTakeable {
    /// Compares the offered card with the occupant.
    pub fn check(mov: &Move, card: &Card, game: &GameState) -> Result<(), MoveError> {
        match game.board().get(mov.index) {
            None => Err(MoveError::OutOfBounds(mov.index)),
            Some(Cell::Empty) => Ok(()),
            Some(Cell::Occupied { owner, .. }) if owner == card.owner => {
                Err(MoveError::OwnCell(mov.index))
            }
            Some(Cell::Occupied { rank, .. }) if !card.outranks(rank) => Err(MoveError::RankTooLow {
                rank: card.rank,
                occupant: rank,
            }),
            Some(Cell::Occupied { .. }) => Ok(()),
        }
    }
}

/// Composite precondition: everything [`can_place`](super::rules::can_place)
/// checks, plus card availability, with a specific reason on failure.
pub struct LegalMove;

impl LegalMove {
    /// Validates all preconditions for a move.
    #[instrument(skip(game))]
    pub fn check(mov: &Move, game: &GameState) -> Result<(), MoveError> {
        let card = CardAvailable::check(mov, game)?;
        CellOnBoard::check(mov)?;
        CellUnlocked::check(mov, game)?;
        CellTakeable::check(mov, card, game)?;
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────
//  Move Contract (Pre + Post)
// ─────────────────────────────────────────────────────────────

/// Contract for move actions.
///
/// Preconditions: [`LegalMove`].
///
/// Postconditions:
/// - overwrites only raise rank and change color
/// - locked cells are never placed on again
/// - each card is placed at most once
pub struct MoveContract;

impl Contract<GameState, Move> for MoveContract {
    fn pre(game: &GameState, action: &Move) -> Result<(), MoveError> {
        LegalMove::check(action, game)
    }

    fn post(_before: &GameState, after: &GameState) -> Result<(), MoveError> {
        CardToeInvariants::check_all(after).map_err(|violations| {
            let descriptions = violations
                .iter()
                .map(|v| v.description.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            MoveError::InvariantViolation(format!("Postcondition failed: {}", descriptions))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::cardtoe::Color;

    fn mv(index: usize, id: &str) -> Move {
        Move::new(index, id.to_string())
    }

    #[test]
    fn test_precondition_empty_cell() {
        let game = GameState::new(Color::Green);
        assert!(MoveContract::pre(&game, &mv(5, "green-3-1")).is_ok());
    }

    #[test]
    fn test_precondition_wrong_color() {
        let game = GameState::new(Color::Green);
        assert!(matches!(
            MoveContract::pre(&game, &mv(5, "red-3-1")),
            Err(MoveError::WrongColor { .. })
        ));
    }

    #[test]
    fn test_precondition_unknown_card() {
        let game = GameState::new(Color::Green);
        assert_eq!(
            MoveContract::pre(&game, &mv(5, "green-9-1")),
            Err(MoveError::UnknownCard("green-9-1".to_string()))
        );
    }

    #[test]
    fn test_precondition_used_card() {
        let mut game = GameState::new(Color::Green);
        game.play(&mv(0, "green-1-1")).unwrap();
        assert!(matches!(
            MoveContract::pre(&game, &mv(1, "green-1-1")),
            Err(MoveError::CardAlreadyUsed(_))
        ));
    }

    #[test]
    fn test_precondition_own_cell_and_rank() {
        let mut game = GameState::new(Color::Green);
        game.play(&mv(0, "green-3-1")).unwrap();
        assert_eq!(
            MoveContract::pre(&game, &mv(0, "green-5-1")),
            Err(MoveError::OwnCell(0))
        );
        game.switch_turn();
        assert_eq!(
            MoveContract::pre(&game, &mv(0, "red-3-1")),
            Err(MoveError::RankTooLow { rank: 3, occupant: 3 })
        );
        assert!(MoveContract::pre(&game, &mv(0, "red-4-1")).is_ok());
    }

    #[test]
    fn test_postcondition_detects_corruption() {
        let mut game = GameState::new(Color::Green);
        let before = game.clone();
        game.play(&mv(0, "green-2-1")).unwrap();
        // Replay a record of the same card twice
        let dup = game.history[0].clone();
        game.history.push(dup);
        assert!(MoveContract::post(&before, &game).is_err());
    }
}
