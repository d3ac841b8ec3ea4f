//! First-class move types for card tic-tac-toe.
//!
//! Moves are domain events, not side effects. They carry the player's
//! intent and are validated before the board is touched.

use super::board::Cell;
use super::types::{CardId, Color};
use serde::{Deserialize, Serialize};

/// A request to place a card on a cell.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, derive_new::new)]
pub struct Move {
    /// Target cell, row-major 0..16.
    pub index: usize,
    /// Identity of the card to place.
    pub card_id: CardId,
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> cell {}", self.card_id, self.index)
    }
}

/// What a successful placement did to the target cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Placement {
    /// The cell was empty.
    Placed,
    /// An opponent card was covered; the cell is now locked.
    Overwrote {
        /// The cell as it was before the overwrite.
        previous: Cell,
    },
}

/// Reasons a move is refused.
///
/// Rejections are routine (speculative input, AI probing) and never
/// change any state.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum MoveError {
    /// The session is not accepting moves.
    #[display("Game is not active")]
    GameNotActive,

    /// Remote play: the current turn belongs to the other peer.
    #[display("It's not {}'s turn", _0)]
    NotYourTurn(Color),

    /// The card belongs to the side not on move.
    #[display("Card belongs to {} but {} is on move", card, turn)]
    WrongColor {
        /// Owner of the offered card.
        card: Color,
        /// Side whose turn it is.
        turn: Color,
    },

    /// No card with this identity exists.
    #[display("Unknown card {}", _0)]
    UnknownCard(CardId),

    /// The card has already been placed.
    #[display("Card {} has already been played", _0)]
    CardAlreadyUsed(CardId),

    /// The index is outside the board.
    #[display("Cell {} is out of bounds (must be 0-15)", _0)]
    OutOfBounds(usize),

    /// The cell has been overwritten before.
    #[display("Cell {} is locked", _0)]
    CellLocked(usize),

    /// A player cannot cover their own card.
    #[display("Cell {} already holds your card", _0)]
    OwnCell(usize),

    /// The card does not outrank the occupant.
    #[display("Rank {} cannot overwrite rank {}", rank, occupant)]
    RankTooLow {
        /// Rank of the offered card.
        rank: u8,
        /// Rank already on the cell.
        occupant: u8,
    },

    /// `pass_turn` while the side on move can still play.
    #[display("{} still has a legal move", _0)]
    MovesAvailable(Color),

    /// An invariant was violated (postcondition failure).
    #[display("Invariant violation: {}", _0)]
    InvariantViolation(String),
}

impl std::error::Error for MoveError {}
