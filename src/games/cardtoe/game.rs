//! Board, decks, turn and placement history of a single game.

use super::action::{Move, MoveError, Placement};
use super::board::{Board, Cell};
use super::contracts::{Contract, MoveContract};
use super::rules::apply_move;
use super::types::{CardId, Color, Decks};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// One accepted placement, kept for invariant checking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementRecord {
    /// Target cell.
    pub index: usize,
    /// Card that was placed.
    pub card_id: CardId,
    /// Color that placed it.
    pub color: Color,
    /// Rank of the placed card.
    pub rank: u8,
    /// The cell before the placement.
    pub previous: Cell,
    /// Whether the cell was already locked before the placement.
    pub was_locked: bool,
}

/// Complete state of one game in progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    pub(crate) board: Board,
    pub(crate) decks: Decks,
    pub(crate) current_turn: Color,
    pub(crate) history: Vec<PlacementRecord>,
}

impl GameState {
    /// Fresh board and decks with `first` on move.
    #[instrument]
    pub fn new(first: Color) -> Self {
        Self {
            board: Board::new(),
            decks: Decks::new(),
            current_turn: first,
            history: Vec::new(),
        }
    }

    /// Rebuilds a state from its parts. History is unknown and left empty.
    pub fn from_parts(board: Board, decks: Decks, current_turn: Color) -> Self {
        Self {
            board,
            decks,
            current_turn,
            history: Vec::new(),
        }
    }

    /// The board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Both decks.
    pub fn decks(&self) -> &Decks {
        &self.decks
    }

    /// Color on move.
    pub fn current_turn(&self) -> Color {
        self.current_turn
    }

    /// Placements accepted since the state was created.
    pub fn history(&self) -> &[PlacementRecord] {
        &self.history
    }

    /// Validates and applies a move for the color on move.
    ///
    /// Does not switch turns; the session decides that after the
    /// terminal checks.
    #[instrument(skip(self), fields(turn = %self.current_turn))]
    pub fn play(&mut self, mov: &Move) -> Result<PlacementRecord, MoveError> {
        MoveContract::pre(self, mov)?;

        #[cfg(debug_assertions)]
        let before = self.clone();

        let was_locked = self.board.is_locked(mov.index);
        let card = self
            .decks
            .find_card_mut(&mov.card_id)
            .ok_or_else(|| MoveError::UnknownCard(mov.card_id.clone()))?;
        let color = card.owner;
        let rank = card.rank;

        let placement = apply_move(&mut self.board, mov.index, card)?;
        let previous = match placement {
            Placement::Placed => Cell::Empty,
            Placement::Overwrote { previous } => previous,
        };

        let record = PlacementRecord {
            index: mov.index,
            card_id: mov.card_id.clone(),
            color,
            rank,
            previous,
            was_locked,
        };
        self.history.push(record.clone());
        debug!(index = mov.index, rank, ?placement, "Move applied");

        #[cfg(debug_assertions)]
        MoveContract::post(&before, self)?;

        Ok(record)
    }

    /// Hands the move to the other color.
    pub(crate) fn switch_turn(&mut self) {
        self.current_turn = self.current_turn.opponent();
    }
}
