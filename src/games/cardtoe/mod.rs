//! Card tic-tac-toe on a 4x4 grid.
//!
//! Players place ranked cards; a stronger card may cover a weaker opponent
//! card once, which locks the cell for good. Four in a row wins.

mod action;
mod board;
mod contracts;
mod game;
mod heuristic;
mod invariants;
mod rules;
mod types;

pub use action::{Move, MoveError, Placement};
pub use board::{Board, CELL_COUNT, Cell, SIDE};
pub use contracts::{
    CardAvailable, CellOnBoard, CellTakeable, CellUnlocked, Contract, LegalMove, MoveContract,
};
pub use game::{GameState, PlacementRecord};
pub use heuristic::{Choice, LEGACY_CELLS, Tier, choose_move};
pub use invariants::{
    CardToeInvariants, Invariant, InvariantSet, InvariantViolation, LockPermanenceInvariant,
    MonotonicOverwriteInvariant, SingleUseInvariant,
};
pub use rules::{
    WIN_LINES, WinLine, apply_move, can_place, check_automatic_draw, check_draw, check_win,
    has_any_legal_move, legal_moves, lines_through, simulate,
};
pub use types::{CardId, Card, Color, DECK_SIZE, Deck, Decks, MAX_RANK, MIN_RANK};
