//! Card tic-tac-toe: rules engine, heuristic AI and room sync.
//!
//! Two colors place ranked cards (1-5, two of each) on a 4x4 grid. A higher
//! card may cover a weaker opponent card once, locking that cell for good.
//! Four in a row, column or diagonal wins.
//!
//! # Architecture
//!
//! - **Games**: board, decks, rules, move contracts, invariants and the
//!   three-tier heuristic
//! - **Session**: the per-game state machine with scores and rematches
//! - **Players**: human and AI seats behind one trait, run by the orchestrator
//! - **Sync**: snapshots, the room store and remote peers
//!
//! # Example
//!
//! ```
//! use cardtoe::{Color, Mode, MoveOutcome, Session};
//!
//! let mut session = Session::new(Mode::Local);
//! session.start(Color::Green);
//! let outcome = session.submit_move(5, "green-3-1").unwrap();
//! assert!(matches!(outcome, MoveOutcome::Continue { next: Color::Red, .. }));
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod config;
mod games;
mod orchestrator;
mod players;
mod session;
mod sync;

// Crate-level exports - Configuration
pub use config::{ConfigError, GameConfig, MAX_NAME_CHARS, clean_name};

// Crate-level exports - Game types
pub use games::cardtoe::{
    Board, CELL_COUNT, Card, CardAvailable, CardId, CardToeInvariants, Cell, CellOnBoard,
    CellTakeable, CellUnlocked, Choice, Color, Contract, DECK_SIZE, Deck, Decks, GameState,
    Invariant, InvariantSet, InvariantViolation, LEGACY_CELLS, LegalMove,
    LockPermanenceInvariant, MAX_RANK, MIN_RANK, MonotonicOverwriteInvariant, Move,
    MoveContract, MoveError, Placement, PlacementRecord, SIDE, SingleUseInvariant, Tier,
    WIN_LINES, WinLine, apply_move, can_place, check_automatic_draw, check_draw, check_win,
    choose_move, has_any_legal_move, legal_moves, lines_through, simulate,
};

// Crate-level exports - Session
pub use session::{
    CellView, Emotes, Hands, Mode, MoveOutcome, Outcome, Phase, Readiness, RematchOutcome,
    Scores, Session, SessionError, SessionView, rematch_starter,
};

// Crate-level exports - Players and orchestration
pub use orchestrator::{GameEvent, Orchestrator};
pub use players::{HeuristicPlayer, HumanPlayer, Player, SharedInput, parse_move};

// Crate-level exports - Remote sync
pub use sync::{
    Blank, ColorSlot, DEFAULT_ROOM_ID_ATTEMPTS, MemoryRoomStore, ROOM_ID_MAX, ROOM_ID_MIN,
    RankSlot, RemotePeer, RoomEvent, RoomRecord, RoomStatus, RoomStore, RoomSubscription,
    RoomUpdate, Seat, Snapshot, SnapshotError, StoreError, SyncError, allocate_room_id,
    random_room_id, session_from_payload,
};
