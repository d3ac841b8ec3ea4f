//! Game rules for card tic-tac-toe.
//!
//! Pure functions over a [`Board`](super::Board) and the decks. They are the
//! sole authority on placement legality and terminal states; the session and
//! the heuristic engine both route through them.

pub mod draw;
pub mod placement;
pub mod win;

pub use draw::{check_automatic_draw, check_draw};
pub use placement::{apply_move, can_place, has_any_legal_move, legal_moves, simulate};
pub use win::{WIN_LINES, WinLine, check_win, lines_through};
