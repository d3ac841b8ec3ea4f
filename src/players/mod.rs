//! Player trait and implementations.

mod heuristic;
mod human;

pub use heuristic::HeuristicPlayer;
pub use human::{HumanPlayer, SharedInput, parse_move};

use crate::games::cardtoe::Move;
use crate::session::Session;
use anyhow::Result;

/// Something that can pick a move for the color on move.
#[async_trait::async_trait]
pub trait Player: Send {
    /// Chooses a placement for `session.current_turn()`.
    ///
    /// Only called when that color has at least one legal placement.
    async fn get_move(&mut self, session: &Session) -> Result<Move>;

    /// Display name.
    fn name(&self) -> &str;

    /// Whether a rejected move should be retried rather than treated as a bug.
    fn is_interactive(&self) -> bool {
        false
    }
}
