//! Three-tier greedy move selection.
//!
//! Tiers run in order and the first one that produces a move wins:
//!
//! 1. [`win_now`]: any placement that completes a line right away.
//! 2. [`block`]: a secure placement on a cell where the opponent could win
//!    next turn.
//! 3. [`strategic`]: the highest composite score over every legal placement.
//!
//! Every candidate is evaluated on a board copy via
//! [`simulate`](super::rules::simulate); the real board is never touched.
//! Lookahead is a single ply.

pub mod block;
pub mod strategic;
pub mod win_now;

use super::board::Board;
use super::types::{Card, CardId};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Cells below this index form the legacy 3x3 area used by the block tier
/// and the positional table.
pub const LEGACY_CELLS: usize = 9;

/// Heuristic tier that produced a choice.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
pub enum Tier {
    /// Completes a line this turn.
    #[display("win-now")]
    WinNow,
    /// Blocks an opponent line.
    #[display("secure-block")]
    Block,
    /// Best composite score.
    #[display("strategic")]
    Strategic,
}

/// A selected placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    /// Target cell.
    pub index: usize,
    /// Card to play.
    pub card_id: CardId,
    /// Tier that selected it.
    pub tier: Tier,
}

impl Choice {
    fn new(index: usize, card: &Card, tier: Tier) -> Self {
        Self {
            index,
            card_id: card.id.clone(),
            tier,
        }
    }
}

/// Picks a move for the color owning `own`.
///
/// Used cards in either slice are ignored. Returns `None` when the acting
/// color has no legal placement; the caller then checks for an automatic
/// draw or passes the turn.
#[instrument(skip_all, fields(own = own.len(), opponent = opponent.len()))]
pub fn choose_move(board: &Board, own: &[Card], opponent: &[Card]) -> Option<Choice> {
    let own: Vec<Card> = own.iter().filter(|c| !c.used).cloned().collect();
    let opponent: Vec<Card> = opponent.iter().filter(|c| !c.used).cloned().collect();
    let acting = own.first()?.owner;

    if let Some((index, card)) = win_now::find(board, &own, acting) {
        debug!(index, card_id = %card.id, "Winning placement found");
        return Some(Choice::new(index, card, Tier::WinNow));
    }

    if let Some((index, card)) = block::find(board, &own, &opponent, acting) {
        debug!(index, card_id = %card.id, "Blocking placement chosen");
        return Some(Choice::new(index, card, Tier::Block));
    }

    let choice = strategic::find(board, &own, &opponent, acting)
        .map(|(index, card)| Choice::new(index, card, Tier::Strategic));
    match &choice {
        Some(c) => debug!(index = c.index, card_id = %c.card_id, "Strategic placement chosen"),
        None => debug!(%acting, "No legal placement"),
    }
    choice
}

/// Opponent cards strictly stronger than `rank`.
pub(crate) fn outranking_count(cards: &[Card], rank: u8) -> usize {
    cards.iter().filter(|c| c.outranks(rank)).count()
}

/// Highest rank in `cards`, or 0 when empty.
pub(crate) fn max_rank(cards: &[Card]) -> u8 {
    cards.iter().map(|c| c.rank).max().unwrap_or(0)
}
