//! Human player typing moves as text lines.

use super::Player;
use crate::games::cardtoe::{CELL_COUNT, Move};
use crate::session::Session;
use anyhow::{Result, bail};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, warn};

/// Line source that several seats can share in pass-and-play.
pub type SharedInput = Arc<Mutex<mpsc::UnboundedReceiver<String>>>;

/// Human player fed by a channel of input lines.
pub struct HumanPlayer {
    name: String,
    input: SharedInput,
}

impl HumanPlayer {
    /// Creates a human player reading from `input_rx`.
    pub fn new(name: impl Into<String>, input_rx: mpsc::UnboundedReceiver<String>) -> Self {
        Self::shared(name, Arc::new(Mutex::new(input_rx)))
    }

    /// Creates a human player reading from an input shared with other seats.
    pub fn shared(name: impl Into<String>, input: SharedInput) -> Self {
        Self {
            name: name.into(),
            input,
        }
    }
}

/// Parses `"<cell> <rank>"` or `"<cell> <card-id>"`.
///
/// A bare rank picks the first unused card of that rank for the color on
/// move.
pub fn parse_move(line: &str, session: &Session) -> Result<Move> {
    let mut parts = line.split_whitespace();
    let (Some(cell), Some(card), None) = (parts.next(), parts.next(), parts.next()) else {
        bail!("Expected '<cell> <rank>' or '<cell> <card-id>'");
    };

    let index: usize = cell.parse()?;
    if index >= CELL_COUNT {
        bail!("Cell must be 0-{}", CELL_COUNT - 1);
    }

    let turn = session.current_turn();
    let card_id = match card.parse::<u8>() {
        Ok(rank) => session
            .decks()
            .get(turn)
            .unused()
            .find(|c| c.rank == rank)
            .map(|c| c.id.clone())
            .ok_or_else(|| anyhow::anyhow!("No unused {} card of rank {}", turn, rank))?,
        Err(_) => card.to_string(),
    };
    Ok(Move::new(index, card_id))
}

#[async_trait::async_trait]
impl Player for HumanPlayer {
    async fn get_move(&mut self, session: &Session) -> Result<Move> {
        let mut input = self.input.lock().await;
        while let Some(line) = input.recv().await {
            match parse_move(&line, session) {
                Ok(mov) => {
                    debug!(player = %self.name, %mov, "Human entered move");
                    return Ok(mov);
                }
                Err(e) => warn!(player = %self.name, error = %e, "Unreadable move"),
            }
        }
        bail!("Input channel closed")
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn is_interactive(&self) -> bool {
        true
    }
}
