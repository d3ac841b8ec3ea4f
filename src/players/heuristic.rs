//! Computer player driven by the three-tier heuristic.

use super::Player;
use crate::games::cardtoe::{Move, choose_move};
use crate::session::Session;
use anyhow::Result;
use std::time::Duration;
use tracing::{debug, instrument};

/// Plays whatever [`choose_move`] picks for its color.
pub struct HeuristicPlayer {
    name: String,
    delay: Duration,
}

impl HeuristicPlayer {
    /// Creates a heuristic player that pauses `delay` before each move.
    pub fn new(name: impl Into<String>, delay: Duration) -> Self {
        Self {
            name: name.into(),
            delay,
        }
    }
}

#[async_trait::async_trait]
impl Player for HeuristicPlayer {
    #[instrument(skip_all, fields(ai = %self.name, turn = %session.current_turn()))]
    async fn get_move(&mut self, session: &Session) -> Result<Move> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let turn = session.current_turn();
        let decks = session.decks();
        let choice = choose_move(
            session.board(),
            decks.get(turn).cards(),
            decks.get(turn.opponent()).cards(),
        )
        .ok_or_else(|| anyhow::anyhow!("No legal move for {}", turn))?;

        debug!(
            index = choice.index,
            card_id = %choice.card_id,
            tier = %choice.tier,
            "AI chose move"
        );
        Ok(Move::new(choice.index, choice.card_id))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::cardtoe::Color;
    use crate::session::Mode;

    #[tokio::test]
    async fn test_picks_legal_move_for_color_on_move() {
        let mut session = Session::new(Mode::Local);
        session.start(Color::Red);
        let mut ai = HeuristicPlayer::new("Bot", Duration::ZERO);
        let mov = ai.get_move(&session).await.unwrap();
        assert!(mov.card_id.starts_with("red-"));
        assert!(session.submit_move(mov.index, &mov.card_id).is_ok());
    }
}
