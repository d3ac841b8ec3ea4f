//! Game orchestration between two local players.

use crate::games::cardtoe::{Color, Move, has_any_legal_move};
use crate::players::Player;
use crate::session::{MoveOutcome, Outcome, Phase, Scores, Session};
use anyhow::{Result, bail};
use rand::Rng;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

/// Messages sent from the orchestrator to the display.
#[derive(Debug, Clone)]
pub enum GameEvent {
    /// A game began.
    Started {
        /// Color on move first.
        first: Color,
    },
    /// Board text after a change.
    StateChanged(String),
    /// A player is choosing.
    Thinking {
        /// Player name.
        player: String,
        /// Color on move.
        color: Color,
        /// Ranks of the unused cards of that color.
        hand: Vec<u8>,
    },
    /// A move was accepted.
    MoveMade {
        /// Player name.
        player: String,
        /// Color that moved.
        color: Color,
        /// The move.
        mov: Move,
    },
    /// A move was refused and will be asked for again.
    Rejected {
        /// Player name.
        player: String,
        /// Reason shown to the player.
        reason: String,
    },
    /// The color on move had no legal placement.
    Passed {
        /// Color that passed.
        color: Color,
    },
    /// The game ended.
    GameOver {
        /// Result.
        outcome: Outcome,
        /// Scores after the game.
        scores: Scores,
    },
}

/// Runs a local session with one [`Player`] per color.
pub struct Orchestrator {
    session: Session,
    green: Box<dyn Player>,
    red: Box<dyn Player>,
    event_tx: mpsc::UnboundedSender<GameEvent>,
}

impl Orchestrator {
    /// Creates a new orchestrator over `session`.
    pub fn new(
        session: Session,
        green: Box<dyn Player>,
        red: Box<dyn Player>,
        event_tx: mpsc::UnboundedSender<GameEvent>,
    ) -> Self {
        Self {
            session,
            green,
            red,
            event_tx,
        }
    }

    /// The session being played.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Flips a coin, starts a game and plays it to the end.
    #[instrument(skip_all)]
    pub async fn play_game<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<Outcome> {
        match self.session.phase() {
            Phase::Idle => {
                self.session.begin_coin_flip(rng);
            }
            Phase::Ended => {
                self.session.rematch(rng)?;
            }
            Phase::CoinFlip | Phase::Active => {}
        }
        if self.session.phase() == Phase::CoinFlip {
            let first = self.session.proceed()?;
            self.event_tx.send(GameEvent::Started { first })?;
        }
        self.run().await
    }

    /// Plays `games` games back to back and returns the final scores.
    #[instrument(skip(self, rng))]
    pub async fn play_series<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        games: u32,
    ) -> Result<Scores> {
        for game in 1..=games {
            let outcome = self.play_game(rng).await?;
            info!(game, %outcome, "Series game finished");
        }
        Ok(self.session.scores())
    }

    /// Runs the active game loop until the game ends.
    pub async fn run(&mut self) -> Result<Outcome> {
        info!("Starting game orchestration");
        if self.session.phase() != Phase::Active {
            bail!("Session is {}, not active", self.session.phase());
        }
        self.event_tx
            .send(GameEvent::StateChanged(self.session.board().display()))?;

        loop {
            if let Some(outcome) = self.session.outcome() {
                self.event_tx.send(GameEvent::GameOver {
                    outcome,
                    scores: self.session.scores(),
                })?;
                return Ok(outcome);
            }

            let color = self.session.current_turn();
            if !has_any_legal_move(self.session.board(), self.session.decks().get(color)) {
                debug!(%color, "No legal placement, passing");
                let outcome = self.session.pass_turn()?;
                if matches!(outcome, MoveOutcome::Continue { .. }) {
                    self.event_tx.send(GameEvent::Passed { color })?;
                }
                continue;
            }

            let player = match color {
                Color::Green => &mut self.green,
                Color::Red => &mut self.red,
            };
            let name = player.name().to_string();
            let hand = self.session.decks().get(color).unused().map(|c| c.rank).collect();
            self.event_tx.send(GameEvent::Thinking {
                player: name.clone(),
                color,
                hand,
            })?;

            debug!(player = %name, "Waiting for move");
            let mov = player.get_move(&self.session).await?;

            match self.session.submit_move(mov.index, &mov.card_id) {
                Ok(_) => {
                    self.event_tx.send(GameEvent::MoveMade {
                        player: name,
                        color,
                        mov,
                    })?;
                    self.event_tx
                        .send(GameEvent::StateChanged(self.session.board().display()))?;
                }
                Err(e) if player.is_interactive() => {
                    warn!(player = %name, error = %e, "Move rejected");
                    self.event_tx.send(GameEvent::Rejected {
                        player: name,
                        reason: e.to_string(),
                    })?;
                }
                Err(e) => bail!("{} produced an illegal move {}: {}", name, mov, e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::players::HeuristicPlayer;
    use crate::session::Mode;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::time::Duration;

    #[tokio::test]
    async fn test_ai_vs_ai_game_finishes() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut orchestrator = Orchestrator::new(
            Session::new(Mode::Local),
            Box::new(HeuristicPlayer::new("G", Duration::ZERO)),
            Box::new(HeuristicPlayer::new("R", Duration::ZERO)),
            tx,
        );
        let mut rng = StdRng::seed_from_u64(11);
        let outcome = orchestrator.play_game(&mut rng).await.unwrap();
        assert_eq!(orchestrator.session().phase(), Phase::Ended);
        assert_eq!(orchestrator.session().scores().total(), 1);

        let mut saw_game_over = false;
        while let Ok(event) = rx.try_recv() {
            if let GameEvent::GameOver { outcome: o, .. } = event {
                assert_eq!(o, outcome);
                saw_game_over = true;
            }
        }
        assert!(saw_game_over);
    }

    #[tokio::test]
    async fn test_series_counts_every_game() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut orchestrator = Orchestrator::new(
            Session::new(Mode::Local),
            Box::new(HeuristicPlayer::new("G", Duration::ZERO)),
            Box::new(HeuristicPlayer::new("R", Duration::ZERO)),
            tx,
        );
        let scores = orchestrator
            .play_series(&mut StdRng::seed_from_u64(3), 3)
            .await
            .unwrap();
        assert_eq!(scores.total(), 3);
    }

    #[tokio::test]
    async fn test_run_requires_active_session() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut orchestrator = Orchestrator::new(
            Session::new(Mode::Local),
            Box::new(HeuristicPlayer::new("G", Duration::ZERO)),
            Box::new(HeuristicPlayer::new("R", Duration::ZERO)),
            tx,
        );
        assert!(orchestrator.run().await.is_err());
    }
}
