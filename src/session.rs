//! Game session state machine.
//!
//! A [`Session`] owns one game in progress plus everything that outlives a
//! single game: scores, play mode, rematch readiness and emotes.
//!
//! ```text
//! Idle -> CoinFlip -> Active -> Ended -> (rematch) -> Active | CoinFlip
//! ```
//!
//! Every move goes through [`Session::submit_move`]. Rules and the heuristic
//! are pure functions over the session's board and decks.

use crate::games::cardtoe::{
    Board, CELL_COUNT, Card, Cell, Color, Decks, GameState, Move, MoveError, Placement,
    check_automatic_draw, check_draw, check_win, has_any_legal_move,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// Lifecycle phase of a session.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
pub enum Phase {
    /// No game started yet.
    #[display("idle")]
    Idle,
    /// Starting color drawn, waiting to begin.
    #[display("coin flip")]
    CoinFlip,
    /// Moves are accepted.
    #[display("active")]
    Active,
    /// Terminal condition reached.
    #[display("ended")]
    Ended,
}

/// Who drives which color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    /// Both colors on this device.
    Local,
    /// One color here, the other on a remote peer.
    Remote {
        /// Color this peer plays.
        local_color: Color,
    },
}

/// Result of a finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Outcome {
    /// One color completed a line.
    Win {
        /// Winning color.
        winner: Color,
    },
    /// Full board without a line, or neither color able to move.
    Draw {
        /// True when ended because neither color had a legal move.
        #[serde(default)]
        automatic: bool,
    },
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Win { winner } => write!(f, "{} wins", winner),
            Outcome::Draw { automatic: true } => write!(f, "draw (no moves left)"),
            Outcome::Draw { automatic: false } => write!(f, "draw"),
        }
    }
}

/// Games won by each color, plus draws.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scores {
    /// Green wins.
    pub green: u32,
    /// Red wins.
    pub red: u32,
    /// Draws of either kind.
    pub draws: u32,
}

impl Scores {
    /// Completed games.
    pub fn total(&self) -> u32 {
        self.green + self.red + self.draws
    }

    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Win { winner: Color::Green } => self.green += 1,
            Outcome::Win { winner: Color::Red } => self.red += 1,
            Outcome::Draw { .. } => self.draws += 1,
        }
    }
}

/// Remote rematch handshake.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Readiness {
    /// Nobody asked for a rematch.
    #[default]
    NeitherReady,
    /// One color asked and waits for the other.
    OneReady(Color),
    /// Both asked; the next game can start.
    BothReady,
}

impl Readiness {
    /// Builds the state from per-color flags.
    pub fn from_flags(green: bool, red: bool) -> Self {
        match (green, red) {
            (false, false) => Readiness::NeitherReady,
            (true, false) => Readiness::OneReady(Color::Green),
            (false, true) => Readiness::OneReady(Color::Red),
            (true, true) => Readiness::BothReady,
        }
    }

    /// Records that `color` is ready.
    pub fn mark(self, color: Color) -> Self {
        match self {
            Readiness::NeitherReady => Readiness::OneReady(color),
            Readiness::OneReady(c) if c == color => self,
            Readiness::OneReady(_) | Readiness::BothReady => Readiness::BothReady,
        }
    }

    /// Whether `color` has signaled.
    pub fn is_ready(self, color: Color) -> bool {
        match self {
            Readiness::NeitherReady => false,
            Readiness::OneReady(c) => c == color,
            Readiness::BothReady => true,
        }
    }
}

/// Last emote sent by each color.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Emotes {
    /// Green's emote.
    pub green: Option<String>,
    /// Red's emote.
    pub red: Option<String>,
}

impl Emotes {
    /// Emote for `color`.
    pub fn get(&self, color: Color) -> Option<&str> {
        match color {
            Color::Green => self.green.as_deref(),
            Color::Red => self.red.as_deref(),
        }
    }

    fn set(&mut self, color: Color, text: String) {
        match color {
            Color::Green => self.green = Some(text),
            Color::Red => self.red = Some(text),
        }
    }
}

/// What an accepted move or pass led to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The game goes on with `next` on move.
    Continue {
        /// Color now on move.
        next: Color,
        /// How the card landed; `None` for a pass.
        placement: Option<Placement>,
    },
    /// The game is over.
    Ended(Outcome),
}

/// What a rematch request led to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RematchOutcome {
    /// Local game: a new coin was flipped.
    CoinFlip(Color),
    /// Remote game: waiting for the other color.
    Waiting,
    /// Remote game: both ready, the game started with this color.
    Started(Color),
}

/// Session operations rejected because of phase or mode.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum SessionError {
    /// The operation needs another phase.
    #[display("Expected phase {}, session is {}", expected, actual)]
    WrongPhase {
        /// Phase the operation needs.
        expected: Phase,
        /// Phase the session is in.
        actual: Phase,
    },
    /// The operation only makes sense against a remote peer.
    #[display("Operation requires a remote session")]
    NotRemote,
}

/// Render-ready cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellView {
    /// Nothing placed.
    Empty,
    /// A card lies here.
    Occupied {
        /// Card rank.
        rank: u8,
        /// Card color.
        owner: Color,
        /// Cell has been overwritten and is frozen.
        locked: bool,
    },
}

/// Unused cards per color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hands {
    /// Green's unused cards in deck order.
    pub green: Vec<Card>,
    /// Red's unused cards in deck order.
    pub red: Vec<Card>,
}

/// Everything a presentation layer needs to draw the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionView {
    /// Cells in row-major order.
    pub cells: [CellView; CELL_COUNT],
    /// Color on move.
    pub turn: Color,
    /// Unused cards.
    pub unused: Hands,
    /// Result, once ended.
    pub outcome: Option<Outcome>,
    /// Lifecycle phase.
    pub phase: Phase,
    /// Running scores.
    pub scores: Scores,
}

/// One player-facing game session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    game: GameState,
    phase: Phase,
    outcome: Option<Outcome>,
    scores: Scores,
    mode: Mode,
    remote_name: Option<String>,
    readiness: Readiness,
    emotes: Emotes,
    coin: Option<Color>,
}

impl Session {
    /// Idle session with a fresh board.
    #[instrument]
    pub fn new(mode: Mode) -> Self {
        info!(?mode, "Creating session");
        Self {
            game: GameState::new(Color::Green),
            phase: Phase::Idle,
            outcome: None,
            scores: Scores::default(),
            mode,
            remote_name: None,
            readiness: Readiness::NeitherReady,
            emotes: Emotes::default(),
            coin: None,
        }
    }

    /// Session rebuilt from a remote snapshot.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        game: GameState,
        phase: Phase,
        outcome: Option<Outcome>,
        scores: Scores,
        mode: Mode,
        remote_name: Option<String>,
        readiness: Readiness,
        emotes: Emotes,
    ) -> Self {
        Self {
            game,
            phase,
            outcome,
            scores,
            mode,
            remote_name,
            readiness,
            emotes,
            coin: None,
        }
    }

    /// Current game.
    pub fn game(&self) -> &GameState {
        &self.game
    }

    /// Board of the current game.
    pub fn board(&self) -> &Board {
        self.game.board()
    }

    /// Decks of the current game.
    pub fn decks(&self) -> &Decks {
        self.game.decks()
    }

    /// Color on move.
    pub fn current_turn(&self) -> Color {
        self.game.current_turn()
    }

    /// Lifecycle phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Result of the last finished game, while ended.
    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// Running scores.
    pub fn scores(&self) -> Scores {
        self.scores
    }

    /// Play mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Color this device plays in remote mode.
    pub fn local_color(&self) -> Option<Color> {
        match self.mode {
            Mode::Local => None,
            Mode::Remote { local_color } => Some(local_color),
        }
    }

    /// Display name of the remote peer.
    pub fn remote_name(&self) -> Option<&str> {
        self.remote_name.as_deref()
    }

    /// Sets the display name of the remote peer.
    pub fn set_remote_name(&mut self, name: impl Into<String>) {
        self.remote_name = Some(name.into());
    }

    /// Rematch handshake state.
    pub fn readiness(&self) -> Readiness {
        self.readiness
    }

    /// Last emotes.
    pub fn emotes(&self) -> &Emotes {
        &self.emotes
    }

    /// Pending coin-flip result.
    pub fn coin(&self) -> Option<Color> {
        self.coin
    }

    /// Draws the starting color 50/50 and enters [`Phase::CoinFlip`].
    ///
    /// The result is stored, not applied; [`Session::proceed`] applies it.
    #[instrument(skip(self, rng))]
    pub fn begin_coin_flip<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Color {
        let first = if rng.gen_bool(0.5) { Color::Green } else { Color::Red };
        self.coin = Some(first);
        self.phase = Phase::CoinFlip;
        info!(%first, "Coin flipped");
        first
    }

    /// Starts the game with the coin-flip winner.
    #[instrument(skip(self))]
    pub fn proceed(&mut self) -> Result<Color, SessionError> {
        match (self.phase, self.coin) {
            (Phase::CoinFlip, Some(first)) => {
                self.start(first);
                Ok(first)
            }
            _ => Err(SessionError::WrongPhase {
                expected: Phase::CoinFlip,
                actual: self.phase,
            }),
        }
    }

    /// Resets board and decks and starts with `first` on move.
    ///
    /// Scores, mode and names are kept.
    #[instrument(skip(self))]
    pub fn start(&mut self, first: Color) {
        self.game = GameState::new(first);
        self.phase = Phase::Active;
        self.outcome = None;
        self.readiness = Readiness::NeitherReady;
        self.coin = None;
        info!(%first, games = self.scores.total(), "Game started");
    }

    /// Validates and applies one placement, then checks for the end of the
    /// game or hands the turn over.
    ///
    /// A rejected move leaves the session unchanged.
    #[instrument(skip(self), fields(turn = %self.current_turn()))]
    pub fn submit_move(&mut self, index: usize, card_id: &str) -> Result<MoveOutcome, MoveError> {
        self.ensure_can_act()?;

        let record = self.game.play(&Move::new(index, card_id.to_string()))?;
        let placement = match record.previous {
            Cell::Empty => Placement::Placed,
            previous => Placement::Overwrote { previous },
        };

        if let Some(outcome) = self.terminal_outcome() {
            self.end(outcome);
            return Ok(MoveOutcome::Ended(outcome));
        }

        self.game.switch_turn();
        let next = self.current_turn();
        debug!(%next, ?placement, "Turn passed");
        Ok(MoveOutcome::Continue {
            next,
            placement: Some(placement),
        })
    }

    /// Hands the turn over when the color on move has no legal placement
    /// but its opponent still does.
    ///
    /// If neither color can move, the game ends as an automatic draw.
    #[instrument(skip(self), fields(turn = %self.current_turn()))]
    pub fn pass_turn(&mut self) -> Result<MoveOutcome, MoveError> {
        self.ensure_can_act()?;

        let turn = self.current_turn();
        if has_any_legal_move(self.board(), self.decks().get(turn)) {
            return Err(MoveError::MovesAvailable(turn));
        }

        if check_automatic_draw(self.board(), self.decks()) {
            let outcome = Outcome::Draw { automatic: true };
            self.end(outcome);
            return Ok(MoveOutcome::Ended(outcome));
        }

        self.game.switch_turn();
        let next = self.current_turn();
        info!(stuck = %turn, %next, "Turn passed without a move");
        Ok(MoveOutcome::Continue {
            next,
            placement: None,
        })
    }

    /// Asks for another game.
    ///
    /// Local sessions flip a new coin. Remote sessions mark the local color
    /// ready; once both colors are ready the game starts, Green first after
    /// an even number of games and Red after an odd number.
    #[instrument(skip(self, rng))]
    pub fn rematch<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
    ) -> Result<RematchOutcome, SessionError> {
        if self.phase != Phase::Ended {
            return Err(SessionError::WrongPhase {
                expected: Phase::Ended,
                actual: self.phase,
            });
        }

        match self.mode {
            Mode::Local => Ok(RematchOutcome::CoinFlip(self.begin_coin_flip(rng))),
            Mode::Remote { local_color } => {
                self.readiness = self.readiness.mark(local_color);
                if self.readiness != Readiness::BothReady {
                    debug!(%local_color, "Waiting for opponent to accept rematch");
                    return Ok(RematchOutcome::Waiting);
                }
                let first = rematch_starter(self.scores.total());
                self.start(first);
                Ok(RematchOutcome::Started(first))
            }
        }
    }

    /// Records an emote for the local color.
    #[instrument(skip(self))]
    pub fn send_emote(&mut self, text: &str) -> Result<(), SessionError> {
        let color = self.local_color().ok_or(SessionError::NotRemote)?;
        self.emotes.set(color, text.to_string());
        debug!(%color, "Emote set");
        Ok(())
    }

    /// Render-ready copy of the session.
    pub fn view(&self) -> SessionView {
        let board = self.board();
        let cells = std::array::from_fn(|index| match board.get(index) {
            Some(Cell::Occupied { rank, owner }) => CellView::Occupied {
                rank,
                owner,
                locked: board.is_locked(index),
            },
            _ => CellView::Empty,
        });
        SessionView {
            cells,
            turn: self.current_turn(),
            unused: Hands {
                green: self.decks().green.unused_cards(),
                red: self.decks().red.unused_cards(),
            },
            outcome: self.outcome,
            phase: self.phase,
            scores: self.scores,
        }
    }

    fn ensure_can_act(&self) -> Result<(), MoveError> {
        if self.phase != Phase::Active {
            debug!(phase = %self.phase, "Move outside active phase");
            return Err(MoveError::GameNotActive);
        }
        if let Mode::Remote { local_color } = self.mode {
            if self.current_turn() != local_color {
                debug!(%local_color, "Move attempted on opponent's turn");
                return Err(MoveError::NotYourTurn(local_color));
            }
        }
        Ok(())
    }

    fn terminal_outcome(&self) -> Option<Outcome> {
        if let Some(winner) = check_win(self.board()) {
            Some(Outcome::Win { winner })
        } else if check_draw(self.board()) {
            Some(Outcome::Draw { automatic: false })
        } else if check_automatic_draw(self.board(), self.decks()) {
            Some(Outcome::Draw { automatic: true })
        } else {
            None
        }
    }

    fn end(&mut self, outcome: Outcome) {
        if self.phase == Phase::Ended {
            warn!(%outcome, "Game already ended");
            return;
        }
        self.phase = Phase::Ended;
        self.outcome = Some(outcome);
        self.scores.record(outcome);
        self.readiness = Readiness::NeitherReady;
        info!(%outcome, scores = ?self.scores, "Game over");
    }
}

/// Starting color of a remote rematch after `games_played` games.
pub fn rematch_starter(games_played: u32) -> Color {
    if games_played % 2 == 0 { Color::Green } else { Color::Red }
}
