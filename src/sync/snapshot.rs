//! Whole-session snapshots exchanged through the room store.
//!
//! Field names follow the shared document format (`currentPlayer`,
//! `replacedTiles`, `storedCellColors`, ...), so snapshots written by older
//! clients decode unchanged. Missing fields fall back to a fresh game.

use super::error::SnapshotError;
use crate::games::cardtoe::{
    Board, CELL_COUNT, Cell, Color, DECK_SIZE, Deck, Decks, GameState, MAX_RANK, MIN_RANK,
};
use crate::session::{Emotes, Mode, Outcome, Phase, Readiness, Scores, Session};
use base64::Engine;
use base64::engine::general_purpose;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use tracing::{debug, instrument, warn};

/// Marker for an empty slot, serialized as `""`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Blank {
    /// The empty string.
    #[serde(rename = "")]
    Empty,
}

/// One board slot: a rank or `""`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RankSlot {
    /// Rank of the card on the cell.
    Rank(u8),
    /// No card.
    Blank(Blank),
}

/// One color slot: a color or `""`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorSlot {
    /// Color of the card on the cell.
    Color(Color),
    /// No card.
    Blank(Blank),
}

fn blank_ranks() -> Vec<RankSlot> {
    vec![RankSlot::Blank(Blank::Empty); CELL_COUNT]
}

fn blank_colors() -> Vec<ColorSlot> {
    vec![ColorSlot::Blank(Blank::Empty); CELL_COUNT]
}

fn default_turn() -> Color {
    Color::Green
}

fn default_active() -> bool {
    true
}

/// Serialized session state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Rank per cell.
    #[serde(default = "blank_ranks")]
    pub board: Vec<RankSlot>,
    /// Color on move.
    #[serde(default = "default_turn")]
    pub current_player: Color,
    /// Whether moves are accepted.
    #[serde(default = "default_active")]
    pub game_active: bool,
    /// Running scores.
    #[serde(default)]
    pub scores: Scores,
    /// Locked cell indices.
    #[serde(default)]
    pub replaced_tiles: Vec<usize>,
    /// Both decks with their used flags.
    #[serde(default)]
    pub player_decks: Option<Decks>,
    /// Color per cell.
    #[serde(default = "blank_colors")]
    pub stored_cell_colors: Vec<ColorSlot>,
    /// Result of the finished game.
    #[serde(default)]
    pub game_result: Option<Outcome>,
    /// Green's emote.
    #[serde(default)]
    pub player1_emote: Option<String>,
    /// Red's emote.
    #[serde(default)]
    pub player2_emote: Option<String>,
    /// Green asked for a rematch.
    #[serde(default)]
    pub player1_ready: bool,
    /// Red asked for a rematch.
    #[serde(default)]
    pub player2_ready: bool,
}

impl Snapshot {
    /// Captures everything a peer needs to rebuild `session`.
    #[instrument(skip_all, fields(phase = %session.phase()))]
    pub fn capture(session: &Session) -> Self {
        let board = session.board();
        let (ranks, colors): (Vec<_>, Vec<_>) = board
            .cells()
            .iter()
            .map(|cell| match *cell {
                Cell::Empty => (RankSlot::Blank(Blank::Empty), ColorSlot::Blank(Blank::Empty)),
                Cell::Occupied { rank, owner } => (RankSlot::Rank(rank), ColorSlot::Color(owner)),
            })
            .unzip();
        let readiness = session.readiness();
        Self {
            board: ranks,
            current_player: session.current_turn(),
            game_active: session.phase() == Phase::Active,
            scores: session.scores(),
            replaced_tiles: board.locked().collect(),
            player_decks: Some(session.decks().clone()),
            stored_cell_colors: colors,
            game_result: session.outcome(),
            player1_emote: session.emotes().green.clone(),
            player2_emote: session.emotes().red.clone(),
            player1_ready: readiness.is_ready(Color::Green),
            player2_ready: readiness.is_ready(Color::Red),
        }
    }

    /// Rebuilds a session, validating every cell, lock and card.
    ///
    /// Active snapshots restore as [`Phase::Active`], inactive ones with a
    /// result as [`Phase::Ended`], anything else as [`Phase::Idle`].
    #[instrument(skip(self, remote_name))]
    pub fn restore(
        &self,
        mode: Mode,
        remote_name: Option<String>,
    ) -> Result<Session, SnapshotError> {
        let board = self.rebuild_board()?;
        let decks = self.player_decks.clone().unwrap_or_default();
        for color in Color::iter() {
            validate_deck(decks.get(color), color)?;
        }

        let phase = match (self.game_active, self.game_result) {
            (true, _) => Phase::Active,
            (false, Some(_)) => Phase::Ended,
            (false, None) => Phase::Idle,
        };
        let outcome = if phase == Phase::Ended { self.game_result } else { None };
        let emotes = Emotes {
            green: self.player1_emote.clone(),
            red: self.player2_emote.clone(),
        };

        debug!(%phase, locked = self.replaced_tiles.len(), "Snapshot restored");
        Ok(Session::from_parts(
            GameState::from_parts(board, decks, self.current_player),
            phase,
            outcome,
            self.scores,
            mode,
            remote_name,
            Readiness::from_flags(self.player1_ready, self.player2_ready),
            emotes,
        ))
    }

    fn rebuild_board(&self) -> Result<Board, SnapshotError> {
        if self.board.len() != CELL_COUNT || self.stored_cell_colors.len() != CELL_COUNT {
            return Err(SnapshotError::new(format!(
                "Expected {} cells, got {} ranks and {} colors",
                CELL_COUNT,
                self.board.len(),
                self.stored_cell_colors.len()
            )));
        }

        let mut board = Board::new();
        for (index, (rank, color)) in self.board.iter().zip(&self.stored_cell_colors).enumerate() {
            let cell = match (*rank, *color) {
                (RankSlot::Blank(_), _) => Cell::Empty,
                (RankSlot::Rank(rank), ColorSlot::Color(owner))
                    if (MIN_RANK..=MAX_RANK).contains(&rank) =>
                {
                    Cell::Occupied { rank, owner }
                }
                (RankSlot::Rank(rank), ColorSlot::Color(_)) => {
                    return Err(SnapshotError::new(format!(
                        "Cell {} has invalid rank {}",
                        index, rank
                    )));
                }
                (RankSlot::Rank(_), ColorSlot::Blank(_)) => {
                    return Err(SnapshotError::new(format!(
                        "Cell {} has a rank but no color",
                        index
                    )));
                }
            };
            board
                .set(index, cell)
                .map_err(|e| SnapshotError::new(e.to_string()))?;
        }

        for &index in &self.replaced_tiles {
            if board.get(index).is_none_or(Cell::is_empty) {
                return Err(SnapshotError::new(format!("Locked cell {} is not occupied", index)));
            }
            board
                .lock(index)
                .map_err(|e| SnapshotError::new(e.to_string()))?;
        }
        Ok(board)
    }

    /// True when any field the change gate watches differs: cells, locks,
    /// turn, result, active flag, ready flags or emotes.
    pub fn differs_from(&self, other: &Snapshot) -> bool {
        let mut locks = self.replaced_tiles.clone();
        let mut other_locks = other.replaced_tiles.clone();
        locks.sort_unstable();
        other_locks.sort_unstable();

        self.board != other.board
            || self.stored_cell_colors != other.stored_cell_colors
            || locks != other_locks
            || self.current_player != other.current_player
            || self.game_result != other.game_result
            || self.game_active != other.game_active
            || self.player1_ready != other.player1_ready
            || self.player2_ready != other.player2_ready
            || self.player1_emote != other.player1_emote
            || self.player2_emote != other.player2_emote
    }

    /// Encodes as the legacy URL payload: base64 of the JSON document.
    pub fn to_legacy_payload(&self) -> Result<String, SnapshotError> {
        let json = serde_json::to_vec(self)?;
        Ok(general_purpose::STANDARD.encode(json))
    }

    /// Decodes a legacy URL payload.
    #[instrument(skip(payload), fields(len = payload.len()))]
    pub fn from_legacy_payload(payload: &str) -> Result<Self, SnapshotError> {
        let json = general_purpose::STANDARD.decode(payload.trim())?;
        Ok(serde_json::from_slice(&json)?)
    }
}

/// Checks that `deck` holds exactly the cards of a fresh `color` deck,
/// in any order and with any used flags.
fn validate_deck(deck: &Deck, color: Color) -> Result<(), SnapshotError> {
    if let Some(card) = deck.cards().iter().find(|c| c.owner != color) {
        return Err(SnapshotError::new(format!(
            "Card {} found in the {} deck",
            card.id, color
        )));
    }
    if deck.cards().len() != DECK_SIZE {
        return Err(SnapshotError::new(format!(
            "The {} deck has {} cards, expected {}",
            color,
            deck.cards().len(),
            DECK_SIZE
        )));
    }

    let mut found: Vec<(&str, u8)> =
        deck.cards().iter().map(|c| (c.id.as_str(), c.rank)).collect();
    found.sort_unstable();
    let fresh = Deck::build(color);
    let mut expected: Vec<(&str, u8)> =
        fresh.cards().iter().map(|c| (c.id.as_str(), c.rank)).collect();
    expected.sort_unstable();
    if found != expected {
        return Err(SnapshotError::new(format!(
            "The {} deck does not match a standard deck",
            color
        )));
    }
    Ok(())
}

/// Session from a legacy URL payload, or a fresh idle session when the
/// payload is malformed.
#[instrument(skip(payload))]
pub fn session_from_payload(payload: &str, mode: Mode) -> (Session, Option<SnapshotError>) {
    match Snapshot::from_legacy_payload(payload).and_then(|s| s.restore(mode, None)) {
        Ok(session) => (session, None),
        Err(e) => {
            warn!(error = %e, "Invalid game payload, starting a new game instead");
            (Session::new(mode), Some(e))
        }
    }
}
