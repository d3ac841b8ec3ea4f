//! Game configuration loaded from TOML.

use crate::games::cardtoe::Color;
use crate::sync::DEFAULT_ROOM_ID_ATTEMPTS;
use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Longest display name kept; longer names are truncated.
pub const MAX_NAME_CHARS: usize = 15;

/// Player and AI settings.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct GameConfig {
    /// Display name shown to the remote peer.
    #[serde(default = "default_player_name")]
    player_name: String,

    /// Colors played by the heuristic AI in local games.
    #[serde(default)]
    ai_seats: Vec<Color>,

    /// Pause before each AI move, in milliseconds.
    #[serde(default = "default_ai_delay_ms")]
    ai_delay_ms: u64,

    /// Random room ids tried before falling back to a timestamp.
    #[serde(default = "default_room_id_attempts")]
    room_id_attempts: u32,

    /// Seed for coin flips and room ids; random when absent.
    #[serde(default)]
    seed: Option<u64>,
}

#[instrument]
fn default_player_name() -> String {
    "Player".to_string()
}

#[instrument]
fn default_ai_delay_ms() -> u64 {
    500
}

#[instrument]
fn default_room_id_attempts() -> u32 {
    DEFAULT_ROOM_ID_ATTEMPTS
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            player_name: default_player_name(),
            ai_seats: Vec::new(),
            ai_delay_ms: default_ai_delay_ms(),
            room_id_attempts: default_room_id_attempts(),
            seed: None,
        }
    }
}

/// Trims a display name and cuts it to [`MAX_NAME_CHARS`] characters.
///
/// Blank names become `fallback`.
pub fn clean_name(name: &str, fallback: &str) -> String {
    let trimmed = name.trim();
    let name = if trimmed.is_empty() { fallback } else { trimmed };
    name.chars().take(MAX_NAME_CHARS).collect()
}

impl GameConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        Self::from_toml(&content)
    }

    /// Parses configuration from TOML text.
    #[instrument(skip(content))]
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        config.player_name = clean_name(&config.player_name, &default_player_name());
        if config.room_id_attempts == 0 {
            return Err(ConfigError::new("room_id_attempts must be at least 1".to_string()));
        }
        info!(
            player = %config.player_name,
            ai_seats = ?config.ai_seats,
            "Config loaded successfully"
        );
        Ok(config)
    }

    /// Overrides the player name, applying the same truncation.
    pub fn with_player_name(mut self, name: &str) -> Self {
        self.player_name = clean_name(name, &default_player_name());
        self
    }

    /// Overrides the AI seats.
    pub fn with_ai_seats(mut self, seats: Vec<Color>) -> Self {
        self.ai_seats = seats;
        self
    }

    /// Overrides the seed.
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        if seed.is_some() {
            self.seed = seed;
        }
        self
    }

    /// AI pause as a duration.
    pub fn ai_delay(&self) -> Duration {
        Duration::from_millis(self.ai_delay_ms)
    }

    /// Whether the AI plays `color`.
    pub fn is_ai(&self, color: Color) -> bool {
        self.ai_seats.contains(&color)
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_name() {
        assert_eq!(clean_name("  Ana  ", "Player"), "Ana");
        assert_eq!(clean_name("", "Player 2"), "Player 2");
        assert_eq!(clean_name("abcdefghijklmnopqrst", "x"), "abcdefghijklmno");
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = GameConfig::from_toml("").unwrap();
        assert_eq!(config, GameConfig::default());
        assert_eq!(config.ai_delay(), Duration::from_millis(500));
        assert_eq!(*config.room_id_attempts(), 10);
    }
}
