//! Command-line interface for cardtoe.

use cardtoe::Color;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Card tic-tac-toe on a 4x4 grid
#[derive(Parser, Debug)]
#[command(name = "cardtoe")]
#[command(about = "Card tic-tac-toe with a heuristic AI and room sync", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the game config file
    #[arg(short, long, default_value = "cardtoe.toml", global = true)]
    pub config: PathBuf,

    /// Seed for coin flips and room ids
    #[arg(long, global = true)]
    pub seed: Option<u64>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Pass-and-play on this terminal
    Local {
        /// Colors played by the AI
        #[arg(long, value_parser = parse_color)]
        ai: Vec<Color>,
    },

    /// Watch the AI play against itself
    Watch {
        /// Number of games
        #[arg(short, long, default_value = "1")]
        games: u32,
    },

    /// Two AI peers playing through the in-memory room store
    RemoteDemo {
        /// Guest display name
        #[arg(long, default_value = "Player 2")]
        guest_name: String,
    },

    /// Inspect a legacy URL game payload
    Decode {
        /// Base64 payload from the `state` URL parameter
        payload: String,
    },
}

/// Parses `green` or `red`.
fn parse_color(value: &str) -> Result<Color, String> {
    match value.to_ascii_lowercase().as_str() {
        "green" | "g" => Ok(Color::Green),
        "red" | "r" => Ok(Color::Red),
        other => Err(format!("unknown color '{}', expected green or red", other)),
    }
}
