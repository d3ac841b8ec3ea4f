//! cardtoe - terminal front end
//!
//! Local pass-and-play, AI series, a two-peer room demo and a legacy
//! payload inspector.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use cardtoe::{
    Color, GameConfig, GameEvent, HeuristicPlayer, HumanPlayer, MemoryRoomStore, Mode,
    MoveOutcome, Orchestrator, Player, RemotePeer, Session, SharedInput, choose_move, clean_name,
    has_any_legal_move, session_from_payload,
};
use clap::Parser;
use cli::{Cli, Command};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info, instrument, warn};
use tracing_subscriber::EnvFilter;

/// Environment variable overriding the configured player name.
const PLAYER_NAME_VAR: &str = "CARDTOE_PLAYER_NAME";

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,cardtoe=debug")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(&cli)?;
    let mut rng = match config.seed() {
        Some(seed) => StdRng::seed_from_u64(*seed),
        None => StdRng::from_entropy(),
    };

    match cli.command {
        Command::Local { ai } => {
            let mut seats = config.ai_seats().clone();
            seats.extend(ai);
            run_local(config.with_ai_seats(seats), &mut rng).await
        }
        Command::Watch { games } => run_watch(&config, &mut rng, games).await,
        Command::RemoteDemo { guest_name } => run_remote_demo(&config, &mut rng, &guest_name).await,
        Command::Decode { payload } => {
            run_decode(&payload);
            Ok(())
        }
    }
}

/// Reads the config file when present, then applies environment and CLI
/// overrides.
#[instrument(skip(cli), fields(path = %cli.config.display()))]
fn load_config(cli: &Cli) -> Result<GameConfig> {
    let mut config = if cli.config.exists() {
        GameConfig::from_file(&cli.config)?
    } else {
        debug!("No config file, using defaults");
        GameConfig::default()
    };
    if let Ok(name) = std::env::var(PLAYER_NAME_VAR) {
        config = config.with_player_name(&name);
    }
    Ok(config.with_seed(cli.seed))
}

/// Pass-and-play on the terminal
async fn run_local(config: GameConfig, rng: &mut StdRng) -> Result<()> {
    info!(ai_seats = ?config.ai_seats(), "Starting local game");
    let input = spawn_stdin_reader();

    let seat = |color: Color| -> Box<dyn Player> {
        if config.is_ai(color) {
            Box::new(HeuristicPlayer::new(format!("AI ({})", color), config.ai_delay()))
        } else {
            Box::new(HumanPlayer::shared(
                clean_name(&format!("{} {}", config.player_name(), color), "Player"),
                input.clone(),
            ))
        }
    };

    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let printer = tokio::spawn(print_events(event_rx));
    let mut orchestrator = Orchestrator::new(
        Session::new(Mode::Local),
        seat(Color::Green),
        seat(Color::Red),
        event_tx,
    );
    orchestrator.play_game(rng).await?;
    drop(orchestrator);
    printer.await?;
    Ok(())
}

/// AI against AI for a number of games
async fn run_watch(config: &GameConfig, rng: &mut StdRng, games: u32) -> Result<()> {
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let printer = tokio::spawn(print_events(event_rx));
    let mut orchestrator = Orchestrator::new(
        Session::new(Mode::Local),
        Box::new(HeuristicPlayer::new("AI green", config.ai_delay())),
        Box::new(HeuristicPlayer::new("AI red", config.ai_delay())),
        event_tx,
    );
    let scores = orchestrator.play_series(rng, games).await?;
    drop(orchestrator);
    printer.await?;
    println!(
        "Series over: green {} / red {} / draws {}",
        scores.green, scores.red, scores.draws
    );
    Ok(())
}

/// Host and guest, both AI, playing one game through the in-memory store
async fn run_remote_demo(config: &GameConfig, rng: &mut StdRng, guest_name: &str) -> Result<()> {
    let store = Arc::new(MemoryRoomStore::new());
    let mut host = RemotePeer::new(store.clone(), config.player_name().clone());
    let mut guest = RemotePeer::new(store, clean_name(guest_name, "Player 2"));

    let room_id = host.host(rng, *config.room_id_attempts()).await?;
    println!("Room {} created by {}", room_id, host.name());
    guest.join(&room_id).await?;
    let joined = host.wait_for_guest().await?;
    println!("{} joined as red", joined);

    loop {
        host.drain()?;
        guest.drain()?;
        let session = host.session();
        if let Some(outcome) = session.outcome() {
            println!("{}\n\nResult: {}", session.board().display(), outcome);
            break;
        }

        let turn = session.current_turn();
        let peer = match turn {
            Color::Green => &mut host,
            Color::Red => &mut guest,
        };
        let result = play_remote_turn(peer).await?;
        if let MoveOutcome::Continue { placement: None, .. } = result {
            println!("{} has no legal move and passes", turn);
        }
        tokio::time::sleep(config.ai_delay()).await;
    }

    host.send_emote("gg").await?;
    guest.drain()?;
    if let Some(emote) = guest.session().emotes().get(Color::Green) {
        println!("{} says: {}", host.name(), emote);
    }

    guest.cancel().await;
    host.cancel().await;
    Ok(())
}

/// One heuristic move (or pass) for the peer on turn.
async fn play_remote_turn(peer: &mut RemotePeer<MemoryRoomStore>) -> Result<MoveOutcome> {
    let session = peer.session();
    let turn = session.current_turn();
    let decks = session.decks();
    if !has_any_legal_move(session.board(), decks.get(turn)) {
        return Ok(peer.pass_turn().await?);
    }
    let choice = choose_move(
        session.board(),
        decks.get(turn).cards(),
        decks.get(turn.opponent()).cards(),
    )
    .ok_or_else(|| anyhow::anyhow!("No legal move for {}", turn))?;
    println!(
        "{} ({}) plays {} on cell {} [{}]",
        peer.name(),
        turn,
        choice.card_id,
        choice.index,
        choice.tier
    );
    Ok(peer.submit_move(choice.index, &choice.card_id).await?)
}

/// Prints what a legacy payload holds
fn run_decode(payload: &str) {
    let (session, error) = session_from_payload(payload, Mode::Local);
    if let Some(e) = error {
        warn!(error = %e, "Payload rejected");
        println!("Invalid game payload ({}). Starting a new game instead.", e);
    }
    let scores = session.scores();
    println!("{}\n", session.board().display());
    println!("Phase: {}", session.phase());
    println!("Turn: {}", session.current_turn());
    println!(
        "Unused cards: green {} / red {}",
        session.decks().green.unused_count(),
        session.decks().red.unused_count()
    );
    println!(
        "Scores: green {} / red {} / draws {}",
        scores.green, scores.red, scores.draws
    );
}

/// Forwards stdin lines into a shared input channel.
fn spawn_stdin_reader() -> SharedInput {
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if tx.send(line).is_err() {
                break;
            }
        }
        debug!("Stdin closed");
    });
    Arc::new(Mutex::new(rx))
}

/// Renders orchestrator events on stdout.
async fn print_events(mut event_rx: mpsc::UnboundedReceiver<GameEvent>) {
    while let Some(event) = event_rx.recv().await {
        match event {
            GameEvent::Started { first } => println!("\nCoin flip: {} starts", first),
            GameEvent::StateChanged(board) => println!("\n{}\n", board),
            GameEvent::Thinking { player, color, hand } => {
                println!("{} ({}) to move, cards {:?}. Enter '<cell> <rank>':", player, color, hand)
            }
            GameEvent::MoveMade { player, mov, .. } => println!("{} played {}", player, mov),
            GameEvent::Rejected { player, reason } => println!("{}: {}", player, reason),
            GameEvent::Passed { color } => println!("{} has no legal move and passes", color),
            GameEvent::GameOver { outcome, scores } => println!(
                "Game over: {}. Scores green {} / red {} / draws {}",
                outcome, scores.green, scores.red, scores.draws
            ),
        }
    }
}
