//! Console binary for the RuneQuest simulation.
//!
//! Wires the engine to a terminal: loads configuration, restores the
//! player from the JSON data directory, and runs the real-time session
//! loop until the player quits, stdin closes, Ctrl-C is pressed, or the
//! configured real-time limit elapses.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `runequest-config.yaml` (or the path given as
//!    the first argument), falling back to defaults
//! 2. Initialize structured logging on stderr (tracing)
//! 3. Load the player record, creating it on first login
//! 4. Build the starting world and the engine
//! 5. Spawn the stdin reader and the Ctrl-C handler
//! 6. Run the session loop
//! 7. Log the result

mod console;
mod error;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::SmallRng;
use runequest_core::config::{LogFormat, LoggingConfig};
use runequest_core::{
    GameConfig, GameEngine, JsonFileRepository, MemoryChat, PlayerRepository, SessionCommand,
    SessionServices, runner,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, oneshot};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::console::{ConsoleInput, ConsoleObserver};
use crate::error::EngineError;

/// Default configuration file, relative to the working directory.
const CONFIG_FILE: &str = "runequest-config.yaml";

/// Buffered commands between the console and the session loop.
const COMMAND_BUFFER: usize = 64;

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, player loading, engine construction,
/// or the final save fails.
#[tokio::main]
async fn main() -> Result<(), EngineError> {
    // 1. Load configuration.
    let config_path = std::env::args_os()
        .nth(1)
        .map_or_else(|| PathBuf::from(CONFIG_FILE), PathBuf::from);
    let (config, from_file) = load_config(&config_path)?;

    // 2. Initialize structured logging.
    init_logging(&config.logging)?;
    info!("runequest-engine starting");
    if from_file {
        info!(path = %config_path.display(), "configuration loaded");
    } else {
        info!(path = %config_path.display(), "config file not found, using defaults");
    }
    info!(
        world = %config.world.name,
        seed = ?config.world.seed,
        username = %config.session.username,
        data_dir = %config.session.data_dir.display(),
        "configuration summary"
    );

    // 3. Load the player.
    let repository = Arc::new(JsonFileRepository::new(config.session.data_dir.clone()));
    let loaded = repository.load(&config.session.username).await?;
    info!(
        hp = loaded.player.hp,
        gold = loaded.player.gold,
        items = loaded.inventory.len(),
        "player loaded"
    );

    // 4. Build the engine.
    let seed = config.world.session_seed();
    info!(seed, pinned = config.world.seed.is_some(), "rng seeded");
    let rng = SmallRng::seed_from_u64(seed);
    let mut engine = GameEngine::new(runequest_world::create_starting_world(), loaded, config, rng)?;
    let services = SessionServices {
        repository,
        chat: Arc::new(MemoryChat::new()),
    };

    // 5. Console input and Ctrl-C.
    let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
    tokio::spawn(read_console(tx.clone()));
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl-C received");
            let _ = tx.send(SessionCommand::Shutdown).await;
        }
    });

    println!("{}", console::HELP);
    if let Some(line) = engine.log().latest() {
        println!("{line}");
    }

    // 6. Run the session.
    let summary = runner::run_session(&mut engine, &services, rx, &mut ConsoleObserver).await?;

    // 7. Log results.
    runner::log_session_end(&summary);
    info!(end_reason = ?summary.end_reason, "runequest-engine shutdown complete");
    Ok(())
}

/// Load the configuration file if it exists.
///
/// Returns the configuration and whether it came from the file.
fn load_config(path: &Path) -> Result<(GameConfig, bool), EngineError> {
    if path.exists() {
        Ok((GameConfig::from_file(path)?, true))
    } else {
        Ok((GameConfig::default(), false))
    }
}

/// Install the global tracing subscriber. `RUST_LOG` overrides the
/// configured level.
fn init_logging(logging: &LoggingConfig) -> Result<(), EngineError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);
    let installed = match logging.format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|e| EngineError::Logging {
        message: e.to_string(),
    })
}

/// Forward stdin lines to the session until EOF or `quit`.
async fn read_console(tx: mpsc::Sender<SessionCommand>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(err) => {
                warn!(error = %err, "failed to read stdin");
                break;
            }
        };
        match console::parse_line(&line) {
            Ok(ConsoleInput::Command(command)) => {
                let quitting = matches!(command, SessionCommand::Shutdown);
                if tx.send(command).await.is_err() || quitting {
                    return;
                }
            }
            Ok(ConsoleInput::Status) => {
                let (reply_tx, reply_rx) = oneshot::channel();
                if tx.send(SessionCommand::Status(reply_tx)).await.is_err() {
                    return;
                }
                if let Ok(status) = reply_rx.await {
                    println!("{}", console::format_status(&status));
                }
            }
            Ok(ConsoleInput::Help) => println!("{}", console::HELP),
            Ok(ConsoleInput::Empty) => {}
            Err(err) => println!("{err}"),
        }
    }
    let _ = tx.send(SessionCommand::Shutdown).await;
}
