//! Town square host - binary entry point.
//!
//! Reads `<caller> <Command> [args...]` lines from stdin and prints rendered
//! results to stdout. Diagnostics go to a log file so they never interleave
//! with game output.
//!
//! ```text
//! main() -> TownsquareConfig::load() -> Host::new() -> handle_line() per input line
//! ```

mod host;
mod render;

use anyhow::{Context, Result};
use std::{
    env,
    fs::{self, File, OpenOptions},
    io::{self, BufRead, Write},
    path::{Path, PathBuf},
    sync::Mutex,
};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use townsquare_config::{TownsquareConfig, base_dir, config_path};
use townsquare_types::GameId;

use crate::host::Host;

/// Selects the game when no argument is given.
const GAME_ENV: &str = "TOWNSQUARE_GAME";
const DEFAULT_GAME: &str = "default";

const LOG_FILE: &str = "townsquare.log";

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let candidates = log_file_candidates(config_path().as_deref(), &base_dir());
    let (log_file, warnings) = open_log_file(candidates);

    let Some((log_path, file)) = log_file else {
        // stdout carries game output; no log file means no logs.
        tracing_subscriber::registry().with(env_filter).init();
        return;
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        .with(env_filter)
        .init();
    tracing::info!(path = %log_path.display(), "Logging initialized");
    for warning in warnings {
        tracing::warn!("{warning}");
    }
}

/// Log file locations in preference order: beside the config file, under
/// the base directory, then relative to the working directory.
fn log_file_candidates(config_path: Option<&Path>, base: &Path) -> Vec<PathBuf> {
    let mut candidates: Vec<PathBuf> = config_path
        .and_then(Path::parent)
        .map(Path::to_path_buf)
        .into_iter()
        .chain([base.to_path_buf(), PathBuf::from(".townsquare")])
        .map(|dir| dir.join("logs").join(LOG_FILE))
        .collect();
    candidates.dedup();
    candidates
}

fn open_log_file(candidates: Vec<PathBuf>) -> (Option<(PathBuf, File)>, Vec<String>) {
    let mut warnings = Vec::new();
    for candidate in candidates {
        let opened = candidate
            .parent()
            .map_or(Ok(()), fs::create_dir_all)
            .and_then(|()| {
                OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&candidate)
            });
        match opened {
            Ok(file) => return (Some((candidate, file)), warnings),
            Err(e) => warnings.push(format!("Cannot log to {}: {e}", candidate.display())),
        }
    }
    (None, warnings)
}

fn game_from_args() -> Result<GameId> {
    let raw = env::args()
        .nth(1)
        .or_else(|| env::var(GAME_ENV).ok())
        .unwrap_or_else(|| DEFAULT_GAME.to_string());
    GameId::new(raw).context("invalid game id")
}

fn main() -> Result<()> {
    init_tracing();

    let config = match TownsquareConfig::load() {
        Ok(config) => config.unwrap_or_default(),
        Err(err) => {
            eprintln!("Ignoring config: {err}");
            TownsquareConfig::default()
        }
    };
    let data_dir = config.data_dir();
    let game = game_from_args()?;
    tracing::info!(%game, data_dir = %data_dir.display(), "Starting host");

    let host = Host::new(config, data_dir, game);
    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();

    for line in stdin.lock().lines() {
        let line = line.context("failed to read stdin")?;
        if matches!(line.trim(), "quit" | "exit") {
            break;
        }
        for out in host.handle_line(&line)? {
            writeln!(stdout, "{out}")?;
        }
        stdout.flush()?;
    }
    Ok(())
}
