//! Headless gridlock runner (default binary).
//!
//! Reads one command per line from stdin and prints every game event as a
//! JSON line on stdout:
//!
//! ```text
//! click <x> <y>   place the current piece centred on (x, y)
//! rotate [n]      turn the current piece n quarter turns (default 1)
//! swap            exchange current and following pieces
//! state           print a snapshot
//! quit            stop and print the final snapshot
//! ```
//!
//! Plays locally unless `GRIDLOCK_SERVER_HOST` is set.

use anyhow::{Context, Result};
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;

use gridlock::adapter::{ConnectConfig, MultiplayerGame, MultiplayerSession, TcpTransport};
use gridlock::core::{Game, GameSnapshot};
use gridlock::engine::{self, EngineConfig, EngineHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Click(i32, i32),
    Rotate(i32),
    Swap,
    State,
    Quit,
}

impl Command {
    fn from_str(line: &str) -> Option<Self> {
        let mut words = line.split_whitespace();
        let command = match words.next()? {
            "click" => {
                let x = words.next()?.parse().ok()?;
                let y = words.next()?.parse().ok()?;
                Command::Click(x, y)
            }
            "rotate" => match words.next() {
                Some(n) => Command::Rotate(n.parse().ok()?),
                None => Command::Rotate(1),
            },
            "swap" => Command::Swap,
            "state" => Command::State,
            "quit" | "exit" => Command::Quit,
            _ => return None,
        };
        if words.next().is_some() {
            return None;
        }
        Some(command)
    }
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string(value) {
        Ok(line) => println!("{}", line),
        Err(err) => log::warn!("failed to encode event: {}", err),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let config = EngineConfig::from_env();
    match ConnectConfig::from_env() {
        Some(connect) => run_multiplayer(config, connect).await,
        None => run_local(config).await,
    }
}

async fn run_local(config: EngineConfig) -> Result<()> {
    log::info!("local game, seed {}", config.seed);
    let mut game = Game::local(config.cols, config.rows, config.seed);
    game.subscribe(|event| print_json(event));

    let (handle, task) = engine::spawn(game, &config);
    drive(handle, task).await
}

async fn run_multiplayer(config: EngineConfig, connect: ConnectConfig) -> Result<()> {
    let transport = TcpTransport::connect(&connect)
        .await
        .with_context(|| format!("failed to connect to {}", connect.address()))?;

    let game = MultiplayerGame::new(config.cols, config.rows, transport.communicator());
    let mut session = MultiplayerSession::new(game, connect.player.clone());
    session.subscribe_game(|event| print_json(event));
    session.subscribe(|event| print_json(event));

    let (handle, task) = engine::spawn(session, &config);
    let reader = transport.spawn_reader(handle.clone());

    let result = drive(handle, task).await;
    reader.abort();
    result
}

async fn drive<I>(handle: EngineHandle<I>, task: JoinHandle<GameSnapshot>) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let Some(command) = Command::from_str(&line) else {
            log::warn!("unknown command `{}`", line.trim());
            continue;
        };

        let sent = match command {
            Command::Click(x, y) => handle.block_clicked(x, y),
            Command::Rotate(times) => handle.rotate(times),
            Command::Swap => handle.swap(),
            Command::State => handle.snapshot().await.map(|snapshot| print_json(&snapshot)),
            Command::Quit => break,
        };
        if sent.is_err() {
            log::warn!("engine is gone, exiting");
            break;
        }
    }

    // The engine may already have stopped on its own.
    let _ = handle.stop();
    let snapshot = task.await.context("engine task failed")?;
    print_json(&snapshot);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::from_str("click 2 3"), Some(Command::Click(2, 3)));
        assert_eq!(Command::from_str("  rotate  "), Some(Command::Rotate(1)));
        assert_eq!(Command::from_str("rotate -1"), Some(Command::Rotate(-1)));
        assert_eq!(Command::from_str("swap"), Some(Command::Swap));
        assert_eq!(Command::from_str("state"), Some(Command::State));
        assert_eq!(Command::from_str("quit"), Some(Command::Quit));
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert_eq!(Command::from_str("click 2"), None);
        assert_eq!(Command::from_str("click a b"), None);
        assert_eq!(Command::from_str("swap now"), None);
        assert_eq!(Command::from_str("drop"), None);
    }
}
