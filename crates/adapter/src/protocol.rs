//! Protocol module - line-based text messages exchanged with the game server
//!
//! Every message is one line: an upper-case command word, a space, then the
//! payload.
//!
//! ```text
//! client -> server   PIECE | BOARD v0 v1 ... | SCORE n | SCORES | DIE | MSG text
//! server -> client   PIECE id | BOARD name:v0 v1 ... | SCORES name:score ... | DIE name | MSG name:text
//! ```
//!
//! Boards travel row-major (`y` outer, `x` inner).

use std::fmt;

use gridlock_core::Grid;
use gridlock_types::{Cell, PIECE_COUNT};

// ============== Client -> Server Messages ==============

/// Message sent by this client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundMessage {
    /// Ask for one more piece
    PieceRequest,
    /// Our grid, row-major
    Board(Vec<Cell>),
    Score(u32),
    /// Ask for the leaderboard
    ScoresRequest,
    /// We have lost
    Die,
    Msg(String),
}

impl OutboundMessage {
    pub fn board(grid: &Grid) -> Self {
        OutboundMessage::Board(grid.cells().to_vec())
    }
}

impl fmt::Display for OutboundMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutboundMessage::PieceRequest => f.write_str("PIECE"),
            OutboundMessage::Board(values) => {
                f.write_str("BOARD")?;
                for value in values {
                    write!(f, " {}", value)?;
                }
                Ok(())
            }
            OutboundMessage::Score(score) => write!(f, "SCORE {}", score),
            OutboundMessage::ScoresRequest => f.write_str("SCORES"),
            OutboundMessage::Die => f.write_str("DIE"),
            OutboundMessage::Msg(text) => write!(f, "MSG {}", text),
        }
    }
}

/// `BOARD` line for `grid`
pub fn board_line(grid: &Grid) -> String {
    OutboundMessage::board(grid).to_string()
}

// ============== Server -> Client Messages ==============

/// Message received from the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundMessage {
    /// Next piece id for us, in catalog order
    Piece(usize),
    /// Another player's grid, row-major
    Board { player: String, values: Vec<u32> },
    /// Full leaderboard
    Scores(Vec<(String, u32)>),
    /// A player has lost
    Die(String),
    Chat { from: String, text: String },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    #[error("empty message")]
    Empty,
    #[error("unknown command `{0}`")]
    UnknownCommand(String),
    #[error("{0} message without payload")]
    MissingPayload(&'static str),
    #[error("invalid number `{0}`")]
    InvalidNumber(String),
    #[error("piece id {0} is not in the catalog")]
    UnknownPiece(usize),
    #[error("malformed entry `{0}`")]
    MalformedEntry(String),
}

/// Parse one inbound message.
///
/// `SCORES` entries may be separated by spaces or newlines; every other
/// command is a single line.
pub fn parse_line(line: &str) -> Result<InboundMessage, ProtocolError> {
    let line = line.trim();
    if line.is_empty() {
        return Err(ProtocolError::Empty);
    }

    let (command, payload) = match line.split_once(char::is_whitespace) {
        Some((command, payload)) => (command, payload.trim()),
        None => (line, ""),
    };

    match command {
        "PIECE" => parse_piece(payload),
        "BOARD" => {
            let (player, values) = split_named("BOARD", payload)?;
            let values = values
                .split_whitespace()
                .map(parse_number)
                .collect::<Result<Vec<u32>, _>>()?;
            Ok(InboundMessage::Board {
                player: player.to_string(),
                values,
            })
        }
        "SCORES" => payload
            .split_whitespace()
            .map(parse_score_entry)
            .collect::<Result<Vec<_>, _>>()
            .map(InboundMessage::Scores),
        "DIE" => {
            if payload.is_empty() {
                return Err(ProtocolError::MissingPayload("DIE"));
            }
            Ok(InboundMessage::Die(payload.to_string()))
        }
        "MSG" => {
            let (from, text) = split_named("MSG", payload)?;
            Ok(InboundMessage::Chat {
                from: from.to_string(),
                text: text.to_string(),
            })
        }
        other => Err(ProtocolError::UnknownCommand(other.to_string())),
    }
}

fn parse_piece(payload: &str) -> Result<InboundMessage, ProtocolError> {
    if payload.is_empty() {
        return Err(ProtocolError::MissingPayload("PIECE"));
    }
    let id: usize = payload
        .parse()
        .map_err(|_| ProtocolError::InvalidNumber(payload.to_string()))?;
    if id >= PIECE_COUNT {
        return Err(ProtocolError::UnknownPiece(id));
    }
    Ok(InboundMessage::Piece(id))
}

fn parse_number(text: &str) -> Result<u32, ProtocolError> {
    text.parse()
        .map_err(|_| ProtocolError::InvalidNumber(text.to_string()))
}

/// Split `name:rest`
fn split_named<'a>(
    command: &'static str,
    payload: &'a str,
) -> Result<(&'a str, &'a str), ProtocolError> {
    if payload.is_empty() {
        return Err(ProtocolError::MissingPayload(command));
    }
    match payload.split_once(':') {
        Some((name, rest)) if !name.is_empty() => Ok((name, rest.trim())),
        _ => Err(ProtocolError::MalformedEntry(payload.to_string())),
    }
}

/// `name:score`, optionally followed by `:extra` fields which are ignored
fn parse_score_entry(entry: &str) -> Result<(String, u32), ProtocolError> {
    let mut fields = entry.split(':');
    let name = fields.next().unwrap_or_default();
    let score = fields
        .next()
        .ok_or_else(|| ProtocolError::MalformedEntry(entry.to_string()))?;
    if name.is_empty() {
        return Err(ProtocolError::MalformedEntry(entry.to_string()));
    }
    Ok((name.to_string(), parse_number(score)?))
}
