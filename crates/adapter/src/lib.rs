//! Adapter module - multiplayer play against a game server
//!
//! This module keeps a local game in sync with a server that hands out pieces
//! and relays every player's board and score. The protocol is line-based
//! ASCII over a TCP connection.
//!
//! # Protocol Overview
//!
//! ## Client → Server
//!
//! - **PIECE**: request one more piece
//! - **BOARD v0 v1 ...**: our grid after a placement, row-major
//! - **SCORE n**: our score whenever it changes
//! - **SCORES**: request the leaderboard
//! - **DIE**: we are out
//! - **MSG text**: chat
//!
//! ## Server → Client
//!
//! - **PIECE id**: the next piece for us (catalog index `0..=14`)
//! - **BOARD name:v0 v1 ...**: another player's grid
//! - **SCORES name:score ...**: the full leaderboard
//! - **DIE name**: a player is out
//! - **MSG name:text**: chat
//!
//! # Environment Variables
//!
//! - `GRIDLOCK_SERVER_HOST`: server address; multiplayer is off when unset
//! - `GRIDLOCK_SERVER_PORT`: port number (default: 9700)
//! - `GRIDLOCK_PLAYER`: our name on the server (default: "player")
//!
//! # Example Protocol Flow
//!
//! ```text
//! Client -> Server: SCORES
//! Client -> Server: PIECE            (x5, one per second)
//! Server -> Client: SCORES alice:300 bob:120
//! Server -> Client: PIECE 3
//! Server -> Client: PIECE 0
//! Client -> Server: PIECE            (after a placement)
//! Client -> Server: BOARD 0 0 4 0 0 ...
//! ```
//!
//! # Implementation
//!
//! - [`protocol`]: message types, formatting and parsing
//! - [`communicator`]: outbound line sink and the tokio TCP transport
//! - [`multiplayer`]: game wrapper that requests pieces and reports progress
//! - [`session`]: leaderboard, other players' boards, and the engine hookup

pub mod communicator;
pub mod multiplayer;
pub mod protocol;
pub mod session;

pub use communicator::{pump_inbound, Communicator, ConnectConfig, TcpTransport};
pub use multiplayer::{MultiplayerGame, PendingPieces};
pub use protocol::{board_line, parse_line, InboundMessage, OutboundMessage, ProtocolError};
pub use session::{Leaderboard, MultiplayerSession, PlayerBoards, SessionEvent};
