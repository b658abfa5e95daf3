//! Core game logic module - pure, deterministic, and testable
//!
//! This module contains all the game rules, state management, and simulation logic.
//! It has **zero dependencies** on timers, networking, or I/O, making it:
//!
//! - **Deterministic**: Same seed produces identical games
//! - **Testable**: Comprehensive unit tests for all game rules
//! - **Portable**: Can be driven by a local loop, a server connection or a test
//!
//! # Module Structure
//!
//! - [`grid`]: cols x rows grid of colour values with placement and line scanning
//! - [`pieces`]: the fifteen 3x3 piece shapes and quarter-turn rotation
//! - [`game_state`]: queue, lives, multiplier, score and level of one game
//! - [`rng`]: where replacement pieces come from
//! - [`scoring`]: points, levels and life-loss timer delays
//! - [`events`]: listener registration and event dispatch
//! - [`snapshot`]: serializable copies of a game
//!
//! # Game Rules
//!
//! - A click centres the current piece on the clicked cell; it is placed only if
//!   every block lands on an empty cell inside the grid.
//! - After each placement, full rows and full columns are cleared together and
//!   scored as `lines * blocks * 10 * multiplier`.
//! - Every clear raises the multiplier by one; a placement without a clear, a
//!   rejected click, or a lost life resets it to 1.
//! - The life-loss countdown restarts on every placement. When it expires a
//!   life is lost and the current piece is skipped; expiring with no lives
//!   left ends the game.
//!
//! # Example
//!
//! ```
//! use gridlock_core::rng::ScriptedSource;
//! use gridlock_core::{Game, Placement};
//! use gridlock_types::PieceKind;
//!
//! let mut game = Game::new(5, 5, ScriptedSource::new([PieceKind::Dot, PieceKind::Line, PieceKind::Plus]));
//! game.start();
//!
//! assert!(game.block_clicked(2, 2).is_placed());
//! assert_eq!(game.grid().cell(2, 2), PieceKind::Dot.color());
//! assert_eq!(game.current().map(|p| p.kind()), Some(PieceKind::Line));
//! ```

pub mod events;
pub mod game_state;
pub mod grid;
pub mod pieces;
pub mod rng;
pub mod scoring;
pub mod snapshot;

pub use gridlock_types as types;

// Re-export commonly used types for convenience
pub use events::{EventBus, GameEvent};
pub use game_state::{Game, LineClear, Placement, TimerRequest};
pub use grid::{Grid, GridError, LineScan};
pub use pieces::Piece;
pub use rng::{PieceSource, RandomSource, ScriptedSource};
pub use scoring::{level_for_score, line_clear_points, timer_delay, timer_delay_ms};
pub use snapshot::{GameSnapshot, PieceSnapshot};
