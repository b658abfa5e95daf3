//! Shared types module - plain data structures and constants
//!
//! This module defines the fundamental types used throughout the workspace.
//! Everything here is plain data with no behaviour beyond parsing and
//! conversion, so it can be used from the core rules, the execution context
//! and the network adapter alike.
//!
//! # Grid Dimensions
//!
//! The default board is a 5x5 grid, indexed `(x, y)` with `x` the column
//! (0 = left) and `y` the row (0 = top). Other sizes can be chosen per game.
//!
//! # Game Constants
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `START_LIVES` | 3 | Lives at game start (only ever decremented) |
//! | `POINTS_PER_BLOCK` | 10 | Points per cleared block, per cleared line |
//! | `POINTS_PER_LEVEL` | 1000 | Score needed for each level |
//! | `BASE_DELAY_MS` | 12000 | Life-loss timer at level 0 |
//! | `DELAY_STEP_MS` | 500 | Timer reduction per level |
//! | `MIN_DELAY_MS` | 2500 | Timer floor |
//!
//! # Examples
//!
//! ```
//! use gridlock_types::{PieceKind, PIECE_COUNT};
//!
//! let kind = PieceKind::from_index(9).unwrap();
//! assert_eq!(kind, PieceKind::T);
//! assert_eq!(kind.color(), 10);
//!
//! assert_eq!(PieceKind::from_str("inverse_corner"), Some(PieceKind::InverseCorner));
//! assert_eq!(PieceKind::ALL.len(), PIECE_COUNT);
//! ```

use serde::{Deserialize, Serialize};

/// Default grid width in cells (5 columns)
pub const GRID_COLS: usize = 5;

/// Default grid height in cells (5 rows)
pub const GRID_ROWS: usize = 5;

/// Number of entries in the piece catalog
pub const PIECE_COUNT: usize = 15;

/// Side length of every piece's occupancy matrix
pub const PIECE_SIZE: usize = 3;

/// Lives at the start of a game
pub const START_LIVES: u32 = 3;

/// Multiplier at the start of a game and after any reset
pub const BASE_MULTIPLIER: u32 = 1;

/// Points per cleared block, per cleared line, before the multiplier
pub const POINTS_PER_BLOCK: u32 = 10;

/// Score required per level
pub const POINTS_PER_LEVEL: u32 = 1000;

/// Life-loss timer delay at level 0
pub const BASE_DELAY_MS: u64 = 12_000;

/// Timer reduction per level
pub const DELAY_STEP_MS: u64 = 500;

/// Minimum life-loss timer delay
pub const MIN_DELAY_MS: u64 = 2_500;

/// Number of `PIECE` requests issued after a multiplayer game starts
pub const PREFETCH_REQUESTS: usize = 5;

/// Cadence of the start-up `PIECE` requests
pub const PREFETCH_INTERVAL_MS: u64 = 1_000;

/// A cell on the grid
///
/// - `0`: Empty cell
/// - `1..=15`: Cell filled with the color id of a catalog piece
pub type Cell = u8;

/// Value of an empty cell
pub const EMPTY: Cell = 0;

/// Largest color id a cell may hold
pub const MAX_CELL: Cell = PIECE_COUNT as Cell;

/// Value reported for reads outside the grid.
///
/// Non-zero, so any placement check touching it fails.
pub const OUT_OF_BOUNDS: Cell = Cell::MAX;

/// A grid coordinate: `x` is the column, `y` the row.
///
/// Ordering is row-major (`y` first), which is the order cleared blocks are
/// reported in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub x: usize,
    pub y: usize,
}

impl Coord {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

impl Ord for Coord {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.y, self.x).cmp(&(other.y, other.x))
    }
}

impl PartialOrd for Coord {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// The fifteen catalog piece kinds, in catalog order
///
/// The catalog index is the wire id used by the `PIECE <id>` protocol message,
/// and `index + 1` is the color id stamped onto the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PieceKind {
    Line,
    C,
    Plus,
    Dot,
    Square,
    L,
    J,
    S,
    Z,
    T,
    X,
    Corner,
    InverseCorner,
    Diagonal,
    Double,
}

impl PieceKind {
    /// Every kind, in catalog order
    pub const ALL: [PieceKind; PIECE_COUNT] = [
        PieceKind::Line,
        PieceKind::C,
        PieceKind::Plus,
        PieceKind::Dot,
        PieceKind::Square,
        PieceKind::L,
        PieceKind::J,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::T,
        PieceKind::X,
        PieceKind::Corner,
        PieceKind::InverseCorner,
        PieceKind::Diagonal,
        PieceKind::Double,
    ];

    /// Look up a kind by catalog index (`0..=14`)
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Catalog index of this kind
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Color id written to the grid for this kind (`index + 1`)
    pub fn color(&self) -> Cell {
        self.index() as Cell + 1
    }

    /// Parse piece kind from its name (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use gridlock_types::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_str("plus"), Some(PieceKind::Plus));
    /// assert_eq!(PieceKind::from_str("Square"), Some(PieceKind::Square));
    /// assert_eq!(PieceKind::from_str("tetromino"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        let lower = s.to_lowercase();
        Self::ALL.into_iter().find(|kind| kind.as_str() == lower)
    }

    /// Convert to lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            PieceKind::Line => "line",
            PieceKind::C => "c",
            PieceKind::Plus => "plus",
            PieceKind::Dot => "dot",
            PieceKind::Square => "square",
            PieceKind::L => "l",
            PieceKind::J => "j",
            PieceKind::S => "s",
            PieceKind::Z => "z",
            PieceKind::T => "t",
            PieceKind::X => "x",
            PieceKind::Corner => "corner",
            PieceKind::InverseCorner => "inverse_corner",
            PieceKind::Diagonal => "diagonal",
            PieceKind::Double => "double",
        }
    }
}

/// Lifecycle of a single game instance
///
/// `Ready -> Running -> GameOver`; there is no way back out of `GameOver`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Ready,
    Running,
    GameOver,
}
