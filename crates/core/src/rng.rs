//! RNG module - where new pieces come from
//!
//! A game never decides on its own where pieces come from; it asks a
//! [`PieceSource`]. Local games use [`RandomSource`], a uniform draw over the
//! fifteen catalog kinds driven by a seeded LCG so tests can replay a game.
//! Networked games plug in a source fed by the server instead.

use crate::pieces::Piece;
use crate::types::{PieceKind, PIECE_COUNT};

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce all zeros
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u32
    pub fn next_u32(&mut self) -> u32 {
        // LCG formula: (a * state + c) mod m
        // Using Numerical Recipes constants: a=1664525, c=1013904223, m=2^32
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Generate random value in range [0, max)
    pub fn next_range(&mut self, max: u32) -> u32 {
        (self.next_u32() >> 16) % max.max(1)
    }

    /// Current internal state (for replaying a sequence)
    pub fn state(&self) -> u32 {
        self.state
    }
}

/// Supplier of replacement pieces for a game's lookahead queue
pub trait PieceSource {
    /// Produce the next piece, or `None` if none is available yet
    fn draw(&mut self) -> Option<Piece>;

    /// Whether `Game::start` should fill the queue by drawing twice.
    ///
    /// Sources that receive pieces asynchronously return `false` and fill the
    /// queue through `Game::offer_piece` instead.
    fn seeds_on_start(&self) -> bool {
        true
    }
}

/// Uniformly random catalog pieces
#[derive(Debug, Clone)]
pub struct RandomSource {
    rng: SimpleRng,
}

impl RandomSource {
    pub fn new(seed: u32) -> Self {
        Self {
            rng: SimpleRng::new(seed),
        }
    }

    /// Draw the next kind without building a piece
    pub fn draw_kind(&mut self) -> PieceKind {
        let index = self.rng.next_range(PIECE_COUNT as u32) as usize;
        // `next_range` stays below PIECE_COUNT
        PieceKind::ALL[index]
    }

    /// Get the current RNG state (for restarting with the same sequence)
    pub fn seed(&self) -> u32 {
        self.rng.state()
    }
}

impl Default for RandomSource {
    fn default() -> Self {
        Self::new(1)
    }
}

impl PieceSource for RandomSource {
    fn draw(&mut self) -> Option<Piece> {
        Some(Piece::new(self.draw_kind()))
    }
}

/// Replays a fixed list of kinds, then runs dry
///
/// Useful for scripted games and tests.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    kinds: std::collections::VecDeque<PieceKind>,
}

impl ScriptedSource {
    pub fn new<I: IntoIterator<Item = PieceKind>>(kinds: I) -> Self {
        Self {
            kinds: kinds.into_iter().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.kinds.len()
    }
}

impl PieceSource for ScriptedSource {
    fn draw(&mut self) -> Option<Piece> {
        self.kinds.pop_front().map(Piece::new)
    }
}
