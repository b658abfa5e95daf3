use serde::Serialize;

use crate::pieces::Piece;
use crate::types::{Cell, Phase, PieceKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PieceSnapshot {
    pub kind: PieceKind,
    pub rotation: u8,
}

impl From<Piece> for PieceSnapshot {
    fn from(value: Piece) -> Self {
        Self {
            kind: value.kind(),
            rotation: value.rotation(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct GameSnapshot {
    pub cols: usize,
    pub rows: usize,
    /// Row-major cell values
    pub cells: Vec<Cell>,
    pub current: Option<PieceSnapshot>,
    pub following: Option<PieceSnapshot>,
    pub phase: Phase,
    pub score: u32,
    pub level: u32,
    pub lives: u32,
    pub multiplier: u32,
}

impl GameSnapshot {
    pub fn game_over(&self) -> bool {
        self.phase == Phase::GameOver
    }

    /// Cell at `(x, y)`, `None` outside the grid
    pub fn cell(&self, x: usize, y: usize) -> Option<Cell> {
        if x >= self.cols || y >= self.rows {
            return None;
        }
        self.cells.get(y * self.cols + x).copied()
    }
}
