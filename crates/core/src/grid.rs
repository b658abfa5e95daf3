//! Grid module - manages the game board
//!
//! The grid is a `cols x rows` board where each cell is empty (`0`) or holds
//! the color id of the piece that filled it. Uses a flat vector in row-major
//! order (`y * cols + x`); dimensions never change after construction.
//!
//! Placement is a two-step contract: callers check [`Grid::can_place`] with the
//! top-left anchor and then call [`Grid::place`] with the clicked (centre)
//! cell. `place` re-checks and silently does nothing when the check fails, so
//! its outcome must never be used to decide success.

use std::collections::BTreeSet;

use crate::pieces::Piece;
use crate::types::{Cell, Coord, EMPTY, MAX_CELL, OUT_OF_BOUNDS};

/// Rejected grid construction
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("expected {expected} cell values, got {actual}")]
    WrongCellCount { expected: usize, actual: usize },
    #[error("cell value {0} is outside 0..=15")]
    InvalidCell(u32),
}

/// Full lines found by a scan, with the union of their cells
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineScan {
    /// Indices of full rows
    pub rows: Vec<usize>,
    /// Indices of full columns
    pub columns: Vec<usize>,
    /// Every cell in a full row or column, each once, row-major
    pub blocks: BTreeSet<Coord>,
}

impl LineScan {
    /// Full rows plus full columns; a cell on both still counts for each line
    pub fn lines(&self) -> usize {
        self.rows.len() + self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines() == 0
    }
}

/// The game grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    cols: usize,
    rows: usize,
    /// Flat array of cells, row-major order (y * cols + x)
    cells: Vec<Cell>,
}

impl Grid {
    /// Create a new empty grid
    pub fn new(cols: usize, rows: usize) -> Self {
        Self {
            cols,
            rows,
            cells: vec![EMPTY; cols * rows],
        }
    }

    /// Build a grid from row-major cell values
    pub fn from_values<I>(cols: usize, rows: usize, values: I) -> Result<Self, GridError>
    where
        I: IntoIterator<Item = u32>,
    {
        let mut cells = Vec::with_capacity(cols * rows);
        for value in values {
            if value > MAX_CELL as u32 {
                return Err(GridError::InvalidCell(value));
            }
            cells.push(value as Cell);
        }
        if cells.len() != cols * rows {
            return Err(GridError::WrongCellCount {
                expected: cols * rows,
                actual: cells.len(),
            });
        }
        Ok(Self { cols, rows, cells })
    }

    /// Calculate flat index from (x, y) coordinates
    #[inline(always)]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as usize >= self.cols || y as usize >= self.rows {
            return None;
        }
        Some(y as usize * self.cols + x as usize)
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Get cell at position (x, y)
    /// Returns None if out of bounds
    pub fn get(&self, x: i32, y: i32) -> Option<Cell> {
        self.index(x, y).map(|idx| self.cells[idx])
    }

    /// Get cell at position (x, y), or `OUT_OF_BOUNDS` outside the grid
    pub fn cell(&self, x: i32, y: i32) -> Cell {
        self.get(x, y).unwrap_or(OUT_OF_BOUNDS)
    }

    /// Set cell at position (x, y)
    /// Returns false if out of bounds or the value is not a color id
    pub fn set(&mut self, x: i32, y: i32, value: Cell) -> bool {
        if value > MAX_CELL {
            return false;
        }
        match self.index(x, y) {
            Some(idx) => {
                self.cells[idx] = value;
                true
            }
            None => false,
        }
    }

    /// Check whether `piece` fits with its top-left corner at `(x, y)`
    ///
    /// Every occupied piece cell must land on an empty in-bounds cell.
    /// Anchors so far out that a cell coordinate overflows never fit.
    pub fn can_place(&self, piece: &Piece, x: i32, y: i32) -> bool {
        piece.cells().iter().all(|&(dx, dy)| {
            match (x.checked_add(dx), y.checked_add(dy)) {
                (Some(cx), Some(cy)) => self.cell(cx, cy) == EMPTY,
                _ => false,
            }
        })
    }

    /// Stamp `piece` centred on `(x, y)`.
    ///
    /// The anchor is shifted by `(-1, -1)` first. Nothing is written unless
    /// `can_place(piece, x - 1, y - 1)` holds.
    pub fn place(&mut self, piece: &Piece, x: i32, y: i32) {
        let (x, y) = (x.saturating_sub(1), y.saturating_sub(1));
        if !self.can_place(piece, x, y) {
            return;
        }
        let color = piece.color();
        for &(dx, dy) in piece.cells().iter() {
            self.set(x + dx, y + dy, color);
        }
    }

    /// Empty every listed cell; coordinates outside the grid are skipped
    pub fn clear<'a, I>(&mut self, coords: I)
    where
        I: IntoIterator<Item = &'a Coord>,
    {
        for coord in coords {
            if coord.x < self.cols && coord.y < self.rows {
                self.cells[coord.y * self.cols + coord.x] = EMPTY;
            }
        }
    }

    /// Check if a row is completely filled
    pub fn is_row_full(&self, y: usize) -> bool {
        if y >= self.rows {
            return false;
        }
        let start = y * self.cols;
        self.cells[start..start + self.cols]
            .iter()
            .all(|&cell| cell != EMPTY)
    }

    /// Check if a column is completely filled
    pub fn is_column_full(&self, x: usize) -> bool {
        if x >= self.cols {
            return false;
        }
        (0..self.rows).all(|y| self.cells[y * self.cols + x] != EMPTY)
    }

    pub fn full_rows(&self) -> Vec<usize> {
        (0..self.rows).filter(|&y| self.is_row_full(y)).collect()
    }

    pub fn full_columns(&self) -> Vec<usize> {
        (0..self.cols).filter(|&x| self.is_column_full(x)).collect()
    }

    /// Find full rows and columns independently and union their cells
    pub fn scan_full_lines(&self) -> LineScan {
        let rows = self.full_rows();
        let columns = self.full_columns();

        let mut blocks = BTreeSet::new();
        for &y in &rows {
            blocks.extend((0..self.cols).map(|x| Coord::new(x, y)));
        }
        for &x in &columns {
            blocks.extend((0..self.rows).map(|y| Coord::new(x, y)));
        }

        LineScan {
            rows,
            columns,
            blocks,
        }
    }

    /// Number of occupied cells
    pub fn filled_count(&self) -> usize {
        self.cells.iter().filter(|&&cell| cell != EMPTY).count()
    }

    /// Cell values in row-major order
    pub fn values(&self) -> impl Iterator<Item = Cell> + '_ {
        self.cells.iter().copied()
    }

    /// Get a reference to the internal cells array
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Clear the entire grid
    pub fn reset(&mut self) {
        self.cells.fill(EMPTY);
    }
}
