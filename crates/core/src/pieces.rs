//! Pieces module - the fifteen-piece catalog and its rotation transform
//!
//! Every piece is a 3x3 occupancy matrix indexed `blocks[x][y]` (column first,
//! matching grid coordinates). Occupied entries carry the piece's color id.
//! Rotation is a plain 90° clockwise matrix turn; there are no kicks.

use arrayvec::ArrayVec;
use serde::Serialize;

use crate::types::{Cell, PieceKind, EMPTY, PIECE_COUNT, PIECE_SIZE};

/// Occupancy matrix of a piece, indexed `[x][y]`
pub type Blocks = [[Cell; PIECE_SIZE]; PIECE_SIZE];

/// Offset of an occupied cell relative to the piece's top-left corner
pub type CellOffset = (i32, i32);

/// Occupied offsets of a piece (at most nine)
pub type PieceCells = ArrayVec<CellOffset, { PIECE_SIZE * PIECE_SIZE }>;

/// Catalog patterns in catalog order, each written as three columns (x = 0..2)
/// of three rows (y = 0..2). `1` marks an occupied cell.
const CATALOG: [Blocks; PIECE_COUNT] = [
    // Line
    [[0, 0, 0], [1, 1, 1], [0, 0, 0]],
    // C
    [[0, 0, 0], [1, 1, 1], [1, 0, 1]],
    // Plus
    [[0, 1, 0], [1, 1, 1], [0, 1, 0]],
    // Dot
    [[0, 0, 0], [0, 1, 0], [0, 0, 0]],
    // Square
    [[1, 1, 0], [1, 1, 0], [0, 0, 0]],
    // L
    [[0, 0, 0], [1, 1, 1], [0, 0, 1]],
    // J
    [[0, 0, 1], [1, 1, 1], [0, 0, 0]],
    // S
    [[0, 0, 0], [1, 1, 0], [0, 1, 1]],
    // Z
    [[0, 1, 1], [1, 1, 0], [0, 0, 0]],
    // T
    [[1, 0, 0], [1, 1, 0], [1, 0, 0]],
    // X
    [[1, 0, 1], [0, 1, 0], [1, 0, 1]],
    // Corner
    [[0, 0, 0], [1, 1, 0], [0, 1, 0]],
    // Inverse corner
    [[1, 1, 0], [0, 1, 0], [0, 0, 0]],
    // Diagonal
    [[1, 0, 0], [0, 1, 0], [0, 0, 1]],
    // Double
    [[0, 1, 0], [0, 1, 0], [0, 0, 0]],
];

/// A catalog piece with its current orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Piece {
    kind: PieceKind,
    /// Quarter turns clockwise applied since creation (0..=3)
    rotation: u8,
    blocks: Blocks,
}

impl Piece {
    /// Create a piece of the given kind in its catalog orientation
    pub fn new(kind: PieceKind) -> Self {
        let color = kind.color();
        let mut blocks = CATALOG[kind.index()];
        for column in blocks.iter_mut() {
            for cell in column.iter_mut() {
                if *cell != EMPTY {
                    *cell = color;
                }
            }
        }
        Self {
            kind,
            rotation: 0,
            blocks,
        }
    }

    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    /// Color id stamped onto the grid by this piece
    pub fn color(&self) -> Cell {
        self.kind.color()
    }

    /// Quarter turns clockwise from the catalog orientation (0..=3)
    pub fn rotation(&self) -> u8 {
        self.rotation
    }

    pub fn blocks(&self) -> &Blocks {
        &self.blocks
    }

    /// Value at `(x, y)` of the occupancy matrix, `EMPTY` outside it
    pub fn block(&self, x: usize, y: usize) -> Cell {
        self.blocks
            .get(x)
            .and_then(|column| column.get(y))
            .copied()
            .unwrap_or(EMPTY)
    }

    /// Occupied offsets, column by column
    pub fn cells(&self) -> PieceCells {
        let mut cells = PieceCells::new();
        for (x, column) in self.blocks.iter().enumerate() {
            for (y, &cell) in column.iter().enumerate() {
                if cell != EMPTY {
                    cells.push((x as i32, y as i32));
                }
            }
        }
        cells
    }

    /// Number of occupied cells
    pub fn block_count(&self) -> usize {
        self.blocks
            .iter()
            .flatten()
            .filter(|&&cell| cell != EMPTY)
            .count()
    }

    /// Return this piece turned clockwise `times` quarter turns.
    ///
    /// Negative counts turn anticlockwise; `rotated(4)` is the identity.
    pub fn rotated(&self, times: i32) -> Self {
        let turns = times.rem_euclid(4) as u8;
        let mut piece = *self;
        for _ in 0..turns {
            piece.blocks = rotate_cw(&piece.blocks);
        }
        piece.rotation = (self.rotation + turns) % 4;
        piece
    }
}

/// Create the catalog piece with wire id `id` (`0..=14`)
pub fn create(id: usize) -> Option<Piece> {
    PieceKind::from_index(id).map(Piece::new)
}

/// Turn `piece` clockwise `times` quarter turns
pub fn rotate(piece: &Piece, times: i32) -> Piece {
    piece.rotated(times)
}

/// One clockwise quarter turn: `(x, y) -> (size - 1 - y, x)` with `y` pointing down
fn rotate_cw(blocks: &Blocks) -> Blocks {
    let mut out = [[EMPTY; PIECE_SIZE]; PIECE_SIZE];
    for (x, column) in blocks.iter().enumerate() {
        for (y, &cell) in column.iter().enumerate() {
            out[PIECE_SIZE - 1 - y][x] = cell;
        }
    }
    out
}
