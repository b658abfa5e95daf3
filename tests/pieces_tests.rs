//! Piece catalog tests

use gridlock::core::pieces::{create, rotate};
use gridlock::core::Piece;
use gridlock::types::{PieceKind, PIECE_COUNT};

#[test]
fn test_catalog_ids_and_colors() {
    for id in 0..PIECE_COUNT {
        let piece = create(id).unwrap();
        assert_eq!(piece.kind().index(), id);
        assert_eq!(piece.color() as usize, id + 1);
        assert!(piece.block_count() >= 1);
    }
    assert!(create(PIECE_COUNT).is_none());
}

#[test]
fn test_known_block_counts() {
    let counts = [
        (PieceKind::Line, 3),
        (PieceKind::C, 5),
        (PieceKind::Plus, 5),
        (PieceKind::Dot, 1),
        (PieceKind::Square, 4),
        (PieceKind::X, 5),
        (PieceKind::Diagonal, 3),
        (PieceKind::Double, 2),
    ];
    for (kind, count) in counts {
        assert_eq!(Piece::new(kind).block_count(), count, "{:?}", kind);
    }
}

#[test]
fn test_rotation_keeps_blocks_and_cycles() {
    for kind in PieceKind::ALL {
        let piece = Piece::new(kind);
        for turns in 0..4 {
            assert_eq!(rotate(&piece, turns).block_count(), piece.block_count());
        }
        assert_eq!(rotate(&piece, 4), piece);
        assert_eq!(rotate(&piece, -1), rotate(&piece, 3));
    }
}

#[test]
fn test_line_rotates_to_horizontal() {
    let line = Piece::new(PieceKind::Line);
    let turned = line.rotated(1);
    let color = line.color();
    assert_eq!(turned.rotation(), 1);
    assert!((0..3).all(|x| turned.block(x, 1) == color));
    assert_eq!(turned.block(1, 0), 0);
}
