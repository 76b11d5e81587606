//! Active falling piece logic
//!
//! Moves never touch the piece in place: each one returns a candidate copy
//! that the caller validates against the board and then commits or drops.

use crate::board::{Board, BOARD_HEIGHT, BOARD_WIDTH};
use crate::tetromino::{Rotation, TetrominoType};

/// The falling piece
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceState {
    /// The type of tetromino
    pub piece_type: TetrominoType,
    /// Board row of the shape grid's top-left corner
    pub row: i32,
    /// Board column of the shape grid's top-left corner
    pub col: i32,
    /// Current rotation state
    pub rotation: Rotation,
}

impl PieceState {
    /// A piece at the spawn position: top row, centre column, unrotated
    pub fn spawn(piece_type: TetrominoType) -> Self {
        Self {
            piece_type,
            row: 0,
            col: BOARD_WIDTH as i32 / 2,
            rotation: Rotation::North,
        }
    }

    /// Board positions and color of every occupied cell
    pub fn blocks(&self) -> impl Iterator<Item = (i32, i32, u8)> + '_ {
        self.piece_type
            .cells(self.rotation)
            .map(move |(r, c, value)| (self.row + r as i32, self.col + c as i32, value))
    }

    pub fn shifted(&self, cols: i32) -> Self {
        Self {
            col: self.col + cols,
            ..*self
        }
    }

    pub fn lowered(&self) -> Self {
        Self {
            row: self.row + 1,
            ..*self
        }
    }

    pub fn rotated_cw(&self) -> Self {
        Self {
            rotation: self.rotation.cw(),
            ..*self
        }
    }

    pub fn rotated_ccw(&self) -> Self {
        Self {
            rotation: self.rotation.ccw(),
            ..*self
        }
    }

    /// Check that every occupied cell lands inside the board on an empty cell.
    ///
    /// Cells above the top row are rejected like any other out-of-bounds cell.
    pub fn is_valid(&self, board: &Board) -> bool {
        self.blocks().all(|(row, col, _)| {
            row >= 0
                && row < BOARD_HEIGHT as i32
                && col >= 0
                && col < BOARD_WIDTH as i32
                && board.get(row as usize, col as usize) == 0
        })
    }

    /// Stamp the piece into the board. Every cell must be in bounds.
    pub fn merge_into(&self, board: &mut Board) {
        for (row, col, value) in self.blocks() {
            board.set(row as usize, col as usize, value);
        }
    }

    /// Where the piece would come to rest if dropped straight down
    pub fn landing(&self, board: &Board) -> Self {
        let mut landed = *self;
        loop {
            let next = landed.lowered();
            if !next.is_valid(board) {
                return landed;
            }
            landed = next;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_position() {
        let piece = PieceState::spawn(TetrominoType::T);
        assert_eq!(piece.row, 0);
        assert_eq!(piece.col, 5);
        assert_eq!(piece.rotation, Rotation::North);
        assert!(piece.is_valid(&Board::new()));
    }

    #[test]
    fn test_blocks_are_offset_by_position() {
        let piece = PieceState::spawn(TetrominoType::I);
        let blocks: Vec<_> = piece.blocks().collect();
        assert_eq!(blocks, vec![(1, 5, 1), (1, 6, 1), (1, 7, 1), (1, 8, 1)]);
    }

    #[test]
    fn test_moves_return_copies() {
        let piece = PieceState::spawn(TetrominoType::S);
        let moved = piece.shifted(-2).lowered().rotated_cw();
        assert_eq!((moved.row, moved.col, moved.rotation), (1, 3, Rotation::East));
        // Source piece unchanged
        assert_eq!((piece.row, piece.col), (0, 5));
        assert_eq!(piece.rotated_cw().rotated_ccw(), piece);
    }

    #[test]
    fn test_walls_reject() {
        let board = Board::new();
        let piece = PieceState::spawn(TetrominoType::O);
        // O occupies the grid's columns 0 and 1
        assert!(piece.shifted(-5).is_valid(&board));
        assert!(!piece.shifted(-6).is_valid(&board));
        assert!(piece.shifted(3).is_valid(&board));
        assert!(!piece.shifted(4).is_valid(&board));
    }

    #[test]
    fn test_empty_grid_columns_may_hang_outside() {
        let board = Board::new();
        // Vertical I sits in grid column 2 when turned clockwise
        let piece = PieceState {
            piece_type: TetrominoType::I,
            row: 0,
            col: -2,
            rotation: Rotation::East,
        };
        assert!(piece.is_valid(&board));
        assert!(!piece.shifted(-1).is_valid(&board));
    }

    #[test]
    fn test_top_and_floor_reject() {
        let board = Board::new();
        let piece = PieceState {
            row: -1,
            ..PieceState::spawn(TetrominoType::O)
        };
        assert!(!piece.is_valid(&board));

        let floor = PieceState {
            row: BOARD_HEIGHT as i32 - 2,
            ..PieceState::spawn(TetrominoType::O)
        };
        assert!(floor.is_valid(&board));
        assert!(!floor.lowered().is_valid(&board));
    }

    #[test]
    fn test_occupied_cell_rejects() {
        let mut board = Board::new();
        let piece = PieceState::spawn(TetrominoType::O);
        board.set(1, 6, 4);
        assert!(!piece.is_valid(&board));
        // Cells outside the piece do not matter
        board.set(1, 6, 0);
        board.set(1, 7, 4);
        assert!(piece.is_valid(&board));
    }

    #[test]
    fn test_valid_iff_every_cell_free() {
        let mut board = Board::new();
        board.set(10, 3, 1);
        for piece_type in TetrominoType::all() {
            for row in -2..BOARD_HEIGHT as i32 + 2 {
                for col in -3..BOARD_WIDTH as i32 + 2 {
                    let piece = PieceState {
                        piece_type,
                        row,
                        col,
                        rotation: Rotation::West,
                    };
                    let expected = piece.blocks().all(|(r, c, _)| {
                        (0..BOARD_HEIGHT as i32).contains(&r)
                            && (0..BOARD_WIDTH as i32).contains(&c)
                            && !(r == 10 && c == 3)
                    });
                    assert_eq!(piece.is_valid(&board), expected);
                }
            }
        }
    }

    #[test]
    fn test_merge_writes_color() {
        let mut board = Board::new();
        let piece = PieceState::spawn(TetrominoType::L).landing(&board);
        piece.merge_into(&mut board);
        for (row, col, _) in piece.blocks() {
            assert_eq!(board.get(row as usize, col as usize), TetrominoType::L.color_id());
        }
        assert!(!piece.is_valid(&board));
    }

    #[test]
    fn test_landing_rests_on_floor() {
        let board = Board::new();
        let piece = PieceState::spawn(TetrominoType::T);
        let landed = piece.landing(&board);
        // T points down, bottom cell on grid row 2
        assert_eq!(landed.row, BOARD_HEIGHT as i32 - 3);
        assert!(landed.is_valid(&board));
        assert!(!landed.lowered().is_valid(&board));
    }
}
