//! Filled-row detection and collapse

use crate::board::{Board, BOARD_HEIGHT, BOARD_WIDTH};

/// Rows found full in one line-clear event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineMask {
    rows: [bool; BOARD_HEIGHT],
    count: u32,
}

impl Default for LineMask {
    fn default() -> Self {
        Self {
            rows: [false; BOARD_HEIGHT],
            count: 0,
        }
    }
}

impl LineMask {
    /// Number of marked rows
    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn contains(&self, row: usize) -> bool {
        self.rows[row]
    }
}

/// Scan every row top to bottom and mark the filled ones
pub fn find_filled_rows(board: &Board) -> LineMask {
    let mut mask = LineMask::default();
    for row in 0..BOARD_HEIGHT {
        if board.row_filled(row) {
            mask.rows[row] = true;
            mask.count += 1;
        }
    }
    mask
}

/// Remove the marked rows and let the rest fall.
///
/// Walks from the bottom with a write row and a read row; surviving rows keep
/// their order and rows with nothing left above them come out empty.
pub fn collapse(board: &mut Board, mask: &LineMask) {
    let mut src = BOARD_HEIGHT as isize - 1;
    for dst in (0..BOARD_HEIGHT).rev() {
        while src >= 0 && mask.rows[src as usize] {
            src -= 1;
        }

        if src < 0 {
            board.set_row(dst, [0; BOARD_WIDTH]);
        } else {
            if src as usize != dst {
                board.set_row(dst, board.row(src as usize));
            }
            src -= 1;
        }
    }
}
