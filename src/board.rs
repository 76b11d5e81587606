//! Game board representation

/// Board dimensions
pub const BOARD_WIDTH: usize = 10;
pub const BOARD_HEIGHT: usize = 22;
/// Rows drawn on screen; the first `BOARD_HEIGHT - VISIBLE_HEIGHT` rows are hidden
pub const VISIBLE_HEIGHT: usize = 20;
/// First visible row. Any locked cell here ends the game.
pub const GAME_OVER_ROW: usize = BOARD_HEIGHT - VISIBLE_HEIGHT;

/// The game board
///
/// Cells hold 0 for empty or the color id (1-7) of the piece that locked
/// there. Row 0 is the top.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    cells: [[u8; BOARD_WIDTH]; BOARD_HEIGHT],
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// Create a new empty board
    pub fn new() -> Self {
        Self {
            cells: [[0; BOARD_WIDTH]; BOARD_HEIGHT],
        }
    }

    /// Get the cell at (row, col). The caller keeps the position in bounds.
    pub fn get(&self, row: usize, col: usize) -> u8 {
        self.cells[row][col]
    }

    /// Set the cell at (row, col). The caller keeps the position in bounds.
    pub fn set(&mut self, row: usize, col: usize, value: u8) {
        self.cells[row][col] = value;
    }

    /// Empty every cell
    pub fn clear(&mut self) {
        self.cells = [[0; BOARD_WIDTH]; BOARD_HEIGHT];
    }

    /// Check if every cell of a row is occupied
    pub fn row_filled(&self, row: usize) -> bool {
        self.cells[row].iter().all(|&cell| cell != 0)
    }

    /// Check if no cell of a row is occupied
    pub fn row_empty(&self, row: usize) -> bool {
        self.cells[row].iter().all(|&cell| cell == 0)
    }

    /// Check if the board is completely empty
    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        (0..BOARD_HEIGHT).all(|row| self.row_empty(row))
    }

    /// Whole rows, for copying during line collapse
    pub(crate) fn row(&self, row: usize) -> [u8; BOARD_WIDTH] {
        self.cells[row]
    }

    pub(crate) fn set_row(&mut self, row: usize, values: [u8; BOARD_WIDTH]) {
        self.cells[row] = values;
    }

    /// True when a locked cell reached the first visible row
    pub fn is_topped_out(&self) -> bool {
        !self.row_empty(GAME_OVER_ROW)
    }
}
