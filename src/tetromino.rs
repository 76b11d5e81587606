//! Tetromino definitions and shapes
//!
//! Each shape is stored once as a square grid of color ids. The other three
//! orientations are computed by remapping indices, never stored.

use ratatui::style::Color;

/// A base shape: `side * side` cells, row-major, 0 = empty
#[derive(Debug)]
struct Shape {
    side: usize,
    cells: &'static [u8],
}

#[rustfmt::skip]
const SHAPES: [Shape; 7] = [
    Shape { side: 4, cells: &[
        0, 0, 0, 0,
        1, 1, 1, 1,
        0, 0, 0, 0,
        0, 0, 0, 0,
    ] },
    Shape { side: 2, cells: &[
        2, 2,
        2, 2,
    ] },
    Shape { side: 3, cells: &[
        0, 0, 0,
        3, 3, 3,
        0, 3, 0,
    ] },
    Shape { side: 3, cells: &[
        0, 4, 4,
        4, 4, 0,
        0, 0, 0,
    ] },
    Shape { side: 3, cells: &[
        5, 5, 0,
        0, 5, 5,
        0, 0, 0,
    ] },
    Shape { side: 3, cells: &[
        6, 0, 0,
        6, 6, 6,
        0, 0, 0,
    ] },
    Shape { side: 3, cells: &[
        0, 0, 7,
        7, 7, 7,
        0, 0, 0,
    ] },
];

/// The 7 tetromino types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TetrominoType {
    I, // Cyan - long bar
    O, // Yellow - square
    T, // Purple - T-shape
    S, // Green - S-shape
    Z, // Red - Z-shape
    J, // Blue - J-shape
    L, // Orange - L-shape
}

impl TetrominoType {
    /// All tetromino types, in table order
    pub fn all() -> [TetrominoType; 7] {
        [
            TetrominoType::I,
            TetrominoType::O,
            TetrominoType::T,
            TetrominoType::S,
            TetrominoType::Z,
            TetrominoType::J,
            TetrominoType::L,
        ]
    }

    /// Look up a type by its table index (0-6)
    pub fn from_index(index: usize) -> Option<TetrominoType> {
        Self::all().get(index).copied()
    }

    pub fn index(&self) -> usize {
        *self as usize
    }

    /// The value this piece writes into the board (1-7)
    pub fn color_id(&self) -> u8 {
        self.index() as u8 + 1
    }

    /// Side length of the square bounding grid
    pub fn side(&self) -> usize {
        SHAPES[self.index()].side
    }

    /// Cell value at (row, col) of the grid turned to `rotation`.
    ///
    /// `row` and `col` must be below `side()`.
    pub fn cell_at(&self, row: usize, col: usize, rotation: Rotation) -> u8 {
        let shape = &SHAPES[self.index()];
        let side = shape.side;
        let index = match rotation {
            Rotation::North => row * side + col,
            Rotation::East => (side - col - 1) * side + row,
            Rotation::South => (side - row - 1) * side + (side - col - 1),
            Rotation::West => col * side + (side - row - 1),
        };
        shape.cells[index]
    }

    /// Occupied (row, col, value) cells of the grid at `rotation`
    pub fn cells(&self, rotation: Rotation) -> impl Iterator<Item = (usize, usize, u8)> + '_ {
        let side = self.side();
        (0..side)
            .flat_map(move |row| (0..side).map(move |col| (row, col)))
            .filter_map(move |(row, col)| {
                let value = self.cell_at(row, col, rotation);
                (value != 0).then_some((row, col, value))
            })
    }

    /// Terminal color for this tetromino
    pub fn color(&self) -> Color {
        match self {
            TetrominoType::I => Color::Cyan,
            TetrominoType::O => Color::Yellow,
            TetrominoType::T => Color::Magenta,
            TetrominoType::S => Color::Green,
            TetrominoType::Z => Color::Red,
            TetrominoType::J => Color::Blue,
            TetrominoType::L => Color::Rgb(255, 165, 0), // Orange
        }
    }
}

/// Terminal color for a board cell value, None for empty
pub fn cell_color(value: u8) -> Option<Color> {
    match value {
        0 => None,
        v => TetrominoType::from_index(v as usize - 1).map(|t| t.color()),
    }
}

/// Rotation states, clockwise from the spawn orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rotation {
    #[default]
    North, // Spawn state
    East,  // Clockwise from North
    South, // 180 from North
    West,  // Counter-clockwise from North
}

impl Rotation {
    /// Rotate clockwise: North → East → South → West → North
    pub fn cw(&self) -> Rotation {
        match self {
            Rotation::North => Rotation::East,
            Rotation::East => Rotation::South,
            Rotation::South => Rotation::West,
            Rotation::West => Rotation::North,
        }
    }

    /// Rotate counter-clockwise: North → West → South → East → North
    pub fn ccw(&self) -> Rotation {
        match self {
            Rotation::North => Rotation::West,
            Rotation::West => Rotation::South,
            Rotation::South => Rotation::East,
            Rotation::East => Rotation::North,
        }
    }

    #[cfg(test)]
    pub fn index(&self) -> usize {
        *self as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROTATIONS: [Rotation; 4] = [
        Rotation::North,
        Rotation::East,
        Rotation::South,
        Rotation::West,
    ];

    fn grid(piece: TetrominoType, rotation: Rotation) -> Vec<u8> {
        let side = piece.side();
        (0..side * side)
            .map(|i| piece.cell_at(i / side, i % side, rotation))
            .collect()
    }

    /// One quarter turn of an arbitrary square grid
    fn quarter_turn(cells: &[u8], side: usize) -> Vec<u8> {
        (0..side * side)
            .map(|i| {
                let (row, col) = (i / side, i % side);
                cells[(side - col - 1) * side + row]
            })
            .collect()
    }

    #[test]
    fn test_every_shape_has_four_cells() {
        for piece in TetrominoType::all() {
            for rotation in ROTATIONS {
                assert_eq!(piece.cells(rotation).count(), 4, "{:?} {:?}", piece, rotation);
            }
        }
    }

    #[test]
    fn test_cells_carry_color_id() {
        for piece in TetrominoType::all() {
            assert!(piece.cells(Rotation::East).all(|(_, _, v)| v == piece.color_id()));
        }
    }

    #[test]
    fn test_each_rotation_is_a_quarter_turn_of_the_previous() {
        for piece in TetrominoType::all() {
            let side = piece.side();
            let mut turned = grid(piece, Rotation::North);
            for rotation in ROTATIONS.iter().skip(1) {
                turned = quarter_turn(&turned, side);
                assert_eq!(turned, grid(piece, *rotation), "{:?} {:?}", piece, rotation);
            }
            // Fourth turn comes back to the base grid
            assert_eq!(quarter_turn(&turned, side), grid(piece, Rotation::North));
        }
    }

    #[test]
    fn test_rotation_cycles() {
        for rotation in ROTATIONS {
            assert_eq!(rotation.cw().cw().cw().cw(), rotation);
            assert_eq!(rotation.cw().ccw(), rotation);
            assert_eq!(rotation.cw().index(), (rotation.index() + 1) % 4);
            assert_eq!(rotation.ccw().index(), (rotation.index() + 3) % 4);
        }
    }

    #[test]
    fn test_t_piece_points_down_at_spawn() {
        let t = TetrominoType::T;
        assert_eq!(t.cell_at(2, 1, Rotation::North), 3);
        assert_eq!(t.cell_at(0, 1, Rotation::North), 0);
        // Half turn points it up
        assert_eq!(t.cell_at(0, 1, Rotation::South), 3);
    }

    #[test]
    fn test_index_round_trip_and_colors() {
        for piece in TetrominoType::all() {
            assert_eq!(TetrominoType::from_index(piece.index()), Some(piece));
            assert_eq!(cell_color(piece.color_id()), Some(piece.color()));
        }
        assert_eq!(TetrominoType::from_index(7), None);
        assert_eq!(cell_color(0), None);
    }
}
