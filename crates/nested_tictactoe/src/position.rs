//! Grid positions and two-level coordinates.
//!
//! Every 3×3 grid in the game (the cells of a sub-board and the sub-boards
//! of the meta-board) is addressed by `(col, row)`, with column 0 on the
//! left and row 0 at the bottom:
//!
//! ```text
//! 0,2|1,2|2,2
//! 0,1|1,1|2,1
//! 0,0|1,0|2,0
//! ```

use crate::action::IllegalMove;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// A position on a 3×3 grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::EnumIter)]
pub enum Position {
    /// Top-left (0, 2)
    TopLeft,
    /// Top-center (1, 2)
    TopCenter,
    /// Top-right (2, 2)
    TopRight,
    /// Middle-left (0, 1)
    MiddleLeft,
    /// Center (1, 1)
    Center,
    /// Middle-right (2, 1)
    MiddleRight,
    /// Bottom-left (0, 0)
    BottomLeft,
    /// Bottom-center (1, 0)
    BottomCenter,
    /// Bottom-right (2, 0)
    BottomRight,
}

impl Position {
    /// All 9 positions, top row first.
    pub const ALL: [Position; 9] = [
        Position::TopLeft,
        Position::TopCenter,
        Position::TopRight,
        Position::MiddleLeft,
        Position::Center,
        Position::MiddleRight,
        Position::BottomLeft,
        Position::BottomCenter,
        Position::BottomRight,
    ];

    /// The 8 lines of three: rows, columns, diagonals.
    pub const LINES: [[Position; 3]; 8] = [
        // Rows
        [Position::TopLeft, Position::TopCenter, Position::TopRight],
        [Position::MiddleLeft, Position::Center, Position::MiddleRight],
        [Position::BottomLeft, Position::BottomCenter, Position::BottomRight],
        // Columns
        [Position::TopLeft, Position::MiddleLeft, Position::BottomLeft],
        [Position::TopCenter, Position::Center, Position::BottomCenter],
        [Position::TopRight, Position::MiddleRight, Position::BottomRight],
        // Diagonals
        [Position::TopLeft, Position::Center, Position::BottomRight],
        [Position::TopRight, Position::Center, Position::BottomLeft],
    ];

    /// Get label for this position (for display).
    pub fn label(&self) -> &'static str {
        match self {
            Position::TopLeft => "Top-left",
            Position::TopCenter => "Top-center",
            Position::TopRight => "Top-right",
            Position::MiddleLeft => "Middle-left",
            Position::Center => "Center",
            Position::MiddleRight => "Middle-right",
            Position::BottomLeft => "Bottom-left",
            Position::BottomCenter => "Bottom-center",
            Position::BottomRight => "Bottom-right",
        }
    }

    /// Column of this position (0 = left).
    pub fn col(self) -> u8 {
        (self.to_index() % 3) as u8
    }

    /// Row of this position (0 = bottom).
    pub fn row(self) -> u8 {
        2 - (self.to_index() / 3) as u8
    }

    /// Creates a position from `(col, row)`.
    pub fn from_col_row(col: u8, row: u8) -> Option<Self> {
        if col > 2 || row > 2 {
            return None;
        }
        Self::from_index(usize::from((2 - row) * 3 + col))
    }

    /// Converts position to grid index (0-8, top row first).
    pub fn to_index(self) -> usize {
        match self {
            Position::TopLeft => 0,
            Position::TopCenter => 1,
            Position::TopRight => 2,
            Position::MiddleLeft => 3,
            Position::Center => 4,
            Position::MiddleRight => 5,
            Position::BottomLeft => 6,
            Position::BottomCenter => 7,
            Position::BottomRight => 8,
        }
    }

    /// Creates position from grid index.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.col(), self.row())
    }
}

/// Address of a single cell across both grid levels.
///
/// `board` selects the sub-board on the meta-board, `cell` the cell inside
/// that sub-board. The same value addresses local input and network payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coordinate {
    board: Position,
    cell: Position,
}

impl Coordinate {
    /// Creates a coordinate from typed positions.
    pub fn new(board: Position, cell: Position) -> Self {
        Self { board, cell }
    }

    /// Creates a coordinate from raw `(meta_col, meta_row, cell_col, cell_row)`.
    ///
    /// # Errors
    ///
    /// Returns `IllegalMove::OutOfRange` if any component is outside `0..=2`.
    #[instrument]
    pub fn from_parts(
        meta_col: i32,
        meta_row: i32,
        cell_col: i32,
        cell_row: i32,
    ) -> Result<Self, IllegalMove> {
        let board = grid_position(meta_col, meta_row)?;
        let cell = grid_position(cell_col, cell_row)?;
        Ok(Self { board, cell })
    }

    /// Sub-board holding the cell.
    pub fn board(&self) -> Position {
        self.board
    }

    /// Cell within the sub-board.
    pub fn cell(&self) -> Position {
        self.cell
    }

    /// Returns `(meta_col, meta_row, cell_col, cell_row)`.
    pub fn parts(&self) -> (u8, u8, u8, u8) {
        (
            self.board.col(),
            self.board.row(),
            self.cell.col(),
            self.cell.row(),
        )
    }

    /// Iterates over all 81 coordinates, board by board.
    pub fn all() -> impl Iterator<Item = Coordinate> {
        Position::ALL.into_iter().flat_map(|board| {
            Position::ALL
                .into_iter()
                .map(move |cell| Coordinate::new(board, cell))
        })
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (mc, mr, cc, cr) = self.parts();
        write!(f, "({mc},{mr},{cc},{cr})")
    }
}

fn grid_position(col: i32, row: i32) -> Result<Position, IllegalMove> {
    let component = |value: i32| {
        u8::try_from(value)
            .ok()
            .filter(|v| *v <= 2)
            .ok_or(IllegalMove::OutOfRange { value })
    };
    let (col, row) = (component(col)?, component(row)?);
    Position::from_col_row(col, row).ok_or(IllegalMove::OutOfRange {
        value: i32::from(col.max(row)),
    })
}
