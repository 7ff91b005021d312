//! Plain-text rendering of the nested board.

use crate::game::GameState;
use crate::position::{Coordinate, Position};
use std::fmt;

const SEPARATOR: &str = "-------+-------+-------";

impl GameState {
    /// Formats the nine sub-boards as a 9×9 grid, top row first.
    ///
    /// Empty cells the side to move may play show `.`, other empty cells a
    /// blank.
    pub fn display_board(&self) -> String {
        let mut out = String::new();
        for meta_row in (0..3u8).rev() {
            for cell_row in (0..3u8).rev() {
                for meta_col in 0..3u8 {
                    out.push(' ');
                    for cell_col in 0..3u8 {
                        out.push(self.symbol_at(meta_col, meta_row, cell_col, cell_row));
                        out.push(' ');
                    }
                    if meta_col < 2 {
                        out.push('|');
                    }
                }
                out.push('\n');
            }
            if meta_row > 0 {
                out.push_str(SEPARATOR);
                out.push('\n');
            }
        }
        out
    }

    fn symbol_at(&self, meta_col: u8, meta_row: u8, cell_col: u8, cell_row: u8) -> char {
        let (Some(board), Some(cell)) = (
            Position::from_col_row(meta_col, meta_row),
            Position::from_col_row(cell_col, cell_row),
        ) else {
            return '?';
        };
        match self.occupant(Coordinate::new(board, cell)) {
            Some(player) => player.symbol(),
            None if self.is_board_playable(board) => '.',
            None => ' ',
        }
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_board())?;
        let active = match self.active_board() {
            Some(board) => board.to_string(),
            None => "any".to_string(),
        };
        write!(
            f,
            "Turn: {}  Board: {}  Status: {}",
            self.current_turn(),
            active,
            self.status()
        )
    }
}
