//! Sub-board: a 3×3 grid of cells with its own outcome.

use crate::action::IllegalMove;
use crate::position::Position;
use crate::rules::{check_winner, is_full};
use crate::types::{Cell, Player};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// One of the nine 3×3 grids of the match.
///
/// `winner` and `full` are derived after every placement. Once a winner is
/// recorded it stays until the board is reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubBoard {
    /// Cells indexed `[col][row]`.
    cells: [[Cell; 3]; 3],
    winner: Option<Player>,
    full: bool,
}

impl SubBoard {
    /// Creates a new empty sub-board.
    pub fn new() -> Self {
        Self {
            cells: [[Cell::new(); 3]; 3],
            winner: None,
            full: false,
        }
    }

    /// Gets the cell at the given position.
    pub fn cell(&self, pos: Position) -> &Cell {
        &self.cells[usize::from(pos.col())][usize::from(pos.row())]
    }

    /// Gets the occupant of the cell at the given position.
    pub fn occupant(&self, pos: Position) -> Option<Player> {
        self.cell(pos).occupant()
    }

    /// Returns the winner of this sub-board, if any.
    pub fn winner(&self) -> Option<Player> {
        self.winner
    }

    /// Checks if all 9 cells are occupied.
    pub fn is_full(&self) -> bool {
        self.full
    }

    /// A closed sub-board (won or full) accepts no more marks.
    pub fn is_closed(&self) -> bool {
        self.winner.is_some() || self.full
    }

    /// Positions of the empty cells.
    pub fn empty_cells(&self) -> impl Iterator<Item = Position> + '_ {
        Position::ALL
            .into_iter()
            .filter(move |pos| self.cell(*pos).is_empty())
    }

    /// Number of occupied cells.
    pub fn mark_count(&self) -> usize {
        Position::ALL
            .into_iter()
            .filter(|pos| !self.cell(*pos).is_empty())
            .count()
    }

    /// Places `player`'s mark at `pos`, then recomputes the board outcome.
    ///
    /// # Errors
    ///
    /// - `IllegalMove::AlreadyOccupied` if the cell holds a mark.
    /// - `IllegalMove::BoardClosed` if the board is won or full.
    #[instrument(skip(self))]
    pub fn place(&mut self, pos: Position, player: Player) -> Result<(), IllegalMove> {
        if !self.cell(pos).is_empty() {
            return Err(IllegalMove::AlreadyOccupied);
        }
        if self.is_closed() {
            return Err(IllegalMove::BoardClosed);
        }

        self.cells[usize::from(pos.col())][usize::from(pos.row())].occupy(player);
        self.recompute();
        Ok(())
    }

    fn recompute(&mut self) {
        if self.winner.is_none() {
            self.winner = check_winner(|pos| self.occupant(pos));
            if let Some(winner) = self.winner {
                debug!(?winner, "Sub-board won");
            }
        }
        self.full = is_full(|pos| !self.cell(pos).is_empty());
    }
}

impl Default for SubBoard {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_board_open() {
        let board = SubBoard::new();
        assert_eq!(board.winner(), None);
        assert!(!board.is_full());
        assert!(!board.is_closed());
        assert_eq!(board.empty_cells().count(), 9);
    }

    #[test]
    fn test_every_line_wins() {
        for line in Position::LINES {
            let mut board = SubBoard::new();
            for pos in line {
                board.place(pos, Player::A).unwrap();
            }
            assert_eq!(board.winner(), Some(Player::A), "{line:?}");
            assert!(board.is_closed());
            assert!(!board.is_full());
        }
    }

    #[test]
    fn test_two_in_a_line_not_won() {
        for line in Position::LINES {
            let mut board = SubBoard::new();
            board.place(line[0], Player::B).unwrap();
            board.place(line[1], Player::B).unwrap();
            board.place(line[2], Player::A).unwrap();
            assert_eq!(board.winner(), None, "{line:?}");
        }
    }

    #[test]
    fn test_occupied_cell_rejected() {
        let mut board = SubBoard::new();
        board.place(Position::Center, Player::A).unwrap();
        let before = board.clone();
        assert_eq!(
            board.place(Position::Center, Player::B),
            Err(IllegalMove::AlreadyOccupied)
        );
        assert_eq!(board, before);
    }

    #[test]
    fn test_won_board_closed_to_empty_cells() {
        let mut board = SubBoard::new();
        for pos in [Position::TopLeft, Position::TopCenter, Position::TopRight] {
            board.place(pos, Player::A).unwrap();
        }
        assert_eq!(
            board.place(Position::Center, Player::B),
            Err(IllegalMove::BoardClosed)
        );
        assert!(board.cell(Position::Center).is_empty());
    }

    #[test]
    fn test_full_board_without_winner() {
        // X O X / X O O / O X X
        let layout = [
            (Position::TopLeft, Player::A),
            (Position::TopCenter, Player::B),
            (Position::TopRight, Player::A),
            (Position::MiddleLeft, Player::A),
            (Position::Center, Player::B),
            (Position::MiddleRight, Player::B),
            (Position::BottomLeft, Player::B),
            (Position::BottomCenter, Player::A),
            (Position::BottomRight, Player::A),
        ];
        let mut board = SubBoard::new();
        for (pos, player) in layout {
            board.place(pos, player).unwrap();
        }
        assert!(board.is_full());
        assert!(board.is_closed());
        assert_eq!(board.winner(), None);
        assert_eq!(board.mark_count(), 9);
    }
}
