//! Meta-board: the 3×3 grid of sub-boards.

use crate::board::SubBoard;
use crate::position::Position;
use crate::rules::{check_winner, is_full};
use crate::types::Player;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

/// The whole playing surface.
///
/// The overall winner is derived from sub-board winners with the same line
/// test a sub-board applies to its cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaBoard {
    /// Sub-boards indexed `[col][row]`.
    boards: [[SubBoard; 3]; 3],
    winner: Option<Player>,
}

impl MetaBoard {
    /// Creates a meta-board of nine empty sub-boards.
    pub fn new() -> Self {
        Self {
            boards: std::array::from_fn(|_| std::array::from_fn(|_| SubBoard::new())),
            winner: None,
        }
    }

    /// Gets the sub-board at the given position.
    pub fn board(&self, pos: Position) -> &SubBoard {
        &self.boards[usize::from(pos.col())][usize::from(pos.row())]
    }

    pub(crate) fn board_mut(&mut self, pos: Position) -> &mut SubBoard {
        &mut self.boards[usize::from(pos.col())][usize::from(pos.row())]
    }

    /// Returns the overall winner, if any.
    pub fn winner(&self) -> Option<Player> {
        self.winner
    }

    /// Checks if every sub-board is won or full.
    pub fn all_closed(&self) -> bool {
        is_full(|pos| self.board(pos).is_closed())
    }

    /// Positions of sub-boards that still accept marks.
    pub fn open_boards(&self) -> impl Iterator<Item = Position> + '_ {
        Position::ALL
            .into_iter()
            .filter(move |pos| !self.board(*pos).is_closed())
    }

    /// Re-derives the overall winner from the sub-board winners.
    ///
    /// Called after every sub-board mutation.
    #[instrument(skip(self))]
    pub fn recompute(&mut self) {
        let winner = check_winner(|pos| self.board(pos).winner());
        if winner.is_some() && self.winner.is_none() {
            info!(?winner, "Meta-board won");
        }
        self.winner = winner;
    }
}

impl Default for MetaBoard {
    fn default() -> Self {
        Self::new()
    }
}
