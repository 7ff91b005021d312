//! First-class move types for nested tic-tac-toe.
//!
//! Moves are domain events, not side effects. A move applied from local
//! input and one replayed from the network are the same value.

use crate::position::{Coordinate, Position};
use crate::types::{GameStatus, Player};
use serde::{Deserialize, Serialize};

/// A move: a player placing their mark at a coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    /// The player making the move.
    pub player: Player,
    /// The cell receiving the mark.
    pub coordinate: Coordinate,
}

impl Move {
    /// Creates a new move.
    pub fn new(player: Player, coordinate: Coordinate) -> Self {
        Self { player, coordinate }
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.player, self.coordinate)
    }
}

/// What changed after a successful move.
///
/// Returned to the caller so it can forward the change to presentation
/// and network layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveOutcome {
    /// The player who moved.
    pub player: Player,
    /// Where the mark was placed.
    pub coordinate: Coordinate,
    /// Match status after the move.
    pub status: GameStatus,
    /// Sub-board the next player is forced into, `None` for free choice.
    pub active_board: Option<Position>,
    /// Winner of the sub-board that was played in, if it is won.
    pub board_winner: Option<Player>,
}

impl MoveOutcome {
    /// The move this outcome describes.
    pub fn as_move(&self) -> Move {
        Move::new(self.player, self.coordinate)
    }
}

/// Error returned when a move is rejected.
///
/// A rejected move never changes any state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
pub enum IllegalMove {
    /// The match has already been won or drawn.
    #[display("Game is already over")]
    GameOver,

    /// The move ignores the forced sub-board.
    #[display("Move must be played in sub-board {expected}, not {requested}")]
    WrongBoard {
        /// The sub-board the player is forced into.
        expected: Position,
        /// The sub-board the move targeted.
        requested: Position,
    },

    /// The targeted sub-board is already won or full.
    #[display("Sub-board is already won or full")]
    BoardUnavailable,

    /// The targeted cell already holds a mark.
    #[display("Cell is already occupied")]
    AlreadyOccupied,

    /// The sub-board refused the placement because it is closed.
    #[display("Sub-board is closed")]
    BoardClosed,

    /// A coordinate component is outside `0..=2`.
    #[display("Coordinate component {value} is outside 0..=2")]
    OutOfRange {
        /// The offending component.
        value: i32,
    },
}

impl std::error::Error for IllegalMove {}
