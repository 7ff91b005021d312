//! Core domain types for nested tic-tac-toe.

use serde::{Deserialize, Serialize};

/// Player in the game.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    strum::EnumIter,
    strum::EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum Player {
    /// Player A (goes first, plays crosses).
    A,
    /// Player B (goes second, plays naughts).
    B,
}

impl Player {
    /// Returns the opponent player.
    pub fn opponent(self) -> Self {
        match self {
            Player::A => Player::B,
            Player::B => Player::A,
        }
    }

    /// Mark drawn for this player.
    pub fn symbol(self) -> char {
        match self {
            Player::A => 'X',
            Player::B => 'O',
        }
    }
}

/// A single playable slot on a sub-board.
///
/// A cell is written exactly once per match; only a reset clears it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    occupant: Option<Player>,
}

impl Cell {
    /// Creates an empty cell.
    pub fn new() -> Self {
        Self { occupant: None }
    }

    /// Returns the player occupying this cell, if any.
    pub fn occupant(&self) -> Option<Player> {
        self.occupant
    }

    /// Checks if the cell is empty.
    pub fn is_empty(&self) -> bool {
        self.occupant.is_none()
    }

    pub(crate) fn occupy(&mut self, player: Player) {
        self.occupant = Some(player);
    }
}

/// Current status of the match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
pub enum GameStatus {
    /// Match is ongoing.
    #[display("in progress")]
    InProgress,
    /// Match ended with a line of three won sub-boards.
    #[display("won by {_0}")]
    Won(Player),
    /// Every sub-board is closed and nobody owns a line.
    #[display("drawn")]
    Drawn,
}

impl GameStatus {
    /// Returns true once the match can no longer change.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, GameStatus::InProgress)
    }

    /// Returns the winner if there is one.
    pub fn winner(&self) -> Option<Player> {
        match self {
            GameStatus::Won(player) => Some(*player),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_opponent_alternates() {
        assert_eq!(Player::A.opponent(), Player::B);
        assert_eq!(Player::B.opponent(), Player::A);
    }

    #[test]
    fn test_player_parses_case_insensitive() {
        assert_eq!(Player::from_str("a"), Ok(Player::A));
        assert_eq!(Player::from_str("B"), Ok(Player::B));
        assert!(Player::from_str("none").is_err());
    }

    #[test]
    fn test_status_terminal() {
        assert!(!GameStatus::InProgress.is_terminal());
        assert!(GameStatus::Won(Player::B).is_terminal());
        assert!(GameStatus::Drawn.is_terminal());
        assert_eq!(GameStatus::Won(Player::B).winner(), Some(Player::B));
        assert_eq!(GameStatus::Drawn.winner(), None);
    }
}
