//! Win detection over a 3×3 grid.

use crate::position::Position;
use crate::types::Player;

/// Checks if a player owns a complete line.
///
/// `owner` maps each position to the player holding it. Returns the owner
/// of the first complete row, column or diagonal, `None` otherwise.
pub fn check_winner(owner: impl Fn(Position) -> Option<Player>) -> Option<Player> {
    for [a, b, c] in Position::LINES {
        if let Some(player) = owner(a)
            && owner(b) == Some(player)
            && owner(c) == Some(player)
        {
            return Some(player);
        }
    }

    None
}

/// Checks if `player` owns at least one complete line.
pub fn has_line(owner: impl Fn(Position) -> Option<Player>, player: Player) -> bool {
    Position::LINES
        .iter()
        .any(|line| line.iter().all(|pos| owner(*pos) == Some(player)))
}
