//! History consistency invariant: history matches board state.

use super::Invariant;
use crate::GameState;

/// Invariant: move history is consistent with the board.
///
/// Every history entry's cell holds that entry's player, and the number of
/// marks on the board equals the history length.
pub struct HistoryConsistentInvariant;

impl Invariant<GameState> for HistoryConsistentInvariant {
    fn holds(state: &GameState) -> bool {
        let history = state.history();

        let entries_ok = history
            .iter()
            .all(|mov| state.occupant(mov.coordinate) == Some(mov.player));

        let marks: usize = crate::Position::ALL
            .into_iter()
            .map(|pos| state.meta().board(pos).mark_count())
            .sum();

        entries_ok && marks == history.len()
    }

    fn description() -> &'static str {
        "History is consistent with board state"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Coordinate, Player};

    #[test]
    fn test_empty_game_holds() {
        assert!(HistoryConsistentInvariant::holds(&GameState::new()));
    }

    #[test]
    fn test_moves_recorded_in_order() {
        let mut state = GameState::new();
        let first = Coordinate::from_parts(2, 2, 0, 1).unwrap();
        let second = Coordinate::from_parts(0, 1, 2, 2).unwrap();
        state.apply_move(first).unwrap();
        state.apply_move(second).unwrap();

        assert!(HistoryConsistentInvariant::holds(&state));
        assert_eq!(state.history()[0].player, Player::A);
        assert_eq!(state.history()[0].coordinate, first);
        assert_eq!(state.history()[1].player, Player::B);
    }
}
