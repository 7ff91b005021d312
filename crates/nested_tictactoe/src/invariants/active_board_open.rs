//! Active board invariant: a forced board can always be played.

use super::Invariant;
use crate::{GameState, GameStatus};

/// Invariant: while in progress, the active board (if any) is open and at
/// least one open board exists.
pub struct ActiveBoardOpenInvariant;

impl Invariant<GameState> for ActiveBoardOpenInvariant {
    fn holds(state: &GameState) -> bool {
        if state.status() != GameStatus::InProgress {
            return true;
        }

        let meta = state.meta();
        let active_ok = state
            .active_board()
            .is_none_or(|pos| !meta.board(pos).is_closed());

        active_ok && meta.open_boards().next().is_some()
    }

    fn description() -> &'static str {
        "The forced sub-board is open while the match is in progress"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Coordinate;

    #[test]
    fn test_new_game_holds() {
        assert!(ActiveBoardOpenInvariant::holds(&GameState::new()));
    }

    #[test]
    fn test_holds_after_move() {
        let mut state = GameState::new();
        state
            .apply_move(Coordinate::from_parts(1, 1, 1, 1).unwrap())
            .unwrap();
        assert!(ActiveBoardOpenInvariant::holds(&state));
    }
}
