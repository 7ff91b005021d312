//! First-class invariants for nested tic-tac-toe.
//!
//! Invariants are logical properties that must hold after every transition.
//! They are testable independently and document what the state machine
//! guarantees.

/// A logical property that must hold for a given state.
pub trait Invariant<S> {
    /// Checks if the invariant holds for the given state.
    fn holds(state: &S) -> bool;

    /// Human-readable description of the invariant.
    fn description() -> &'static str;
}

/// Violation of an invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub description: String,
}

impl InvariantViolation {
    /// Creates a new invariant violation.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

/// A set of invariants that can be checked together.
///
/// Implemented for the three-invariant tuple [`NestedInvariants`] uses.
pub trait InvariantSet<S> {
    /// Checks all invariants in the set, collecting every violation.
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>>;
}

impl<S, I1, I2, I3> InvariantSet<S> for (I1, I2, I3)
where
    I1: Invariant<S>,
    I2: Invariant<S>,
    I3: Invariant<S>,
{
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>> {
        let violations: Vec<_> = [
            (I1::holds(state), I1::description()),
            (I2::holds(state), I2::description()),
            (I3::holds(state), I3::description()),
        ]
        .into_iter()
        .filter(|(holds, _)| !holds)
        .map(|(_, description)| InvariantViolation::new(description))
        .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

pub mod active_board_open;
pub mod history_consistent;
pub mod lines_back_winners;

pub use active_board_open::ActiveBoardOpenInvariant;
pub use history_consistent::HistoryConsistentInvariant;
pub use lines_back_winners::LinesBackWinnersInvariant;

/// All nested tic-tac-toe invariants as a composable set.
pub type NestedInvariants = (
    LinesBackWinnersInvariant,
    ActiveBoardOpenInvariant,
    HistoryConsistentInvariant,
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Coordinate, GameState, Player, Position};

    #[test]
    fn test_invariant_set_holds_for_new_game() {
        assert!(NestedInvariants::check_all(&GameState::new()).is_ok());
    }

    #[test]
    fn test_invariant_set_holds_after_moves() {
        let mut state = GameState::new();
        for parts in [(1, 1, 0, 2), (0, 2, 2, 2), (2, 2, 1, 1)] {
            let (mc, mr, cc, cr) = parts;
            state
                .apply_move(Coordinate::from_parts(mc, mr, cc, cr).unwrap())
                .unwrap();
        }
        assert!(NestedInvariants::check_all(&state).is_ok());
    }

    #[test]
    fn test_invariant_set_detects_untracked_mark() {
        let mut state = GameState::new();
        state
            .meta_mut()
            .board_mut(Position::Center)
            .place(Position::Center, Player::B)
            .unwrap();

        let violations = NestedInvariants::check_all(&state).unwrap_err();
        assert_eq!(violations.len(), 1);
        assert_eq!(
            violations[0].description,
            HistoryConsistentInvariant::description()
        );
    }
}
