//! Contract-based validation for nested tic-tac-toe.
//!
//! Contracts define correctness through preconditions and postconditions:
//! {P} action {Q}. Every precondition is checked before the state is
//! touched, which is what makes `apply_move` all-or-nothing.

use crate::action::IllegalMove;
use crate::game::GameState;
use crate::invariants::{InvariantSet, InvariantViolation, NestedInvariants};
use crate::position::Coordinate;
use tracing::{instrument, warn};

/// A contract defines preconditions and postconditions for state transitions.
pub trait Contract<S, A> {
    /// Checks preconditions before applying the action.
    fn pre(state: &S, action: &A) -> Result<(), IllegalMove>;

    /// Checks postconditions after applying the action.
    fn post(after: &S) -> Result<(), Vec<InvariantViolation>>;
}

/// Precondition: the match is still in progress.
pub struct GameNotOver;

impl GameNotOver {
    /// Rejects any move once the match is won or drawn.
    pub fn check(state: &GameState) -> Result<(), IllegalMove> {
        if state.status().is_terminal() {
            Err(IllegalMove::GameOver)
        } else {
            Ok(())
        }
    }
}

/// Precondition: the move respects the forced sub-board.
pub struct OnActiveBoard;

impl OnActiveBoard {
    /// Rejects moves outside the active board when one is set.
    pub fn check(state: &GameState, coord: &Coordinate) -> Result<(), IllegalMove> {
        match state.active_board() {
            Some(expected) if expected != coord.board() => Err(IllegalMove::WrongBoard {
                expected,
                requested: coord.board(),
            }),
            _ => Ok(()),
        }
    }
}

/// Precondition: the targeted sub-board is neither won nor full.
pub struct BoardIsOpen;

impl BoardIsOpen {
    /// Free choice never extends to closed sub-boards.
    pub fn check(state: &GameState, coord: &Coordinate) -> Result<(), IllegalMove> {
        if state.meta().board(coord.board()).is_closed() {
            Err(IllegalMove::BoardUnavailable)
        } else {
            Ok(())
        }
    }
}

/// Precondition: the targeted cell is empty.
pub struct CellIsEmpty;

impl CellIsEmpty {
    /// Rejects marks on occupied cells.
    pub fn check(state: &GameState, coord: &Coordinate) -> Result<(), IllegalMove> {
        if state.occupant(*coord).is_some() {
            Err(IllegalMove::AlreadyOccupied)
        } else {
            Ok(())
        }
    }
}

/// Composite precondition, checked in rule order.
pub struct LegalMove;

impl LegalMove {
    /// Validates all preconditions for a move.
    #[instrument(skip(state))]
    pub fn check(state: &GameState, coord: &Coordinate) -> Result<(), IllegalMove> {
        GameNotOver::check(state)?;
        OnActiveBoard::check(state, coord)?;
        BoardIsOpen::check(state, coord)?;
        CellIsEmpty::check(state, coord)?;
        Ok(())
    }
}

/// Contract for move actions.
///
/// Preconditions: see [`LegalMove`].
///
/// Postconditions: every [`NestedInvariants`] member holds.
pub struct MoveContract;

impl Contract<GameState, Coordinate> for MoveContract {
    fn pre(state: &GameState, action: &Coordinate) -> Result<(), IllegalMove> {
        LegalMove::check(state, action)
    }

    fn post(after: &GameState) -> Result<(), Vec<InvariantViolation>> {
        NestedInvariants::check_all(after)
    }
}

/// Asserts that all game invariants hold (panics on violation in debug builds).
pub fn assert_invariants(state: &GameState) {
    if let Err(violations) = MoveContract::post(state) {
        for violation in &violations {
            warn!(description = %violation.description, "Invariant violated");
        }
        debug_assert!(violations.is_empty(), "Invariant violated: {violations:?}");
    }
}
