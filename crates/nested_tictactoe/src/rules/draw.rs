//! Fullness detection over a 3×3 grid.

use crate::position::Position;

/// Checks if every position of the grid is taken.
///
/// Sub-boards pass "cell occupied", the meta-board passes "sub-board closed".
pub fn is_full(taken: impl Fn(Position) -> bool) -> bool {
    Position::ALL.into_iter().all(taken)
}
