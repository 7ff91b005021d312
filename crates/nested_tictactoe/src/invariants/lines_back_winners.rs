//! Winners are backed by lines: no outcome exists without three in a row.

use super::Invariant;
use crate::rules::has_line;
use crate::{GameState, GameStatus, Position};

/// Invariant: every recorded winner owns a line at its level.
///
/// - a sub-board winner owns a line of cells on that sub-board
/// - the meta winner owns a line of sub-boards
/// - `Won(p)` matches the meta winner, `Drawn` only with every board closed
pub struct LinesBackWinnersInvariant;

impl Invariant<GameState> for LinesBackWinnersInvariant {
    fn holds(state: &GameState) -> bool {
        let meta = state.meta();

        let boards_ok = Position::ALL.into_iter().all(|pos| {
            let board = meta.board(pos);
            board
                .winner()
                .is_none_or(|winner| has_line(|cell| board.occupant(cell), winner))
        });

        let meta_ok = meta
            .winner()
            .is_none_or(|winner| has_line(|pos| meta.board(pos).winner(), winner));

        let status_ok = match state.status() {
            GameStatus::InProgress => meta.winner().is_none(),
            GameStatus::Won(player) => meta.winner() == Some(player),
            GameStatus::Drawn => meta.winner().is_none() && meta.all_closed(),
        };

        boards_ok && meta_ok && status_ok
    }

    fn description() -> &'static str {
        "Every winner owns a line of three at its level"
    }
}
