//! The authoritative nested tic-tac-toe state machine.

use crate::action::{IllegalMove, Move, MoveOutcome};
use crate::contracts::{Contract, MoveContract, assert_invariants};
use crate::meta::MetaBoard;
use crate::position::{Coordinate, Position};
use crate::types::{GameStatus, Player};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Complete match state.
///
/// `apply_move` is the only mutating operation besides `reset`. Local input
/// and replayed network messages both go through it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    meta: MetaBoard,
    current_turn: Player,
    /// Forced sub-board, `None` for free choice among open boards.
    active_board: Option<Position>,
    status: GameStatus,
    history: Vec<Move>,
}

impl GameState {
    /// Creates a new match: empty boards, free choice, A to move.
    pub fn new() -> Self {
        Self {
            meta: MetaBoard::new(),
            current_turn: Player::A,
            active_board: None,
            status: GameStatus::InProgress,
            history: Vec::new(),
        }
    }

    /// Returns the meta-board.
    pub fn meta(&self) -> &MetaBoard {
        &self.meta
    }

    pub(crate) fn meta_mut(&mut self) -> &mut MetaBoard {
        &mut self.meta
    }

    /// Returns the player whose turn it is.
    pub fn current_turn(&self) -> Player {
        self.current_turn
    }

    /// Returns the forced sub-board, if any.
    pub fn active_board(&self) -> Option<Position> {
        self.active_board
    }

    /// Returns the match status.
    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// Returns true once the match is won or drawn.
    pub fn is_over(&self) -> bool {
        self.status.is_terminal()
    }

    /// Returns the applied moves in order.
    pub fn history(&self) -> &[Move] {
        &self.history
    }

    /// Returns the occupant of a single cell.
    pub fn occupant(&self, coord: Coordinate) -> Option<Player> {
        self.meta.board(coord.board()).occupant(coord.cell())
    }

    /// Returns the winner of a sub-board.
    pub fn sub_board_winner(&self, board: Position) -> Option<Player> {
        self.meta.board(board).winner()
    }

    /// Checks if a sub-board is neither won nor full.
    pub fn is_board_open(&self, board: Position) -> bool {
        !self.meta.board(board).is_closed()
    }

    /// Checks if the sub-board can currently be played by the side to move.
    pub fn is_board_playable(&self, board: Position) -> bool {
        !self.is_over()
            && !self.meta.board(board).is_closed()
            && self.active_board.is_none_or(|active| active == board)
    }

    /// Every coordinate `apply_move` would accept right now.
    #[instrument(skip(self))]
    pub fn legal_moves(&self) -> Vec<Coordinate> {
        Position::ALL
            .into_iter()
            .filter(|board| self.is_board_playable(*board))
            .flat_map(|board| {
                self.meta
                    .board(board)
                    .empty_cells()
                    .map(move |cell| Coordinate::new(board, cell))
            })
            .collect()
    }

    /// Plays a mark for the player whose turn it is.
    ///
    /// # Errors
    ///
    /// Returns the first violated rule, in order: `GameOver`, `WrongBoard`,
    /// `BoardUnavailable`, `AlreadyOccupied`/`BoardClosed`. Nothing changes on
    /// error.
    pub fn apply_move(&mut self, coord: Coordinate) -> Result<MoveOutcome, IllegalMove> {
        self.apply_move_as(self.current_turn, coord)
    }

    /// Plays a mark for an explicit player.
    ///
    /// Callers with a turn override configured use this directly. The mark
    /// goes to `player`, but `current_turn` still alternates from its own
    /// value, so an override never shifts whose turn it is.
    #[instrument(skip(self), fields(coordinate = %coord, active = ?self.active_board))]
    pub fn apply_move_as(
        &mut self,
        player: Player,
        coord: Coordinate,
    ) -> Result<MoveOutcome, IllegalMove> {
        MoveContract::pre(self, &coord).inspect_err(|e| {
            debug!(error = %e, "Move rejected");
        })?;

        let board = coord.board();
        self.meta.board_mut(board).place(coord.cell(), player)?;
        self.meta.recompute();
        self.history.push(Move::new(player, coord));

        // The cell's position picks the opponent's board.
        let next = coord.cell();
        self.active_board = if self.meta.board(next).is_closed() {
            None
        } else {
            Some(next)
        };

        if let Some(winner) = self.meta.winner() {
            self.status = GameStatus::Won(winner);
            info!(?winner, moves = self.history.len(), "Match won");
        } else if self.meta.all_closed() {
            self.status = GameStatus::Drawn;
            info!(moves = self.history.len(), "Match drawn");
        } else {
            self.current_turn = self.current_turn.opponent();
        }

        assert_invariants(self);

        let outcome = MoveOutcome {
            player,
            coordinate: coord,
            status: self.status,
            active_board: self.active_board,
            board_winner: self.meta.board(board).winner(),
        };
        debug!(?outcome, "Move applied");
        Ok(outcome)
    }

    /// Restores the construction-time state. Safe at any time.
    #[instrument(skip(self), fields(moves = self.history.len()))]
    pub fn reset(&mut self) {
        *self = Self::new();
        info!("Match reset");
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(mc: i32, mr: i32, cc: i32, cr: i32) -> Coordinate {
        Coordinate::from_parts(mc, mr, cc, cr).unwrap()
    }

    /// Fills a sub-board with the drawn layout X O X / X O O / O X X,
    /// optionally leaving one cell empty.
    fn fill_drawn(state: &mut GameState, board: Position, skip: Option<Position>) {
        let layout = [
            (Position::TopLeft, Player::A),
            (Position::TopCenter, Player::B),
            (Position::TopRight, Player::A),
            (Position::MiddleLeft, Player::A),
            (Position::Center, Player::B),
            (Position::MiddleRight, Player::B),
            (Position::BottomLeft, Player::B),
            (Position::BottomCenter, Player::A),
            (Position::BottomRight, Player::A),
        ];
        for (cell, player) in layout {
            if Some(cell) == skip {
                continue;
            }
            state.meta_mut().board_mut(board).place(cell, player).unwrap();
            state
                .history
                .push(Move::new(player, Coordinate::new(board, cell)));
        }
    }

    #[test]
    fn test_new_game_initial_values() {
        let state = GameState::new();
        assert_eq!(state.current_turn(), Player::A);
        assert_eq!(state.active_board(), None);
        assert_eq!(state.status(), GameStatus::InProgress);
        assert_eq!(state.legal_moves().len(), 81);
    }

    #[test]
    fn test_center_opening_forces_center() {
        let mut state = GameState::new();
        let outcome = state.apply_move(coord(1, 1, 1, 1)).unwrap();

        assert_eq!(outcome.player, Player::A);
        assert_eq!(outcome.active_board, Some(Position::Center));
        assert_eq!(state.active_board(), Some(Position::Center));
        assert_eq!(state.current_turn(), Player::B);
        assert_eq!(state.legal_moves().len(), 8);
        assert!(state.legal_moves().iter().all(|c| c.board() == Position::Center));
    }

    #[test]
    fn test_all_sub_boards_closed_without_line_is_drawn() {
        let mut state = GameState::new();
        for board in Position::ALL {
            let skip = (board == Position::BottomRight).then_some(Position::BottomRight);
            fill_drawn(&mut state, board, skip);
        }
        state.active_board = Some(Position::BottomRight);
        state.current_turn = Player::A;

        let outcome = state.apply_move(coord(2, 0, 2, 0)).unwrap();

        assert_eq!(outcome.status, GameStatus::Drawn);
        assert_eq!(state.status(), GameStatus::Drawn);
        assert_eq!(state.active_board(), None);
        assert_eq!(state.meta().winner(), None);
        assert!(state.legal_moves().is_empty());
    }

    #[test]
    fn test_forced_mover_does_not_stall_turn_alternation() {
        let mut state = GameState::new();

        let first = state.apply_move_as(Player::A, coord(1, 1, 1, 1)).unwrap();
        assert_eq!(first.player, Player::A);
        assert_eq!(state.current_turn(), Player::B);

        let second = state.apply_move_as(Player::A, coord(1, 1, 0, 0)).unwrap();
        assert_eq!(second.player, Player::A);
        assert_eq!(state.current_turn(), Player::A);
        assert_eq!(state.occupant(coord(1, 1, 0, 0)), Some(Player::A));
    }

    #[test]
    fn test_won_and_full_sub_boards_without_meta_line_is_drawn() {
        let mut state = GameState::new();
        let won = [Position::TopLeft, Position::TopRight, Position::BottomCenter];
        for board in Position::ALL.into_iter().filter(|b| !won.contains(b)) {
            fill_drawn(&mut state, board, None);
        }

        let mut mark = |board: Position, cell: Position, player: Player| {
            state.meta_mut().board_mut(board).place(cell, player).unwrap();
            state
                .history
                .push(Move::new(player, Coordinate::new(board, cell)));
        };
        for cell in [Position::BottomLeft, Position::BottomCenter, Position::BottomRight] {
            mark(Position::TopLeft, cell, Player::A);
        }
        for cell in [Position::TopLeft, Position::TopCenter, Position::TopRight] {
            mark(Position::TopRight, cell, Player::B);
        }
        for cell in [Position::TopLeft, Position::TopCenter] {
            mark(Position::BottomCenter, cell, Player::A);
        }
        state.meta_mut().recompute();
        state.active_board = Some(Position::BottomCenter);
        state.current_turn = Player::A;
        assert_eq!(state.status(), GameStatus::InProgress);

        // Taking the last open board leaves A and B with no line of boards.
        let outcome = state.apply_move(coord(1, 0, 2, 2)).unwrap();

        assert_eq!(outcome.board_winner, Some(Player::A));
        assert_eq!(outcome.status, GameStatus::Drawn);
        assert_eq!(state.sub_board_winner(Position::TopLeft), Some(Player::A));
        assert_eq!(state.sub_board_winner(Position::TopRight), Some(Player::B));
        assert_eq!(state.meta().winner(), None);
        assert_eq!(state.active_board(), None);
        assert!(state.legal_moves().is_empty());
    }

    #[test]
    fn test_meta_line_wins_match() {
        let mut state = GameState::new();
        // A owns the left column of sub-boards except the top one.
        for board in [Position::BottomLeft, Position::MiddleLeft] {
            for cell in [Position::TopLeft, Position::TopCenter, Position::TopRight] {
                state.meta_mut().board_mut(board).place(cell, Player::A).unwrap();
                state
                    .history
                    .push(Move::new(Player::A, Coordinate::new(board, cell)));
            }
        }
        for cell in [Position::TopLeft, Position::TopCenter] {
            state
                .meta_mut()
                .board_mut(Position::TopLeft)
                .place(cell, Player::A)
                .unwrap();
            state
                .history
                .push(Move::new(Player::A, Coordinate::new(Position::TopLeft, cell)));
        }
        state.meta_mut().recompute();
        state.active_board = Some(Position::TopLeft);

        let outcome = state.apply_move_as(Player::A, coord(0, 2, 2, 2)).unwrap();

        assert_eq!(outcome.status, GameStatus::Won(Player::A));
        assert_eq!(outcome.board_winner, Some(Player::A));
        assert_eq!(state.meta().winner(), Some(Player::A));
        assert_eq!(
            state.apply_move(coord(1, 1, 1, 1)),
            Err(IllegalMove::GameOver)
        );
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let mut state = GameState::new();
        state.apply_move(coord(1, 1, 1, 1)).unwrap();
        state.apply_move(coord(1, 1, 0, 0)).unwrap();
        state.reset();
        assert_eq!(state, GameState::new());
        state.reset();
        assert_eq!(state, GameState::new());
    }
}
