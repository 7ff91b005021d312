//! Nested tic-tac-toe game logic.
//!
//! A 3×3 grid of 3×3 sub-boards. The cell a player marks decides which
//! sub-board the opponent must play next; three won sub-boards in a line win
//! the match.
//!
//! # Architecture
//!
//! - **Cell / SubBoard**: a 3×3 grid of marks with its own winner
//! - **MetaBoard**: the 3×3 grid of sub-boards with the overall winner
//! - **GameState**: turn order, forced-board routing and the single
//!   mutating operation [`GameState::apply_move`]
//! - **Contracts / invariants**: preconditions checked before mutation,
//!   postconditions checked after every move in debug builds
//!
//! # Example
//!
//! ```
//! use nested_tictactoe::{Coordinate, GameState, Player, Position};
//!
//! let mut game = GameState::new();
//! let outcome = game.apply_move(Coordinate::from_parts(1, 1, 1, 1)?)?;
//! assert_eq!(outcome.player, Player::A);
//! assert_eq!(game.active_board(), Some(Position::Center));
//! # Ok::<(), nested_tictactoe::IllegalMove>(())
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod action;
mod board;
mod game;
mod meta;
mod position;
mod render;
mod types;

pub mod contracts;
pub mod invariants;
pub mod rules;

pub use action::{IllegalMove, Move, MoveOutcome};
pub use board::SubBoard;
pub use game::GameState;
pub use meta::MetaBoard;
pub use position::{Coordinate, Position};
pub use types::{Cell, GameStatus, Player};
