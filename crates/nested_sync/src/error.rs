//! Error types for the sync layer.

use crate::protocol::Role;
use crate::wire::MessageKind;
use derive_more::{Display, Error};
use nested_tictactoe::{IllegalMove, Player};
use tracing::instrument;

/// Error raised while decoding or routing an inbound message.
///
/// Never fatal: the message is logged and dropped.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum ProtocolError {
    /// Unknown category, truncated payload or out-of-range coordinate.
    #[display("Malformed message: {_0}")]
    MalformedMessage(String),

    /// A message travelling in a direction the receiving role never accepts.
    #[display("Unexpected {kind} message for the {role}")]
    UnexpectedMessage {
        /// Category of the offending message.
        kind: MessageKind,
        /// Role of the receiver.
        role: Role,
    },
}

impl std::error::Error for ProtocolError {}

/// Error returned to local input.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum SessionError {
    /// The local seat tried to move on the other seat's turn.
    #[display("Not your turn: waiting for player {turn}")]
    NotYourTurn {
        /// The player whose turn it is.
        turn: Player,
    },

    /// A connected peer tried to reset; resets belong to the host.
    #[display("Only the host may reset a connected session")]
    ResetNotPermitted,

    /// The state machine rejected the move.
    #[display("Illegal move: {_0}")]
    Illegal(IllegalMove),
}

impl std::error::Error for SessionError {}

impl From<IllegalMove> for SessionError {
    fn from(err: IllegalMove) -> Self {
        SessionError::Illegal(err)
    }
}

/// Transport error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Transport error: {} at {}:{}", message, file, line)]
pub struct TransportError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl TransportError {
    /// Creates a new transport error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl From<std::io::Error> for TransportError {
    #[track_caller]
    fn from(err: std::io::Error) -> Self {
        Self::new(format!("I/O error: {}", err))
    }
}
