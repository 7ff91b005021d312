//! Two-process synchronization for nested tic-tac-toe.
//!
//! One process hosts, the other joins as a peer. Each keeps its own
//! [`nested_tictactoe::GameState`] and exchanges moves, active-board
//! announcements and resets as small binary messages.
//!
//! # Architecture
//!
//! - **wire**: message categories, coordinate flattening and framing
//! - **protocol**: role rules, host relay and echo suppression
//! - **session**: turn gating and local/remote entry points
//! - **transport**: the byte channel (in-memory loopback or TCP)
//! - **driver**: the tokio loop that serializes local commands and inbound
//!   frames and reports [`SessionEvent`]s
//!
//! # Example
//!
//! ```
//! use nested_sync::{GameSession, Role, SessionConfig};
//! use nested_tictactoe::Coordinate;
//!
//! let mut host = GameSession::new(SessionConfig::new(Role::Host));
//! let (outcome, outbound) = host.local_move(Coordinate::from_parts(1, 1, 1, 1).unwrap()).unwrap();
//! assert_eq!(outbound.len(), 2);
//!
//! // The broadcast comes back to the host and is skipped.
//! host.remote_message(*outbound[0].message()).unwrap();
//! assert_eq!(host.state().history().len(), 1);
//! # let _ = outcome;
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod driver;
mod error;
mod protocol;
mod session;
pub mod transport;
pub mod wire;

pub use driver::{Command, Driver, Origin, SessionEvent};
pub use error::{ProtocolError, SessionError, TransportError};
pub use protocol::{
    Category, EchoSuppression, Handled, Outbound, RemoteEffect, Role, Route, SyncProtocol,
};
pub use session::{GameSession, SessionConfig};
pub use transport::{LoopbackTransport, TcpTransport, Transport};
pub use wire::{GridPair, MessageKind, WireMessage};
