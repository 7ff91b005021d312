//! Host/peer synchronization of a shared [`GameState`].
//!
//! Every message a process sends comes back to it: the host echoes its own
//! broadcasts to itself, and a peer hears its messages again when the host
//! relays them. [`EchoSuppression`] remembers what was sent so the echo is
//! skipped exactly once instead of being applied a second time.

use crate::error::ProtocolError;
use crate::wire::{GridPair, MessageKind, WireMessage};
use derive_getters::Getters;
use derive_more::Display;
use nested_tictactoe::{Coordinate, GameState, IllegalMove, MoveOutcome, Player, Position};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::{debug, info, instrument, warn};

/// Which end of the connection this process is.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, strum::EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum Role {
    /// Accepts the connection, relays peer messages and owns resets.
    #[display("host")]
    Host,
    /// Connects to the host and sends only to it.
    #[display("peer")]
    Peer,
}

impl Role {
    /// The seat this role plays.
    pub fn seat(self) -> Player {
        match self {
            Role::Host => Player::A,
            Role::Peer => Player::B,
        }
    }
}

/// Where an outbound message goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum Route {
    /// To every peer, and back to the host itself.
    Broadcast,
    /// To the host only.
    ToHost,
}

impl Route {
    /// The only route a role may send on.
    pub fn for_role(role: Role) -> Self {
        match role {
            Role::Host => Route::Broadcast,
            Role::Peer => Route::ToHost,
        }
    }
}

/// A message ready for the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters)]
pub struct Outbound {
    /// Destination.
    route: Route,
    /// Payload.
    message: WireMessage,
}

impl Outbound {
    /// Creates an outbound message.
    pub fn new(route: Route, message: WireMessage) -> Self {
        Self { route, message }
    }
}

/// Suppression category: the two directions of a message share one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum Category {
    /// Move messages.
    Move,
    /// Active-board announcements.
    ActiveBoard,
    /// Resets.
    Reset,
}

impl From<MessageKind> for Category {
    fn from(kind: MessageKind) -> Self {
        match kind {
            MessageKind::MoveFromClient | MessageKind::MoveToClient => Category::Move,
            MessageKind::ActiveBoardToClient | MessageKind::ActiveBoardFromClient => {
                Category::ActiveBoard
            }
            MessageKind::Reset => Category::Reset,
        }
    }
}

/// Pending echoes, one FIFO per category.
///
/// An entry is armed for every locally initiated send and consumed by the
/// first inbound message of the same category carrying the same payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EchoSuppression {
    moves: VecDeque<GridPair>,
    boards: VecDeque<GridPair>,
    resets: usize,
}

impl EchoSuppression {
    /// Records an outgoing message whose echo must be skipped.
    pub fn arm(&mut self, message: &WireMessage) {
        match (Category::from(message.kind()), message.payload()) {
            (Category::Move, Some(pair)) => self.moves.push_back(pair),
            (Category::ActiveBoard, Some(pair)) => self.boards.push_back(pair),
            (Category::Reset, _) => self.resets += 1,
            (category, None) => warn!(%category, "Cannot arm a message without payload"),
        }
    }

    /// Consumes the pending entry matching `message`. Returns true when
    /// `message` is an echo.
    pub fn consume(&mut self, message: &WireMessage) -> bool {
        let queue = match Category::from(message.kind()) {
            Category::Move => &mut self.moves,
            Category::ActiveBoard => &mut self.boards,
            Category::Reset => {
                if self.resets == 0 {
                    return false;
                }
                self.resets -= 1;
                return true;
            }
        };
        if queue.front().copied() == message.payload() {
            queue.pop_front();
            true
        } else {
            false
        }
    }

    /// Checks if any echo of `category` is still expected.
    pub fn is_armed(&self, category: Category) -> bool {
        match category {
            Category::Move => !self.moves.is_empty(),
            Category::ActiveBoard => !self.boards.is_empty(),
            Category::Reset => self.resets > 0,
        }
    }

    /// Forgets every pending echo.
    pub fn clear(&mut self) {
        self.moves.clear();
        self.boards.clear();
        self.resets = 0;
    }
}

/// What an inbound message did to the local state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteEffect {
    /// A remote move was applied.
    Applied(MoveOutcome),
    /// The message was the echo of a local send and was skipped.
    Suppressed(Category),
    /// The state machine refused a remote move; nothing changed.
    Rejected(IllegalMove),
    /// An active-board announcement agreed with the local state.
    BoardConfirmed(Position),
    /// An active-board announcement disagreed with the local state.
    Desynced {
        /// Board the sender announced.
        announced: Position,
        /// Board the local state expected.
        expected: Option<Position>,
    },
    /// Peer traffic from before the host's last reset; dropped unapplied.
    Stale(Category),
    /// The match was reset on the host's order.
    Reset,
    /// Nothing to do.
    Ignored,
}

/// Result of handling one inbound message.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct Handled {
    /// Effect on the local state.
    effect: RemoteEffect,
    /// Messages the host relays on behalf of the sender.
    relay: Vec<Outbound>,
}

impl Handled {
    fn local(effect: RemoteEffect) -> Self {
        Self {
            effect,
            relay: Vec::new(),
        }
    }

    /// Splits into effect and relay messages.
    pub fn into_parts(self) -> (RemoteEffect, Vec<Outbound>) {
        (self.effect, self.relay)
    }
}

/// Per-process synchronization state.
#[derive(Debug, Clone)]
pub struct SyncProtocol {
    role: Role,
    suppression: EchoSuppression,
    // Boards routed by applied remote moves, awaiting their announcement.
    expected_boards: VecDeque<Position>,
    // Host only: set by a local reset, cleared by the next local move.
    // Peer frames arriving in between were sent for the previous match.
    discard_peer_frames: bool,
}

impl SyncProtocol {
    /// Creates the protocol state for `role`.
    pub fn new(role: Role) -> Self {
        Self {
            role,
            suppression: EchoSuppression::default(),
            expected_boards: VecDeque::new(),
            discard_peer_frames: false,
        }
    }

    /// This process's role.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Pending echoes.
    pub fn suppression(&self) -> &EchoSuppression {
        &self.suppression
    }

    /// Checks if peer moves and announcements are currently dropped as
    /// leftovers of the match before the last reset.
    ///
    /// A peer can only play in the new match after it has seen the host's
    /// first move, which the host sends after its `Reset`. Anything the peer
    /// sent before that move reaches the host is from the old match.
    pub fn is_discarding_peer_frames(&self) -> bool {
        self.discard_peer_frames
    }

    /// Serializes a locally applied move, followed by its active-board
    /// announcement when the next board is forced.
    #[instrument(skip(self, outcome), fields(role = %self.role, coordinate = %outcome.coordinate))]
    pub fn on_local_move(&mut self, outcome: &MoveOutcome) -> Vec<Outbound> {
        self.discard_peer_frames = false;
        let route = Route::for_role(self.role);
        let mut messages = vec![match self.role {
            Role::Host => WireMessage::MoveToClient(outcome.coordinate),
            Role::Peer => WireMessage::MoveFromClient(outcome.coordinate),
        }];
        if let Some(board) = outcome.active_board {
            messages.push(match self.role {
                Role::Host => WireMessage::ActiveBoardToClient(board),
                Role::Peer => WireMessage::ActiveBoardFromClient(board),
            });
        }

        messages
            .into_iter()
            .map(|message| {
                self.suppression.arm(&message);
                Outbound::new(route, message)
            })
            .collect()
    }

    /// Announces a local reset. Only the host has anything to send.
    #[instrument(skip(self), fields(role = %self.role))]
    pub fn on_local_reset(&mut self) -> Vec<Outbound> {
        self.expected_boards.clear();
        match self.role {
            Role::Host => {
                let message = WireMessage::Reset;
                self.suppression.arm(&message);
                self.discard_peer_frames = true;
                vec![Outbound::new(Route::Broadcast, message)]
            }
            Role::Peer => {
                self.suppression.clear();
                Vec::new()
            }
        }
    }

    /// Handles one decoded inbound message.
    ///
    /// `mover` is the player a remote move is applied for.
    ///
    /// # Errors
    ///
    /// `ProtocolError::UnexpectedMessage` when the message travels in a
    /// direction this role never accepts. The state is untouched.
    #[instrument(skip(self, state), fields(role = %self.role, kind = %message.kind()))]
    pub fn on_remote_message(
        &mut self,
        state: &mut GameState,
        mover: Player,
        message: WireMessage,
    ) -> Result<Handled, ProtocolError> {
        let kind = message.kind();
        let unexpected = ProtocolError::UnexpectedMessage {
            kind,
            role: self.role,
        };

        match (self.role, message) {
            (Role::Host, WireMessage::MoveFromClient(_) | WireMessage::ActiveBoardFromClient(_))
                if self.discard_peer_frames =>
            {
                info!(%kind, "Dropping peer message sent before the reset");
                Ok(Handled::local(RemoteEffect::Stale(kind.into())))
            }
            (Role::Host, WireMessage::MoveFromClient(coord)) => {
                let effect = self.on_remote_move(state, mover, coord);
                let relay = match effect {
                    RemoteEffect::Applied(_) => {
                        vec![self.relay(WireMessage::MoveToClient(coord))]
                    }
                    _ => Vec::new(),
                };
                Ok(Handled { effect, relay })
            }
            (Role::Host, WireMessage::ActiveBoardFromClient(board)) => {
                let effect = self.on_active_board(state, board);
                let relay = vec![self.relay(WireMessage::ActiveBoardToClient(board))];
                Ok(Handled { effect, relay })
            }
            (Role::Host, WireMessage::Reset) => {
                if self.suppression.consume(&message) {
                    Ok(Handled::local(RemoteEffect::Suppressed(Category::Reset)))
                } else {
                    debug!("Host ignores resets it did not send");
                    Ok(Handled::local(RemoteEffect::Ignored))
                }
            }
            (Role::Host, _) if kind.is_to_client() => {
                if self.suppression.consume(&message) {
                    Ok(Handled::local(RemoteEffect::Suppressed(kind.into())))
                } else {
                    Err(unexpected)
                }
            }
            (Role::Peer, WireMessage::Reset) => {
                Ok(Handled::local(self.on_remote_reset(state)))
            }
            (Role::Peer, _) if kind.is_to_client() && self.suppression.consume(&message) => {
                Ok(Handled::local(RemoteEffect::Suppressed(kind.into())))
            }
            (Role::Peer, WireMessage::MoveToClient(coord)) => {
                Ok(Handled::local(self.on_remote_move(state, mover, coord)))
            }
            (Role::Peer, WireMessage::ActiveBoardToClient(board)) => {
                Ok(Handled::local(self.on_active_board(state, board)))
            }
            _ => {
                warn!(%kind, "Message in the wrong direction");
                Err(unexpected)
            }
        }
    }

    /// Applies a remote move to the local state.
    #[instrument(skip(self, state), fields(coordinate = %coord))]
    pub fn on_remote_move(
        &mut self,
        state: &mut GameState,
        mover: Player,
        coord: Coordinate,
    ) -> RemoteEffect {
        match state.apply_move_as(mover, coord) {
            Ok(outcome) => {
                if let Some(board) = outcome.active_board {
                    self.expected_boards.push_back(board);
                }
                info!(player = %mover, coordinate = %coord, "Remote move applied");
                RemoteEffect::Applied(outcome)
            }
            Err(err) => {
                warn!(error = %err, "Remote move rejected");
                RemoteEffect::Rejected(err)
            }
        }
    }

    /// Checks a remote active-board announcement against the local state.
    ///
    /// The local state derives the active board itself, so the announcement
    /// never overrides it.
    #[instrument(skip(self, state), fields(announced = %board))]
    pub fn on_active_board(&mut self, state: &GameState, board: Position) -> RemoteEffect {
        let expected = self
            .expected_boards
            .pop_front()
            .or_else(|| state.active_board());
        if expected == Some(board) {
            debug!("Active board confirmed");
            RemoteEffect::BoardConfirmed(board)
        } else {
            warn!(?expected, "Active board announcement disagrees with local state");
            RemoteEffect::Desynced {
                announced: board,
                expected,
            }
        }
    }

    /// Applies a host-ordered reset.
    #[instrument(skip(self, state))]
    pub fn on_remote_reset(&mut self, state: &mut GameState) -> RemoteEffect {
        state.reset();
        self.clear();
        RemoteEffect::Reset
    }

    /// Forgets pending echoes and expected announcements.
    pub fn clear(&mut self) {
        self.suppression.clear();
        self.expected_boards.clear();
        self.discard_peer_frames = false;
    }

    fn relay(&mut self, message: WireMessage) -> Outbound {
        self.suppression.arm(&message);
        Outbound::new(Route::Broadcast, message)
    }
}
