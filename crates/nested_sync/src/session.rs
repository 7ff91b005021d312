//! One process's view of a match: the game state plus its sync protocol.

use crate::error::{ProtocolError, SessionError};
use crate::protocol::{Handled, Outbound, Role, SyncProtocol};
use crate::wire::WireMessage;
use derive_getters::Getters;
use nested_tictactoe::{Coordinate, GameState, MoveOutcome, Player};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// Session settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct SessionConfig {
    /// Host or peer.
    role: Role,
    /// Plays every move as this player instead of alternating.
    force_turn: Option<Player>,
    /// Both seats share this process; local input is never turn-gated.
    hotseat: bool,
}

impl SessionConfig {
    /// Creates settings for `role` with alternating turns.
    pub fn new(role: Role) -> Self {
        Self {
            role,
            force_turn: None,
            hotseat: false,
        }
    }

    /// Sets the turn override.
    pub fn with_force_turn(mut self, force_turn: Option<Player>) -> Self {
        self.force_turn = force_turn;
        self
    }

    /// Enables or disables hot-seat play.
    pub fn with_hotseat(mut self, hotseat: bool) -> Self {
        self.hotseat = hotseat;
        self
    }
}

/// A match as seen by one process.
#[derive(Debug, Clone)]
pub struct GameSession {
    config: SessionConfig,
    state: GameState,
    protocol: SyncProtocol,
    connected: bool,
}

impl GameSession {
    /// Creates a session with a fresh board.
    #[instrument]
    pub fn new(config: SessionConfig) -> Self {
        info!(role = %config.role, seat = %config.role.seat(), "Creating game session");
        Self {
            config,
            state: GameState::new(),
            protocol: SyncProtocol::new(config.role),
            connected: true,
        }
    }

    /// The session settings.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The shared game state.
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// The sync protocol state.
    pub fn protocol(&self) -> &SyncProtocol {
        &self.protocol
    }

    /// Host or peer.
    pub fn role(&self) -> Role {
        self.config.role
    }

    /// The seat local input plays.
    pub fn seat(&self) -> Player {
        self.config.role.seat()
    }

    /// The player the next move is applied for.
    pub fn mover(&self) -> Player {
        self.config.force_turn.unwrap_or(self.state.current_turn())
    }

    /// Checks if the remote end is still reachable.
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Marks the connection as lost. Pending echoes can never arrive now.
    #[instrument(skip(self), fields(role = %self.config.role))]
    pub fn disconnect(&mut self) {
        if self.connected {
            warn!("Session disconnected");
        }
        self.connected = false;
        self.protocol.clear();
    }

    /// Plays a local move and returns the messages announcing it.
    ///
    /// # Errors
    ///
    /// `NotYourTurn` when it is the other seat's turn, or the wrapped
    /// `IllegalMove`. Nothing changes on error.
    #[instrument(skip(self), fields(role = %self.config.role, coordinate = %coord))]
    pub fn local_move(
        &mut self,
        coord: Coordinate,
    ) -> Result<(MoveOutcome, Vec<Outbound>), SessionError> {
        let mover = self.mover();
        let gated = !self.config.hotseat && self.config.force_turn.is_none();
        if gated && mover != self.seat() {
            debug!(turn = %mover, seat = %self.seat(), "Input while waiting for opponent");
            return Err(SessionError::NotYourTurn { turn: mover });
        }

        let outcome = self.state.apply_move_as(mover, coord)?;
        let outbound = if self.connected {
            self.protocol.on_local_move(&outcome)
        } else {
            Vec::new()
        };
        Ok((outcome, outbound))
    }

    /// Resets the match locally and returns the messages announcing it.
    ///
    /// # Errors
    ///
    /// `ResetNotPermitted` for a peer that is still connected to its host.
    #[instrument(skip(self), fields(role = %self.config.role, connected = self.connected))]
    pub fn local_reset(&mut self) -> Result<Vec<Outbound>, SessionError> {
        if self.config.role == Role::Peer && self.connected {
            return Err(SessionError::ResetNotPermitted);
        }

        self.state.reset();
        if self.connected {
            Ok(self.protocol.on_local_reset())
        } else {
            self.protocol.clear();
            Ok(Vec::new())
        }
    }

    /// Handles a decoded inbound message.
    ///
    /// # Errors
    ///
    /// See [`SyncProtocol::on_remote_message`].
    pub fn remote_message(&mut self, message: WireMessage) -> Result<Handled, ProtocolError> {
        let mover = self.mover();
        self.protocol
            .on_remote_message(&mut self.state, mover, message)
    }
}
