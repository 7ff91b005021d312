//! The event loop serializing local commands and inbound frames.

use crate::error::SessionError;
use crate::protocol::{Outbound, RemoteEffect};
use crate::session::GameSession;
use crate::transport::Transport;
use crate::wire::WireMessage;
use nested_tictactoe::{Coordinate, IllegalMove, MoveOutcome, Position};
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

/// Local input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Play a mark.
    Move(Coordinate),
    /// Start a new match.
    Reset,
}

/// Where a change came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum Origin {
    /// Local input.
    #[display("local")]
    Local,
    /// The other end of the connection.
    #[display("remote")]
    Remote,
}

/// Messages sent from the driver to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A move changed the board.
    MoveApplied {
        /// Who initiated it.
        origin: Origin,
        /// What the move did.
        outcome: MoveOutcome,
    },
    /// The board was reset.
    Reset {
        /// Who initiated it.
        origin: Origin,
    },
    /// Local input was refused; nothing changed.
    LocalRejected(SessionError),
    /// A remote move was refused; nothing changed.
    RemoteRejected(IllegalMove),
    /// The remote end announced a different active board.
    Desynced {
        /// Board the remote end announced.
        announced: Position,
        /// Board derived locally.
        expected: Option<Position>,
    },
    /// The connection is gone. Local resets are allowed from now on.
    Disconnected,
}

/// Drives one [`GameSession`] over a [`Transport`].
pub struct Driver<T: Transport> {
    session: GameSession,
    transport: T,
    commands: mpsc::UnboundedReceiver<Command>,
    events: mpsc::UnboundedSender<SessionEvent>,
}

impl<T: Transport> Driver<T> {
    /// Creates a driver.
    pub fn new(
        session: GameSession,
        transport: T,
        commands: mpsc::UnboundedReceiver<Command>,
        events: mpsc::UnboundedSender<SessionEvent>,
    ) -> Self {
        Self {
            session,
            transport,
            commands,
            events,
        }
    }

    /// Runs until the command channel closes, then hands the session back.
    ///
    /// Commands take priority over inbound frames; each item is handled to
    /// completion before the next one is looked at.
    #[instrument(skip(self), fields(role = %self.session.role()))]
    pub async fn run(mut self) -> GameSession {
        info!("Starting session driver");

        loop {
            tokio::select! {
                biased;
                command = self.commands.recv() => match command {
                    Some(command) => self.handle_command(command).await,
                    None => {
                        info!("Command channel closed");
                        break;
                    }
                },
                frame = self.transport.recv(), if self.session.is_connected() => match frame {
                    Ok(Some(body)) => self.handle_frame(&body).await,
                    Ok(None) => self.disconnect("remote end closed the connection"),
                    Err(e) => self.disconnect(&e.to_string()),
                },
            }
        }

        self.session
    }

    #[instrument(skip(self))]
    async fn handle_command(&mut self, command: Command) {
        match command {
            Command::Move(coord) => match self.session.local_move(coord) {
                Ok((outcome, outbound)) => {
                    self.emit(SessionEvent::MoveApplied {
                        origin: Origin::Local,
                        outcome,
                    });
                    self.send_all(outbound).await;
                }
                Err(e) => {
                    debug!(error = %e, "Local move refused");
                    self.emit(SessionEvent::LocalRejected(e));
                }
            },
            Command::Reset => match self.session.local_reset() {
                Ok(outbound) => {
                    self.emit(SessionEvent::Reset {
                        origin: Origin::Local,
                    });
                    self.send_all(outbound).await;
                }
                Err(e) => {
                    debug!(error = %e, "Local reset refused");
                    self.emit(SessionEvent::LocalRejected(e));
                }
            },
        }
    }

    async fn handle_frame(&mut self, body: &[u8]) {
        let message = match WireMessage::decode(body) {
            Ok(message) => message,
            Err(e) => {
                warn!(error = %e, "Dropping malformed frame");
                return;
            }
        };

        match self.session.remote_message(message) {
            Ok(handled) => {
                let (effect, relay) = handled.into_parts();
                self.dispatch(effect);
                self.send_all(relay).await;
            }
            Err(e) => warn!(error = %e, "Dropping message"),
        }
    }

    fn dispatch(&self, effect: RemoteEffect) {
        match effect {
            RemoteEffect::Applied(outcome) => self.emit(SessionEvent::MoveApplied {
                origin: Origin::Remote,
                outcome,
            }),
            RemoteEffect::Rejected(err) => self.emit(SessionEvent::RemoteRejected(err)),
            RemoteEffect::Desynced {
                announced,
                expected,
            } => self.emit(SessionEvent::Desynced {
                announced,
                expected,
            }),
            RemoteEffect::Reset => self.emit(SessionEvent::Reset {
                origin: Origin::Remote,
            }),
            RemoteEffect::Suppressed(category) => debug!(%category, "Echo suppressed"),
            RemoteEffect::Stale(category) => debug!(%category, "Stale peer message dropped"),
            RemoteEffect::BoardConfirmed(_) | RemoteEffect::Ignored => {}
        }
    }

    async fn send_all(&mut self, outbound: Vec<Outbound>) {
        for out in outbound {
            if !self.session.is_connected() {
                return;
            }
            if let Err(e) = self.transport.send(*out.route(), out.message()).await {
                self.disconnect(&e.to_string());
            }
        }
    }

    fn disconnect(&mut self, reason: &str) {
        warn!(reason, "Connection lost");
        self.session.disconnect();
        self.emit(SessionEvent::Disconnected);
    }

    fn emit(&self, event: SessionEvent) {
        if self.events.send(event).is_err() {
            debug!("Event receiver dropped");
        }
    }
}
