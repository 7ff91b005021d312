//! In-process transport over tokio channels.

use super::{Transport, check_route};
use crate::error::TransportError;
use crate::protocol::{Role, Route};
use crate::wire::WireMessage;
use std::collections::VecDeque;
use tokio::sync::mpsc;
use tracing::{debug, instrument};

/// One end of an in-memory connection.
///
/// Carries frame bodies; no length prefix is needed on a channel.
#[derive(Debug)]
pub struct LoopbackTransport {
    role: Role,
    echo: VecDeque<Vec<u8>>,
    outbox: Option<mpsc::UnboundedSender<Vec<u8>>>,
    inbox: Option<mpsc::UnboundedReceiver<Vec<u8>>>,
}

impl LoopbackTransport {
    /// Creates a connected host and peer.
    pub fn pair() -> (Self, Self) {
        let (host_tx, peer_rx) = mpsc::unbounded_channel();
        let (peer_tx, host_rx) = mpsc::unbounded_channel();
        let host = Self {
            role: Role::Host,
            echo: VecDeque::new(),
            outbox: Some(host_tx),
            inbox: Some(host_rx),
        };
        let peer = Self {
            role: Role::Peer,
            echo: VecDeque::new(),
            outbox: Some(peer_tx),
            inbox: Some(peer_rx),
        };
        (host, peer)
    }

    /// Creates an end with nobody on the other side. A solo host still
    /// receives its own broadcasts.
    pub fn solo(role: Role) -> Self {
        Self {
            role,
            echo: VecDeque::new(),
            outbox: None,
            inbox: None,
        }
    }

    /// This end's role.
    pub fn role(&self) -> Role {
        self.role
    }
}

#[async_trait::async_trait]
impl Transport for LoopbackTransport {
    #[instrument(skip(self, message), fields(role = %self.role, kind = %message.kind()))]
    async fn send(&mut self, route: Route, message: &WireMessage) -> Result<(), TransportError> {
        check_route(self.role, route)?;

        let mut body = Vec::with_capacity(10);
        message.write_body(&mut body)?;

        if route == Route::Broadcast {
            self.echo.push_back(body.clone());
        }
        match &self.outbox {
            Some(outbox) => outbox
                .send(body)
                .map_err(|_| TransportError::new("remote end dropped")),
            None => {
                debug!("No remote end, message stays local");
                Ok(())
            }
        }
    }

    async fn recv(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        if let Some(body) = self.echo.pop_front() {
            return Ok(Some(body));
        }
        match &mut self.inbox {
            Some(inbox) => Ok(inbox.recv().await),
            None => std::future::pending().await,
        }
    }
}
