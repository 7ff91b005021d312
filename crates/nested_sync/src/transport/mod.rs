//! Byte transports between host and peer.

mod loopback;
mod tcp;

pub use loopback::LoopbackTransport;
pub use tcp::TcpTransport;

use crate::error::TransportError;
use crate::protocol::{Role, Route};
use crate::wire::WireMessage;

/// Moves encoded messages between the two ends of a session.
///
/// A host's broadcast is delivered to every peer and queued back to the host
/// itself, so both ends observe the same message order.
#[async_trait::async_trait]
pub trait Transport: Send {
    /// Sends one message on `route`.
    ///
    /// # Errors
    ///
    /// An invalid route for this end's role, or a closed connection.
    async fn send(&mut self, route: Route, message: &WireMessage) -> Result<(), TransportError>;

    /// Waits for the next frame body. `Ok(None)` means the remote end closed
    /// the connection.
    ///
    /// Must be cancel safe: the driver races it against local commands.
    async fn recv(&mut self) -> Result<Option<Vec<u8>>, TransportError>;
}

pub(crate) fn check_route(role: Role, route: Route) -> Result<(), TransportError> {
    if Route::for_role(role) == route {
        Ok(())
    } else {
        Err(TransportError::new(format!(
            "the {role} cannot send on route {route}"
        )))
    }
}
