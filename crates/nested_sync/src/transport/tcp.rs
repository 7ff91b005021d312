//! TCP transport with length-prefixed frames. The host accepts one peer.

use super::{Transport, check_route};
use crate::error::TransportError;
use crate::protocol::{Role, Route};
use crate::wire::{FrameReader, WireMessage};
use std::collections::VecDeque;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{info, instrument};

/// A framed TCP connection.
#[derive(Debug)]
pub struct TcpTransport {
    role: Role,
    stream: TcpStream,
    frames: FrameReader,
    echo: VecDeque<Vec<u8>>,
}

impl TcpTransport {
    /// Listens on `port` on all interfaces and waits for one peer.
    ///
    /// # Errors
    ///
    /// Bind or accept failures.
    #[instrument]
    pub async fn host(port: u16) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(("0.0.0.0", port)).await?;
        info!(addr = ?listener.local_addr()?, "Waiting for a peer");
        Self::accept(&listener).await
    }

    /// Accepts one peer on an already bound listener.
    ///
    /// # Errors
    ///
    /// Accept failures.
    #[instrument(skip(listener))]
    pub async fn accept(listener: &TcpListener) -> Result<Self, TransportError> {
        let (stream, addr) = listener.accept().await?;
        info!(%addr, "Peer connected");
        Self::new(Role::Host, stream)
    }

    /// Connects to a host.
    ///
    /// # Errors
    ///
    /// Resolution or connection failures.
    #[instrument]
    pub async fn join(address: &str, port: u16) -> Result<Self, TransportError> {
        let stream = TcpStream::connect((address, port)).await?;
        info!(address, port, "Connected to host");
        Self::new(Role::Peer, stream)
    }

    fn new(role: Role, stream: TcpStream) -> Result<Self, TransportError> {
        stream.set_nodelay(true)?;
        Ok(Self {
            role,
            stream,
            frames: FrameReader::new(),
            echo: VecDeque::new(),
        })
    }

    /// This end's role.
    pub fn role(&self) -> Role {
        self.role
    }
}

#[async_trait::async_trait]
impl Transport for TcpTransport {
    #[instrument(skip(self, message), fields(role = %self.role, kind = %message.kind()))]
    async fn send(&mut self, route: Route, message: &WireMessage) -> Result<(), TransportError> {
        check_route(self.role, route)?;

        let mut frame = Vec::with_capacity(14);
        message.pack(&mut frame)?;
        self.stream.write_all(&frame).await?;

        if route == Route::Broadcast {
            self.echo.push_back(frame[4..].to_vec());
        }
        Ok(())
    }

    async fn recv(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        let mut chunk = [0u8; 1024];
        loop {
            if let Some(body) = self.echo.pop_front() {
                return Ok(Some(body));
            }
            if let Some(body) = self
                .frames
                .next_frame()
                .map_err(|e| TransportError::new(e.to_string()))?
            {
                return Ok(Some(body));
            }

            let len = self.stream.read(&mut chunk).await?;
            if len == 0 {
                info!(role = %self.role, "Remote end closed the connection");
                return Ok(None);
            }
            self.frames.extend(&chunk[..len]);
        }
    }
}
