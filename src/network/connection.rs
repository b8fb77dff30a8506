//! Connection
//!
//! Owns the transport and enforces the connection lifecycle:
//! `Unconnected → Connected → Closed`. Closed is final; a closed
//! connection is never re-opened implicitly.

use bytes::BytesMut;

use crate::config::Config;
use crate::error::{Result, RowWireError};
use crate::protocol::{decode_handshake, response_len, Request, StatusCode, HANDSHAKE_LEN};

use super::transport::{TcpTransport, Transport};

/// Lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Unconnected,
    Connected,
    Closed,
}

/// A single half-duplex connection to the server
///
/// One request in flight at a time; there is no internal locking, so a
/// connection shared between threads needs external serialization.
pub struct Connection<T: Transport = TcpTransport> {
    transport: Option<T>,
    state: ConnectionState,

    /// Bytes received but not yet framed into a response
    pending: BytesMut,
}

impl<T: Transport> Default for Connection<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Transport> Connection<T> {
    /// Create an unconnected connection
    pub fn new() -> Self {
        Self {
            transport: None,
            state: ConnectionState::Unconnected,
            pending: BytesMut::new(),
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    fn check_connectable(&self) -> Result<()> {
        match self.state {
            ConnectionState::Unconnected => Ok(()),
            ConnectionState::Connected => Err(RowWireError::AlreadyConnected),
            ConnectionState::Closed => Err(RowWireError::NotConnected),
        }
    }

    /// Take ownership of an open transport and wait for the server greeting
    ///
    /// On anything but an OK greeting the transport is shut down and the
    /// connection stays unconnected.
    pub fn connect_with(&mut self, mut transport: T) -> Result<()> {
        self.check_connectable()?;

        self.pending.clear();
        let greeting = read_frame(&mut transport, &mut self.pending, |bytes| {
            (bytes.len() >= HANDSHAKE_LEN).then_some(HANDSHAKE_LEN)
        })
        .and_then(|bytes| decode_handshake(&bytes));
        match greeting {
            Ok(StatusCode::Ok) => {
                tracing::debug!("Connection established");
                self.transport = Some(transport);
                self.state = ConnectionState::Connected;
                Ok(())
            }
            Ok(status) => {
                tracing::warn!("Server rejected connection: {}", status);
                let _ = transport.shutdown();
                Err(RowWireError::from_status(status, false))
            }
            Err(e) => {
                tracing::warn!("Handshake failed: {}", e);
                let _ = transport.shutdown();
                Err(e)
            }
        }
    }

    /// Send one request packet
    pub fn send(&mut self, bytes: &[u8]) -> Result<()> {
        tracing::trace!("Sending {} bytes", bytes.len());
        self.transport_mut()?.send(bytes)
    }

    /// Block until one complete response to `request` has arrived
    pub fn receive(&mut self, request: &Request) -> Result<Vec<u8>> {
        if self.state != ConnectionState::Connected {
            return Err(RowWireError::NotConnected);
        }
        let transport = self.transport.as_mut().ok_or(RowWireError::NotConnected)?;

        let op = request.op_code();
        let response = read_frame(transport, &mut self.pending, |bytes| response_len(op, bytes))?;
        tracing::trace!("Received {} bytes", response.len());
        Ok(response)
    }

    /// Send a request and block for its response
    pub fn round_trip(&mut self, request: &Request) -> Result<Vec<u8>> {
        self.send(&request.encode())?;
        self.receive(request)
    }

    /// Say goodbye and shut the transport down
    ///
    /// The connection is Closed afterwards even if the transport reported
    /// an error while shutting down.
    pub fn close(&mut self) -> Result<()> {
        if self.state != ConnectionState::Connected {
            return Err(RowWireError::NotConnected);
        }

        self.state = ConnectionState::Closed;
        self.pending.clear();
        let mut transport = self.transport.take().ok_or(RowWireError::NotConnected)?;

        if let Err(e) = transport.send(&Request::Exit.encode()) {
            tracing::warn!("Failed to send EXIT: {}", e);
        }
        transport.shutdown()?;

        tracing::debug!("Connection closed");
        Ok(())
    }

    fn transport_mut(&mut self) -> Result<&mut T> {
        match self.state {
            ConnectionState::Connected => self.transport.as_mut().ok_or(RowWireError::NotConnected),
            _ => Err(RowWireError::NotConnected),
        }
    }
}

/// Accumulate chunks from `transport` until `frame_len` finds a complete
/// frame, then split it off. Anything received past the frame is dropped,
/// since the server never sends unsolicited data.
fn read_frame<T, F>(transport: &mut T, pending: &mut BytesMut, frame_len: F) -> Result<Vec<u8>>
where
    T: Transport,
    F: Fn(&[u8]) -> Option<usize>,
{
    loop {
        if let Some(len) = frame_len(&pending[..]) {
            let frame = pending.split_to(len);
            if !pending.is_empty() {
                tracing::warn!("Discarding {} bytes past the end of a response", pending.len());
                pending.clear();
            }
            return Ok(frame.to_vec());
        }

        let chunk = match transport.receive() {
            Ok(chunk) => chunk,
            Err(e) => {
                // a half-read response must not leak into the next one
                pending.clear();
                return Err(e);
            }
        };
        tracing::trace!("Read chunk of {} bytes ({} buffered)", chunk.len(), pending.len());
        pending.extend_from_slice(&chunk);
    }
}

impl Connection<TcpTransport> {
    /// Open a TCP connection to `config.server_addr`
    pub fn connect(&mut self, config: &Config) -> Result<()> {
        self.check_connectable()?;
        tracing::debug!("Connecting to {}", config.server_addr);
        let transport = TcpTransport::connect(config)?;
        tracing::debug!("TCP connection open to {}", transport.peer_addr());
        self.connect_with(transport)
    }
}
