//! Transport
//!
//! Moves raw bytes between the client and the server. Framing responses
//! is left to the connection; the protocol engine never touches the
//! socket directly.

use std::io::{BufWriter, ErrorKind, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};

use crate::config::Config;
use crate::error::{Result, RowWireError};

/// Byte-stream transport
pub trait Transport {
    /// Write one complete request
    fn send(&mut self, bytes: &[u8]) -> Result<()>;

    /// Block until some bytes arrive and return them
    ///
    /// A response may be split over several calls. End of stream is an
    /// `UnexpectedEof` I/O error.
    fn receive(&mut self) -> Result<Vec<u8>>;

    /// Shut both directions down; the transport is unusable afterwards
    fn shutdown(&mut self) -> Result<()>;
}

/// Blocking TCP transport
///
/// Each receive is a single read of up to `max_packet_size` bytes.
pub struct TcpTransport {
    /// TCP stream reader
    reader: TcpStream,

    /// TCP stream writer (buffered so a request leaves in one write)
    writer: BufWriter<TcpStream>,

    /// Read buffer size
    max_packet_size: usize,

    /// Peer address for logging
    peer_addr: String,
}

impl TcpTransport {
    /// Open a TCP connection using the configured address and timeouts
    pub fn connect(config: &Config) -> Result<Self> {
        config.validate()?;

        let addrs: Vec<SocketAddr> = config.server_addr.to_socket_addrs()?.collect();
        if addrs.is_empty() {
            return Err(RowWireError::Config(format!(
                "{} did not resolve to any address",
                config.server_addr
            )));
        }

        let mut last_err = None;
        for addr in &addrs {
            let attempt = match config.connect_timeout() {
                Some(timeout) => TcpStream::connect_timeout(addr, timeout),
                None => TcpStream::connect(addr),
            };
            match attempt {
                Ok(stream) => return Self::from_stream(stream, config),
                Err(e) => {
                    tracing::debug!("Connect to {} failed: {}", addr, e);
                    last_err = Some(e);
                }
            }
        }

        Err(last_err
            .map(RowWireError::Io)
            .unwrap_or_else(|| RowWireError::Config("no address to connect to".to_string())))
    }

    /// Wrap an already connected stream
    pub fn from_stream(stream: TcpStream, config: &Config) -> Result<Self> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        stream.set_nodelay(config.nodelay)?;
        stream.set_read_timeout(config.read_timeout())?;
        stream.set_write_timeout(config.write_timeout())?;

        // Clone stream for separate read/write handles
        let read_stream = stream.try_clone()?;

        Ok(Self {
            reader: read_stream,
            writer: BufWriter::new(stream),
            max_packet_size: config.max_packet_size,
            peer_addr,
        })
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }
}

impl Transport for TcpTransport {
    fn send(&mut self, bytes: &[u8]) -> Result<()> {
        self.writer.write_all(bytes)?;
        self.writer.flush()?;
        Ok(())
    }

    fn receive(&mut self) -> Result<Vec<u8>> {
        let mut packet = vec![0u8; self.max_packet_size];
        let read = loop {
            match self.reader.read(&mut packet) {
                Ok(n) => break n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        };

        if read == 0 {
            return Err(RowWireError::Io(std::io::Error::new(
                ErrorKind::UnexpectedEof,
                format!("{} closed the connection", self.peer_addr),
            )));
        }

        packet.truncate(read);
        Ok(packet)
    }

    fn shutdown(&mut self) -> Result<()> {
        // The socket goes down even when the flush fails; the first error wins
        let flushed = self.writer.flush();
        let closed = match self.writer.get_ref().shutdown(Shutdown::Both) {
            Ok(()) => Ok(()),
            // Peer already hung up; the socket is down either way
            Err(e) if e.kind() == ErrorKind::NotConnected => Ok(()),
            Err(e) => Err(e),
        };

        flushed?;
        closed?;
        Ok(())
    }
}
