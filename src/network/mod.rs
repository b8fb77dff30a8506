//! Network Module
//!
//! Transport and connection lifecycle.
//!
//! ## Architecture
//! - `Transport`: send/receive whole packets, shut down
//! - `TcpTransport`: blocking TCP implementation
//! - `Connection`: state machine, no pipelining, no background threads

mod connection;
mod transport;

pub use connection::{Connection, ConnectionState};
pub use transport::{TcpTransport, Transport};
