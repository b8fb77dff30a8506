//! Shared test helpers: schemas, reply builders and scripted peers.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::rc::Rc;
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam::channel::{unbounded, Receiver};
use rowwire::network::Transport;
use rowwire::{ColumnType, Result, RowWireError, Schema};

// =============================================================================
// Schemas
// =============================================================================

/// User(1) and Account(2), Account.user referencing User
pub fn bank_schema() -> Schema {
    Schema::builder()
        .table(
            "User",
            [
                ("firstName", ColumnType::String),
                ("lastName", ColumnType::String),
                ("height", ColumnType::Float),
                ("age", ColumnType::Integer),
            ],
        )
        .table(
            "Account",
            [
                ("user", ColumnType::foreign("User")),
                ("type", ColumnType::String),
                ("balance", ColumnType::Float),
            ],
        )
        .build()
        .unwrap()
}

// =============================================================================
// Reply Builders
// =============================================================================

/// Big-endian packet builder
#[derive(Default)]
pub struct Packet(Vec<u8>);

impl Packet {
    pub fn status(code: i32) -> Self {
        Packet(code.to_be_bytes().to_vec())
    }

    pub fn ok() -> Self {
        Self::status(1)
    }

    pub fn i32(mut self, v: i32) -> Self {
        self.0.extend_from_slice(&v.to_be_bytes());
        self
    }

    pub fn i64(mut self, v: i64) -> Self {
        self.0.extend_from_slice(&v.to_be_bytes());
        self
    }

    pub fn f64(mut self, v: f64) -> Self {
        self.0.extend_from_slice(&v.to_be_bytes());
        self
    }

    pub fn bytes(mut self, b: &[u8]) -> Self {
        self.0.extend_from_slice(b);
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.0
    }
}

// =============================================================================
// In-memory Transport
// =============================================================================

#[derive(Default)]
pub struct TransportLog {
    pub sent: Vec<Vec<u8>>,
    pub shut_down: bool,
}

/// Replays canned packets and records what was sent
pub struct ScriptedTransport {
    replies: VecDeque<Vec<u8>>,
    log: Rc<RefCell<TransportLog>>,
}

impl ScriptedTransport {
    pub fn new(replies: Vec<Vec<u8>>) -> (Self, Rc<RefCell<TransportLog>>) {
        let log = Rc::new(RefCell::new(TransportLog::default()));
        let transport = Self {
            replies: replies.into(),
            log: Rc::clone(&log),
        };
        (transport, log)
    }

    /// Greets with OK, then replays `replies`
    pub fn greeting_ok(replies: Vec<Vec<u8>>) -> (Self, Rc<RefCell<TransportLog>>) {
        let mut all = vec![Packet::ok().build()];
        all.extend(replies);
        Self::new(all)
    }
}

impl Transport for ScriptedTransport {
    fn send(&mut self, bytes: &[u8]) -> Result<()> {
        self.log.borrow_mut().sent.push(bytes.to_vec());
        Ok(())
    }

    fn receive(&mut self) -> Result<Vec<u8>> {
        self.replies.pop_front().ok_or_else(|| {
            RowWireError::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "script exhausted",
            ))
        })
    }

    fn shutdown(&mut self) -> Result<()> {
        self.log.borrow_mut().shut_down = true;
        Ok(())
    }
}

// =============================================================================
// Scripted TCP Server
// =============================================================================

/// Accepts one client, writes `greeting`, then answers each request with
/// the next reply. Every packet read is forwarded on the returned channel,
/// including the EXIT sent on close.
pub fn spawn_server(greeting: Vec<u8>, replies: Vec<Vec<u8>>) -> (String, Receiver<Vec<u8>>, JoinHandle<()>) {
    spawn_chunked_server(greeting, replies.into_iter().map(|reply| vec![reply]).collect())
}

/// Like [`spawn_server`], but writes each reply as separate parts with a
/// pause between them
pub fn spawn_chunked_server(
    greeting: Vec<u8>,
    replies: Vec<Vec<Vec<u8>>>,
) -> (String, Receiver<Vec<u8>>, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    let (tx, rx) = unbounded();

    let handle = std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        stream.set_nodelay(true).unwrap();
        stream.write_all(&greeting).unwrap();

        let mut replies = replies.into_iter();
        let mut buf = vec![0u8; 16384];
        loop {
            let n = match stream.read(&mut buf) {
                Ok(0) | Err(_) => break,
                Ok(n) => n,
            };
            if tx.send(buf[..n].to_vec()).is_err() {
                break;
            }
            let Some(parts) = replies.next() else {
                continue;
            };
            for (i, part) in parts.iter().enumerate() {
                if i > 0 {
                    std::thread::sleep(Duration::from_millis(50));
                }
                if stream.write_all(part).is_err() {
                    return;
                }
            }
        }
    });

    (addr, rx, handle)
}
