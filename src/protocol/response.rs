//! Response definitions and decoding
//!
//! Every response starts with a 4-byte status code. Failures stop there;
//! successful responses carry an operation-specific body:
//!
//! - INSERT: id (8) + version (8)
//! - UPDATE: [id (8)] + version (8)
//! - DROP:   nothing
//! - GET:    version (8) + count (4) + count values
//! - SCAN:   count (4) + count ids (8 each)

use super::buffer::ResponseBuf;
use super::types::{OpCode, PrimaryKey, StatusCode, Version};
use super::value::{decode_value, Value};
use crate::error::{Result, RowWireError};

/// A decoded response
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// Any non-OK status
    Failed(StatusCode),

    Inserted { key: PrimaryKey, version: Version },

    /// `key` is `None` when the server only reports the new version
    Updated {
        key: Option<PrimaryKey>,
        version: Version,
    },

    Dropped,

    Row { version: Version, values: Vec<Value> },

    Keys(Vec<PrimaryKey>),
}

/// Decode the reply to a request with the given op code
pub fn decode_response(op: OpCode, bytes: &[u8]) -> Result<Response> {
    let mut buf = ResponseBuf::new(bytes);
    let status = read_status(&mut buf)?;

    if !status.is_ok() {
        return Ok(Response::Failed(status));
    }

    let response = match op {
        OpCode::Insert => Response::Inserted {
            key: buf.read_i64("insert id")?,
            version: buf.read_i64("insert version")?,
        },
        OpCode::Update => decode_update(&mut buf)?,
        OpCode::Drop => Response::Dropped,
        OpCode::Get => decode_row(&mut buf)?,
        OpCode::Scan => decode_keys(&mut buf)?,
        OpCode::Exit => {
            return Err(RowWireError::Protocol(
                "EXIT has no response".to_string(),
            ))
        }
    };

    if !buf.is_empty() {
        tracing::trace!(
            "{} trailing bytes after {:?} response",
            buf.remaining(),
            op
        );
    }

    Ok(response)
}

/// Size of the status-only greeting sent right after accept
pub const HANDSHAKE_LEN: usize = 4;

/// Length of the first complete response to `op` at the start of `bytes`
///
/// Returns `None` while more bytes are needed. Malformed input (unknown
/// status, negative count or length) ends the frame where it is found, so
/// [`decode_response`] reports it instead of the reader waiting forever.
///
/// An UPDATE body is 8 or 16 bytes; 16 is assumed only once that many
/// have arrived.
pub fn response_len(op: OpCode, bytes: &[u8]) -> Option<usize> {
    let mut frame = Frame { bytes, pos: 0 };

    if frame.i32()? != StatusCode::Ok.as_i32() {
        return Some(frame.pos);
    }

    match op {
        OpCode::Insert => frame.skip(16)?,
        OpCode::Update => {
            let body = if bytes.len() - frame.pos >= 16 { 16 } else { 8 };
            frame.skip(body)?
        }
        OpCode::Drop | OpCode::Exit => {}
        OpCode::Get => {
            frame.skip(8)?;
            let count = frame.i32()?;
            for _ in 0..count.max(0) {
                frame.skip(4)?;
                let len = frame.i32()?;
                if len < 0 {
                    break;
                }
                frame.skip(len as usize)?;
            }
        }
        OpCode::Scan => {
            let count = frame.i32()?;
            frame.skip((count.max(0) as usize).checked_mul(8)?)?;
        }
    }

    Some(frame.pos)
}

/// Walks a partial response without decoding it
struct Frame<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl Frame<'_> {
    fn skip(&mut self, n: usize) -> Option<()> {
        let end = self.pos.checked_add(n)?;
        if end > self.bytes.len() {
            return None;
        }
        self.pos = end;
        Some(())
    }

    fn i32(&mut self) -> Option<i32> {
        let start = self.pos;
        self.skip(4)?;
        let raw: [u8; 4] = self.bytes[start..self.pos].try_into().ok()?;
        Some(i32::from_be_bytes(raw))
    }
}

/// Decode the status the server sends right after accepting a connection
pub fn decode_handshake(bytes: &[u8]) -> Result<StatusCode> {
    read_status(&mut ResponseBuf::new(bytes))
}

fn read_status(buf: &mut ResponseBuf<'_>) -> Result<StatusCode> {
    let code = buf.read_i32("status code")?;
    StatusCode::from_wire(code)
        .ok_or_else(|| RowWireError::Protocol(format!("Unknown response status: {}", code)))
}

fn decode_update(buf: &mut ResponseBuf<'_>) -> Result<Response> {
    if buf.remaining() >= 16 {
        return Ok(Response::Updated {
            key: Some(buf.read_i64("update id")?),
            version: buf.read_i64("update version")?,
        });
    }

    Ok(Response::Updated {
        key: None,
        version: buf.read_i64("update version")?,
    })
}

fn decode_row(buf: &mut ResponseBuf<'_>) -> Result<Response> {
    let version = buf.read_i64("row version")?;
    let count = read_count(buf, "row column count")?;

    let mut values = Vec::with_capacity(count.min(buf.remaining() / 8));
    for _ in 0..count {
        values.push(decode_value(buf)?);
    }

    Ok(Response::Row { version, values })
}

fn decode_keys(buf: &mut ResponseBuf<'_>) -> Result<Response> {
    let count = read_count(buf, "scan match count")?;

    let mut keys = Vec::with_capacity(count.min(buf.remaining() / 8));
    for _ in 0..count {
        keys.push(buf.read_i64("scan id")?);
    }

    Ok(Response::Keys(keys))
}

fn read_count(buf: &mut ResponseBuf<'_>, what: &str) -> Result<usize> {
    let count = buf.read_i32(what)?;
    if count < 0 {
        return Err(RowWireError::Protocol(format!("Negative {}: {}", what, count)));
    }
    Ok(count as usize)
}
