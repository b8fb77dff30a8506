//! Value codec
//!
//! Every value travels as a `(tag: i32, length: i32, payload)` triple.
//! Integers, floats and foreign keys carry an 8-byte big-endian payload;
//! strings carry their bytes zero-padded to a multiple of 4, and the
//! length field holds the padded length. Null carries no payload.

use std::fmt;

use bytes::{BufMut, BytesMut};

use super::buffer::ResponseBuf;
use super::types::TypeTag;
use crate::error::{Result, RowWireError};
use crate::schema::{ColumnDef, ColumnKind};

/// String payloads are aligned to this many bytes
pub const STRING_ALIGN: usize = 4;

/// Payload size of integers, floats and foreign keys
pub const FIXED_LEN: usize = 8;

/// Values of one row, in column order
pub type Row = Vec<Value>;

/// A typed value as it appears in a row or scan predicate
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Float(f64),
    Text(String),
    /// Primary key of a row in another table
    Foreign(i64),
}

impl Value {
    /// Wire tag for this value
    pub fn tag(&self) -> TypeTag {
        match self {
            Value::Null => TypeTag::Null,
            Value::Integer(_) => TypeTag::Integer,
            Value::Float(_) => TypeTag::Float,
            Value::Text(_) => TypeTag::String,
            Value::Foreign(_) => TypeTag::Foreign,
        }
    }

    /// Length of the payload as written in the length field
    pub fn payload_len(&self) -> usize {
        match self {
            Value::Null => 0,
            Value::Integer(_) | Value::Float(_) | Value::Foreign(_) => FIXED_LEN,
            Value::Text(s) => padded_len(s.len()),
        }
    }

    /// Total encoded size including tag and length fields
    pub fn encoded_len(&self) -> usize {
        8 + self.payload_len()
    }

    /// Write the triple using this value's own tag
    pub fn encode(&self, buf: &mut BytesMut) {
        self.encode_as(self.tag(), buf);
    }

    /// Write the triple under `tag`, keeping this value's length and payload
    pub fn encode_as(&self, tag: TypeTag, buf: &mut BytesMut) {
        buf.reserve(self.encoded_len());
        buf.put_i32(tag.as_i32());
        buf.put_i32(self.payload_len() as i32);

        match self {
            Value::Null => {}
            Value::Integer(v) | Value::Foreign(v) => buf.put_i64(*v),
            Value::Float(v) => buf.put_f64(*v),
            Value::Text(s) => {
                buf.put_slice(s.as_bytes());
                buf.put_bytes(0, padded_len(s.len()) - s.len());
            }
        }
    }

    /// Parse a textual value for the given column
    pub fn parse_as(column: &ColumnDef, text: &str) -> Result<Value> {
        let mismatch = || RowWireError::TypeMismatch {
            column: column.name.clone(),
            expected: column.kind.to_string(),
            found: format!("{:?}", text),
        };

        match &column.kind {
            ColumnKind::Integer => text.trim().parse().map(Value::Integer).map_err(|_| mismatch()),
            ColumnKind::Float => text.trim().parse().map(Value::Float).map_err(|_| mismatch()),
            ColumnKind::Foreign { .. } => {
                text.trim().parse().map(Value::Foreign).map_err(|_| mismatch())
            }
            ColumnKind::String => Ok(Value::Text(text.to_string())),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Integer(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Text(s) => write!(f, "{:?}", s),
            Value::Foreign(v) => write!(f, "#{}", v),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

/// Round `len` up to the next multiple of [`STRING_ALIGN`]
pub fn padded_len(len: usize) -> usize {
    len.div_ceil(STRING_ALIGN) * STRING_ALIGN
}

/// Check a value against its column's declared kind
///
/// A foreign column accepts a plain integer and turns it into a foreign
/// key; every other pairing must match exactly.
pub fn coerce(column: &ColumnDef, value: &Value) -> Result<Value> {
    match (&column.kind, value) {
        (ColumnKind::Integer, Value::Integer(_))
        | (ColumnKind::Float, Value::Float(_))
        | (ColumnKind::String, Value::Text(_))
        | (ColumnKind::Foreign { .. }, Value::Foreign(_)) => Ok(value.clone()),
        (ColumnKind::Foreign { .. }, Value::Integer(v)) => Ok(Value::Foreign(*v)),
        (kind, other) => Err(RowWireError::TypeMismatch {
            column: column.name.clone(),
            expected: kind.to_string(),
            found: other.tag().to_string(),
        }),
    }
}

/// Encode a value for a column, tagging it by the column's declared kind
pub fn encode_value(column: &ColumnDef, value: &Value, buf: &mut BytesMut) -> Result<()> {
    coerce(column, value)?.encode(buf);
    Ok(())
}

/// Decode one `(tag, length, payload)` triple
pub fn decode_value(buf: &mut ResponseBuf<'_>) -> Result<Value> {
    let raw_tag = buf.read_i32("value tag")?;
    let tag = TypeTag::from_wire(raw_tag)
        .ok_or_else(|| RowWireError::Protocol(format!("Unknown value type tag: {}", raw_tag)))?;

    let len = buf.read_i32("value length")?;
    if len < 0 {
        return Err(RowWireError::Protocol(format!(
            "Negative {} value length: {}",
            tag, len
        )));
    }
    let len = len as usize;

    if let Some(fixed) = tag.fixed_len() {
        if len != fixed {
            return Err(RowWireError::Protocol(format!(
                "Invalid {} value length: expected {}, got {}",
                tag, fixed, len
            )));
        }
    }

    Ok(match tag {
        TypeTag::Null => Value::Null,
        TypeTag::Integer => Value::Integer(buf.read_i64("integer value")?),
        TypeTag::Float => Value::Float(buf.read_f64("float value")?),
        TypeTag::Foreign => Value::Foreign(buf.read_i64("foreign value")?),
        TypeTag::String => {
            let raw = buf.read_slice(len, "string value")?;
            let text = String::from_utf8_lossy(raw);
            Value::Text(text.trim_end_matches('\0').to_string())
        }
    })
}
