//! Request definitions and encoding
//!
//! Requests are validated against a [`TableSchema`] when they are built,
//! so [`Request::encode`] cannot fail.
//!
//! ```text
//! ┌────────────┬───────────────┬──────────────────────────────┐
//! │ OpCode (4) │ TableIdx (4)  │   operation-specific body    │
//! └────────────┴───────────────┴──────────────────────────────┘
//! ```

use bytes::{BufMut, Bytes, BytesMut};

use super::types::{OpCode, Operator, PrimaryKey, TypeTag, Version};
use super::value::{coerce, Value};
use crate::error::{Result, RowWireError};
use crate::schema::{TableSchema, PRIMARY_KEY};

/// Header size: op code (4) + table index (4)
pub const HEADER_SIZE: usize = 8;

/// Expected version on update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VersionCheck {
    /// Update regardless of the current version (sent as 0)
    #[default]
    Any,
    /// Abort unless the row is currently at this version
    Exactly(Version),
}

impl VersionCheck {
    /// Value of the version field on the wire
    pub fn wire_value(self) -> i64 {
        match self {
            VersionCheck::Any => 0,
            VersionCheck::Exactly(v) => v,
        }
    }
}

impl From<Option<Version>> for VersionCheck {
    fn from(version: Option<Version>) -> Self {
        version.map_or(VersionCheck::Any, VersionCheck::Exactly)
    }
}

/// Scan filter: one column compared against one value, or every row
#[derive(Debug, Clone, PartialEq)]
pub struct ScanPredicate {
    pub operator: Operator,
    pub column: Option<String>,
    pub value: Option<Value>,
}

impl ScanPredicate {
    /// Match every row
    pub fn all() -> Self {
        Self {
            operator: Operator::All,
            column: None,
            value: None,
        }
    }

    /// Compare `column` against `value`; `"id"` targets the primary key
    pub fn compare(operator: Operator, column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            operator,
            column: Some(column.into()),
            value: Some(value.into()),
        }
    }
}

/// A validated request
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    /// Insert a row
    Insert { table: u32, row: Vec<Value> },

    /// Replace a row's values
    Update {
        table: u32,
        key: PrimaryKey,
        version: VersionCheck,
        row: Vec<Value>,
    },

    /// Delete a row
    Drop { table: u32, key: PrimaryKey },

    /// Fetch a row
    Get { table: u32, key: PrimaryKey },

    /// Find matching primary keys
    ///
    /// `tag` is the wire tag sent in front of `value`'s payload. It differs
    /// from `value.tag()` only for the primary key, which is always tagged
    /// Foreign.
    Scan {
        table: u32,
        column: u32,
        operator: Operator,
        tag: TypeTag,
        value: Value,
    },

    /// Disconnect
    Exit,
}

impl Request {
    pub fn insert(table: &TableSchema, row: &[Value]) -> Result<Self> {
        Ok(Request::Insert {
            table: table.index(),
            row: coerce_row(table, row)?,
        })
    }

    pub fn update(
        table: &TableSchema,
        key: PrimaryKey,
        row: &[Value],
        version: VersionCheck,
    ) -> Result<Self> {
        if let VersionCheck::Exactly(v) = version {
            if v < 1 {
                return Err(RowWireError::InvalidVersion(v));
            }
        }

        Ok(Request::Update {
            table: table.index(),
            key,
            version,
            row: coerce_row(table, row)?,
        })
    }

    pub fn drop_row(table: &TableSchema, key: PrimaryKey) -> Self {
        Request::Drop {
            table: table.index(),
            key,
        }
    }

    pub fn get(table: &TableSchema, key: PrimaryKey) -> Self {
        Request::Get {
            table: table.index(),
            key,
        }
    }

    /// Resolve a predicate into column index and tagged value
    ///
    /// `All` ignores whatever column and value were supplied and sends a
    /// zero-length Null. The primary key is column 0 and always travels
    /// with the Foreign tag; a string or float keeps its own length and
    /// payload under that tag.
    pub fn scan(table: &TableSchema, predicate: &ScanPredicate) -> Result<Self> {
        let scan = |column, tag, value| Request::Scan {
            table: table.index(),
            column,
            operator: predicate.operator,
            tag,
            value,
        };

        if predicate.operator == Operator::All {
            return Ok(scan(0, TypeTag::Null, Value::Null));
        }

        let column = predicate.column.as_deref().ok_or_else(|| {
            RowWireError::InvalidPredicate(format!(
                "operator {:?} requires a column",
                predicate.operator
            ))
        })?;
        let value = predicate.value.as_ref().ok_or_else(|| {
            RowWireError::InvalidPredicate(format!(
                "operator {:?} requires a value",
                predicate.operator
            ))
        })?;

        if column == PRIMARY_KEY {
            return match value {
                Value::Null => Err(RowWireError::TypeMismatch {
                    column: PRIMARY_KEY.to_string(),
                    expected: "foreign".to_string(),
                    found: TypeTag::Null.to_string(),
                }),
                Value::Integer(key) => Ok(scan(0, TypeTag::Foreign, Value::Foreign(*key))),
                other => Ok(scan(0, TypeTag::Foreign, other.clone())),
            };
        }

        let (index, def) = table
            .column(column)
            .ok_or_else(|| RowWireError::UnknownColumn {
                table: table.name().to_string(),
                column: column.to_string(),
            })?;

        let value = coerce(def, value)?;
        Ok(scan(index, value.tag(), value))
    }

    /// Get the op code
    pub fn op_code(&self) -> OpCode {
        match self {
            Request::Insert { .. } => OpCode::Insert,
            Request::Update { .. } => OpCode::Update,
            Request::Drop { .. } => OpCode::Drop,
            Request::Get { .. } => OpCode::Get,
            Request::Scan { .. } => OpCode::Scan,
            Request::Exit => OpCode::Exit,
        }
    }

    /// Wire table index (0 for Exit)
    pub fn table_index(&self) -> u32 {
        match self {
            Request::Insert { table, .. }
            | Request::Update { table, .. }
            | Request::Drop { table, .. }
            | Request::Get { table, .. }
            | Request::Scan { table, .. } => *table,
            Request::Exit => 0,
        }
    }

    /// Encode to the exact wire bytes
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(HEADER_SIZE + self.body_len());
        buf.put_i32(self.op_code().as_i32());
        buf.put_i32(self.table_index() as i32);

        match self {
            Request::Insert { row, .. } => put_row(&mut buf, row),
            Request::Update {
                key, version, row, ..
            } => {
                buf.put_i64(*key);
                buf.put_i64(version.wire_value());
                put_row(&mut buf, row);
            }
            Request::Drop { key, .. } | Request::Get { key, .. } => buf.put_i64(*key),
            Request::Scan {
                column,
                operator,
                tag,
                value,
                ..
            } => {
                buf.put_i32(*column as i32);
                buf.put_i32(operator.as_i32());
                value.encode_as(*tag, &mut buf);
            }
            Request::Exit => {}
        }

        buf.freeze()
    }

    fn body_len(&self) -> usize {
        let row_len = |row: &[Value]| 4 + row.iter().map(Value::encoded_len).sum::<usize>();
        match self {
            Request::Insert { row, .. } => row_len(row),
            Request::Update { row, .. } => 16 + row_len(row),
            Request::Drop { .. } | Request::Get { .. } => 8,
            Request::Scan { value, .. } => 8 + value.encoded_len(),
            Request::Exit => 0,
        }
    }
}

fn coerce_row(table: &TableSchema, row: &[Value]) -> Result<Vec<Value>> {
    if row.len() != table.column_count() {
        return Err(RowWireError::ArityMismatch {
            table: table.name().to_string(),
            expected: table.column_count(),
            found: row.len(),
        });
    }

    table
        .columns()
        .iter()
        .zip(row)
        .map(|(column, value)| coerce(column, value))
        .collect()
}

fn put_row(buf: &mut BytesMut, row: &[Value]) {
    buf.put_i32(row.len() as i32);
    for value in row {
        value.encode(buf);
    }
}
