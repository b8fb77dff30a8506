//! Column declarations and resolved column kinds

use std::fmt;
use std::str::FromStr;

use crate::error::{Result, RowWireError};
use crate::protocol::TypeTag;

/// Name of the implicit primary key column
pub const PRIMARY_KEY: &str = "id";

/// Column type as declared by the caller
///
/// A foreign reference names its target table; it is resolved into a
/// [`ColumnKind`] when the schema is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Float,
    String,
    Foreign(String),
}

impl ColumnType {
    /// Reference to the table called `table`
    pub fn foreign(table: impl Into<String>) -> Self {
        ColumnType::Foreign(table.into())
    }
}

impl FromStr for ColumnType {
    type Err = RowWireError;

    /// `int`, `float` and `string` (plus a few aliases) are primitives;
    /// any other token names the referenced table.
    fn from_str(s: &str) -> Result<Self> {
        let token = s.trim();
        match token {
            "" => Err(RowWireError::InvalidSchema("empty column type".to_string())),
            "int" | "integer" | "i64" => Ok(ColumnType::Integer),
            "float" | "double" | "f64" => Ok(ColumnType::Float),
            "str" | "string" | "text" => Ok(ColumnType::String),
            table => Ok(ColumnType::Foreign(table.to_string())),
        }
    }
}

/// Column kind after schema validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Float,
    String,
    /// Reference to a row of an earlier table
    Foreign { table: String, index: u32 },
}

impl ColumnKind {
    /// Tag used when a value of this column is put on the wire
    pub fn tag(&self) -> TypeTag {
        match self {
            ColumnKind::Integer => TypeTag::Integer,
            ColumnKind::Float => TypeTag::Float,
            ColumnKind::String => TypeTag::String,
            ColumnKind::Foreign { .. } => TypeTag::Foreign,
        }
    }

    pub fn is_foreign(&self) -> bool {
        matches!(self, ColumnKind::Foreign { .. })
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnKind::Integer => f.write_str("integer"),
            ColumnKind::Float => f.write_str("float"),
            ColumnKind::String => f.write_str("string"),
            ColumnKind::Foreign { table, .. } => write!(f, "foreign({})", table),
        }
    }
}

/// A validated column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: String,
    pub kind: ColumnKind,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, kind: ColumnKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Shared naming rule for tables and columns
pub(crate) fn check_name(what: &str, name: &str) -> Result<()> {
    let first = match name.chars().next() {
        Some(c) => c,
        None => return Err(RowWireError::InvalidSchema(format!("{} name is empty", what))),
    };

    if first.is_ascii_digit() || first == '_' {
        return Err(RowWireError::InvalidSchema(format!(
            "{} name {:?} starts with a digit or underscore",
            what, name
        )));
    }
    if name == PRIMARY_KEY {
        return Err(RowWireError::InvalidSchema(format!(
            "{} name {:?} is reserved",
            what, name
        )));
    }
    Ok(())
}
