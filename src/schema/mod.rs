//! Schema Module
//!
//! Table and column declarations, validated once before any network I/O.
//!
//! ## Rules
//! - Tables get a 1-based wire index in declaration order
//! - Table and column names are non-empty, do not start with a digit or
//!   underscore, and are never `id` (the implicit primary key)
//! - A foreign column may only reference a table declared before its own

mod column;
mod registry;

pub use column::{ColumnDef, ColumnKind, ColumnType, PRIMARY_KEY};
pub use registry::{Schema, SchemaBuilder, TableDecl, TableSchema};
