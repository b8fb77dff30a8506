//! Error types for rowwire
//!
//! Provides a unified error type for schema building, request encoding,
//! transport and remote failures.

use thiserror::Error;

use crate::protocol::StatusCode;

/// Result type alias using RowWireError
pub type Result<T> = std::result::Result<T, RowWireError>;

/// Unified error type for rowwire operations
#[derive(Debug, Error)]
pub enum RowWireError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Schema Errors (raised while building, before any network I/O)
    // -------------------------------------------------------------------------
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    #[error("Column {table}.{column} references unknown table {target}")]
    UnknownForeignTable {
        table: String,
        column: String,
        target: String,
    },

    #[error("Column {table}.{column} references {target}, which is not declared before {table}")]
    ForwardForeignReference {
        table: String,
        column: String,
        target: String,
    },

    // -------------------------------------------------------------------------
    // Encoding Errors (raised locally, nothing is sent)
    // -------------------------------------------------------------------------
    #[error("Unknown table: {0}")]
    UnknownTable(String),

    #[error("Unknown column {column} in table {table}")]
    UnknownColumn { table: String, column: String },

    #[error("Type mismatch for column {column}: expected {expected}, got {found}")]
    TypeMismatch {
        column: String,
        expected: String,
        found: String,
    },

    #[error("Table {table} has {expected} columns, got {found} values")]
    ArityMismatch {
        table: String,
        expected: usize,
        found: usize,
    },

    #[error("Invalid scan predicate: {0}")]
    InvalidPredicate(String),

    #[error("Invalid expected version {0}: versions start at 1")]
    InvalidVersion(i64),

    // -------------------------------------------------------------------------
    // Connection Errors
    // -------------------------------------------------------------------------
    #[error("Not connected")]
    NotConnected,

    #[error("Already connected")]
    AlreadyConnected,

    #[error("Server busy")]
    ServerBusy,

    // -------------------------------------------------------------------------
    // Remote Errors (reported by the server status code)
    // -------------------------------------------------------------------------
    #[error("Object not found")]
    ObjectNotFound,

    #[error("Invalid reference ({0})")]
    InvalidReference(StatusCode),

    #[error("Transaction aborted")]
    TransactionAborted,

    #[error("Malformed request ({0})")]
    MalformedRequest(StatusCode),

    #[error("Operation not implemented by server")]
    Unimplemented,

    // -------------------------------------------------------------------------
    // Protocol / Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl RowWireError {
    /// Map a non-OK status code to the error surfaced to the caller.
    ///
    /// `foreign_context` marks a row write against a table that has foreign
    /// columns; there BAD_VALUE means a dangling reference.
    pub fn from_status(status: StatusCode, foreign_context: bool) -> Self {
        match status {
            StatusCode::NotFound => RowWireError::ObjectNotFound,
            StatusCode::BadForeign => RowWireError::InvalidReference(status),
            StatusCode::BadValue if foreign_context => RowWireError::InvalidReference(status),
            StatusCode::TxnAbort => RowWireError::TransactionAborted,
            StatusCode::ServerBusy => RowWireError::ServerBusy,
            StatusCode::Unimplemented => RowWireError::Unimplemented,
            StatusCode::BadTable
            | StatusCode::BadQuery
            | StatusCode::BadValue
            | StatusCode::BadRow
            | StatusCode::BadRequest => RowWireError::MalformedRequest(status),
            StatusCode::Ok => RowWireError::Protocol("OK status reported as a failure".to_string()),
        }
    }
}
