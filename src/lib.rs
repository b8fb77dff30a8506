//! # rowwire
//!
//! Client library for a row-oriented remote database with:
//! - Schema validation before any network I/O
//! - Byte-exact encoding of a tagged binary wire protocol
//! - Insert, update, drop, get and scan over one blocking connection
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         Client                               │
//! │          (insert / update / drop / get / scan)               │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │   Schema    │          │  Protocol   │
//!   │  Registry   │─────────▶│ Req / Resp  │
//!   └─────────────┘          └──────┬──────┘
//!                                   │ value codec
//!                                   ▼
//!                           ┌─────────────┐
//!                           │ Connection  │
//!                           │ (Transport) │
//!                           └─────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use rowwire::{Client, ColumnType, Config, Schema, ScanPredicate, Value};
//!
//! # fn main() -> rowwire::Result<()> {
//! let schema = Schema::builder()
//!     .table("User", [("firstName", ColumnType::String), ("lastName", ColumnType::String)])
//!     .table("Account", [("user", ColumnType::foreign("User")), ("balance", ColumnType::Float)])
//!     .build()?;
//!
//! let mut client: Client = Client::new(schema);
//! client.connect(&Config::default())?;
//!
//! let (id, _version) = client.insert("User", &["Ada".into(), "Lovelace".into()])?;
//! client.insert("Account", &[Value::Integer(id), Value::Float(10.0)])?;
//! let ids = client.scan("Account", &ScanPredicate::all())?;
//! println!("{} accounts", ids.len());
//!
//! client.close()?;
//! # Ok(())
//! # }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod schema;
pub mod protocol;
pub mod network;
pub mod client;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{RowWireError, Result};
pub use config::Config;
pub use client::Client;
pub use schema::{ColumnType, Schema, TableSchema};
pub use protocol::{Operator, PrimaryKey, Row, ScanPredicate, Value, Version, VersionCheck};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of rowwire
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
