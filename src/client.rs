//! Client Module
//!
//! The operation contract of the library: insert, update, drop, get and
//! scan against a validated [`Schema`].
//!
//! ## Flow per operation
//! 1. Check the connection is open
//! 2. Validate and encode the request against the table schema
//! 3. Send it and block for exactly one response
//! 4. Decode the response; a non-OK status becomes an error
//!
//! Failures are reported immediately. Nothing is retried.

use crate::config::Config;
use crate::error::{Result, RowWireError};
use crate::network::{Connection, ConnectionState, TcpTransport, Transport};
use crate::protocol::{
    decode_response, PrimaryKey, Request, Response, Row, ScanPredicate, Value, Version,
    VersionCheck,
};
use crate::schema::Schema;

/// Database client bound to one schema and one connection
pub struct Client<T: Transport = TcpTransport> {
    /// Validated tables, read-only for the client's lifetime
    schema: Schema,

    /// The single connection to the server
    connection: Connection<T>,
}

impl<T: Transport> Client<T> {
    /// Create an unconnected client
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            connection: Connection::new(),
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn state(&self) -> ConnectionState {
        self.connection.state()
    }

    /// Connect over an already opened transport
    pub fn connect_with(&mut self, transport: T) -> Result<()> {
        self.connection.connect_with(transport)
    }

    /// Close the connection; later operations fail with `NotConnected`
    pub fn close(&mut self) -> Result<()> {
        self.connection.close()
    }

    /// Insert a row, returning its new id and version
    pub fn insert(&mut self, table: &str, values: &[Value]) -> Result<(PrimaryKey, Version)> {
        self.ensure_connected()?;
        let schema = self.schema.table(table)?;
        let request = Request::insert(schema, values)?;
        let foreign = schema.has_foreign_columns();

        match self.execute(&request, foreign)? {
            Response::Inserted { key, version } => {
                tracing::debug!("Inserted {}#{} at version {}", table, key, version);
                Ok((key, version))
            }
            other => Err(unexpected(&request, &other)),
        }
    }

    /// Replace the values of row `key`, returning the new version
    ///
    /// `version` is either [`VersionCheck::Any`] (or `None`) to update
    /// unconditionally, or the version the caller expects the row to be at.
    pub fn update(
        &mut self,
        table: &str,
        key: PrimaryKey,
        values: &[Value],
        version: impl Into<VersionCheck>,
    ) -> Result<Version> {
        self.ensure_connected()?;
        let schema = self.schema.table(table)?;
        let request = Request::update(schema, key, values, version.into())?;
        let foreign = schema.has_foreign_columns();

        match self.execute(&request, foreign)? {
            Response::Updated { key: echoed, version } => {
                if let Some(echoed) = echoed.filter(|&k| k != key) {
                    return Err(RowWireError::Protocol(format!(
                        "update of id {} answered for id {}",
                        key, echoed
                    )));
                }
                Ok(version)
            }
            other => Err(unexpected(&request, &other)),
        }
    }

    /// Delete row `key`
    pub fn drop(&mut self, table: &str, key: PrimaryKey) -> Result<()> {
        self.ensure_connected()?;
        let request = Request::drop_row(self.schema.table(table)?, key);

        match self.execute(&request, false)? {
            Response::Dropped => Ok(()),
            other => Err(unexpected(&request, &other)),
        }
    }

    /// Fetch row `key` with its current version
    pub fn get(&mut self, table: &str, key: PrimaryKey) -> Result<(Row, Version)> {
        self.ensure_connected()?;
        let request = Request::get(self.schema.table(table)?, key);

        match self.execute(&request, false)? {
            Response::Row { version, values } => Ok((values, version)),
            other => Err(unexpected(&request, &other)),
        }
    }

    /// Ids of the rows matching `predicate`
    pub fn scan(&mut self, table: &str, predicate: &ScanPredicate) -> Result<Vec<PrimaryKey>> {
        self.ensure_connected()?;
        let request = Request::scan(self.schema.table(table)?, predicate)?;

        match self.execute(&request, false)? {
            Response::Keys(keys) => Ok(keys),
            other => Err(unexpected(&request, &other)),
        }
    }

    fn ensure_connected(&self) -> Result<()> {
        if self.connection.is_connected() {
            Ok(())
        } else {
            Err(RowWireError::NotConnected)
        }
    }

    /// Round-trip one request and turn a failure status into an error
    fn execute(&mut self, request: &Request, foreign_context: bool) -> Result<Response> {
        let op = request.op_code();
        tracing::trace!("Executing {:?} on table {}", op, request.table_index());

        let reply = self.connection.round_trip(request)?;
        match decode_response(op, &reply)? {
            Response::Failed(status) => {
                tracing::warn!("{:?} failed with {}", op, status);
                Err(RowWireError::from_status(status, foreign_context))
            }
            response => Ok(response),
        }
    }
}

impl Client<TcpTransport> {
    /// Connect to the server named in `config`
    pub fn connect(&mut self, config: &Config) -> Result<()> {
        self.connection.connect(config)
    }
}

fn unexpected(request: &Request, response: &Response) -> RowWireError {
    RowWireError::Protocol(format!(
        "unexpected response to {:?}: {:?}",
        request.op_code(),
        response
    ))
}
