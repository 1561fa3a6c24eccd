//! Database driver seam.
//!
//! The executor only talks to these traits, so the MySQL driver can be
//! swapped for a fake in tests. A driver opens a [`QuerySession`]; the
//! session runs one statement and pushes its result set into a [`RowSink`].
//!
//! # Object Safety
//! Both traits are object-safe and are used as `Box<dyn ...>` /
//! `Arc<dyn ...>`.

use crate::Result;
use crate::connection_url::ResolvedConnection;
use crate::security::Credentials;
use async_trait::async_trait;

/// One rendered result row; `None` is SQL NULL.
pub type Cells = Vec<Option<String>>;

/// Receiver of a streamed result set.
///
/// `columns` is called exactly once, before any `row`, and only when the
/// statement produces a result set.
pub trait RowSink: Send {
    /// Receives the result column names in ordinal order.
    ///
    /// # Errors
    /// Returns an error if the sink cannot accept the result set.
    fn columns(&mut self, names: &[String]) -> Result<()>;

    /// Receives one row, cells in column order.
    ///
    /// # Errors
    /// Returns an error if the row cannot be stored.
    fn row(&mut self, cells: Cells) -> Result<()>;
}

/// What a statement produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecuteOutcome {
    /// A result set with this many rows was streamed to the sink
    ResultSet {
        /// Rows delivered to the sink
        rows: u64,
    },
    /// The statement produced no result set (DDL/DML)
    NoResultSet {
        /// Rows reported as affected by the server
        affected: u64,
    },
}

/// Factory for database sessions.
#[async_trait]
pub trait QueryDriver: Send + Sync {
    /// Short driver name used in logs.
    fn name(&self) -> &'static str;

    /// Opens a session with basic authentication and auto-commit disabled.
    ///
    /// # Errors
    /// Returns a connection error if the server cannot be reached, rejects
    /// the credentials, or TLS negotiation fails.
    async fn connect(
        &self,
        target: &ResolvedConnection,
        credentials: &Credentials,
    ) -> Result<Box<dyn QuerySession>>;
}

/// An open connection.
#[async_trait]
pub trait QuerySession: Send {
    /// Executes exactly one statement, streaming any result set into `sink`
    /// in batches of at most `fetch_size` rows.
    ///
    /// # Errors
    /// Returns a query error if execution or streaming fails, or the sink's
    /// error.
    async fn execute(
        &mut self,
        sql: &str,
        fetch_size: usize,
        sink: &mut dyn RowSink,
    ) -> Result<ExecuteOutcome>;

    /// Closes the connection.
    ///
    /// # Errors
    /// Returns a connection error if the close handshake fails. The
    /// underlying resource is released either way.
    async fn close(self: Box<Self>) -> Result<()>;
}
