//! sqlx-backed MySQL driver.
//!
//! # Streaming
//! Statements are prepared first so the result columns are known even when
//! the result set is empty. Rows are then pulled from the server stream in
//! batches of at most `fetch_size` before being handed to the sink, so
//! client memory stays bounded for large results.

use super::value_rendering::render_row;
use crate::Result;
use crate::config::{DatabaseType, SslMode};
use crate::connection_url::ResolvedConnection;
use crate::driver::{Cells, ExecuteOutcome, QueryDriver, QuerySession, RowSink};
use crate::error::SqlPullError;
use crate::security::Credentials;
use async_trait::async_trait;
use futures::{Stream, TryStreamExt};
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection, MySqlSslMode};
use sqlx::{Column, ConnectOptions, Connection, Executor, Statement};

/// Maps the descriptor's TLS policy onto sqlx's SSL modes.
pub const fn sqlx_ssl_mode(mode: SslMode) -> MySqlSslMode {
    match mode {
        SslMode::Prefer => MySqlSslMode::Preferred,
        SslMode::Require => MySqlSslMode::Required,
        SslMode::VerifyFull => MySqlSslMode::VerifyIdentity,
    }
}

/// Builds sqlx connect options for a resolved target.
///
/// The MongoDB BI connector authenticates through the cleartext plugin, so
/// it is enabled for that server flavour only.
pub fn connect_options(target: &ResolvedConnection, credentials: &Credentials) -> MySqlConnectOptions {
    let mut options = MySqlConnectOptions::new()
        .host(&target.host)
        .port(target.port)
        .username(credentials.username())
        .password(credentials.password())
        .ssl_mode(sqlx_ssl_mode(target.ssl_mode));

    let database = target.database.trim();
    if !database.is_empty() {
        options = options.database(database);
    }

    match target.database_type {
        DatabaseType::MongoDbBi => options.enable_cleartext_plugin(true),
        DatabaseType::MySql => options,
    }
}

/// Drains a row stream in batches of at most `fetch_size`, rendering each
/// row into `sink`. Returns the number of rows delivered.
///
/// At most one batch is held in memory. Rows already pulled into a batch
/// are dropped when the stream fails before the batch completes.
///
/// # Errors
/// Returns a query error if the stream fails, or the renderer's or sink's
/// error.
pub async fn stream_batches<S, T, E, R>(
    rows: S,
    fetch_size: usize,
    sink: &mut dyn RowSink,
    mut render: R,
) -> Result<u64>
where
    S: Stream<Item = std::result::Result<T, E>> + Unpin,
    E: std::error::Error + Send + Sync + 'static,
    R: FnMut(&T) -> Result<Cells>,
{
    let mut delivered: u64 = 0;
    let mut batches = rows.try_chunks(fetch_size.max(1));

    while let Some(batch) = batches
        .try_next()
        .await
        .map_err(|e| SqlPullError::query_failed("Failed to read result rows", e.1))?
    {
        for row in &batch {
            sink.row(render(row)?)?;
            delivered = delivered.saturating_add(1);
        }
        tracing::trace!(batch = batch.len(), rows = delivered, "Streamed result batch");
    }

    Ok(delivered)
}

/// Driver opening one plain `MySqlConnection` per session (no pool).
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlxMySqlDriver;

#[async_trait]
impl QueryDriver for SqlxMySqlDriver {
    fn name(&self) -> &'static str {
        "mysql"
    }

    async fn connect(
        &self,
        target: &ResolvedConnection,
        credentials: &Credentials,
    ) -> Result<Box<dyn QuerySession>> {
        let mut conn = connect_options(target, credentials)
            .connect()
            .await
            .map_err(|e| {
                SqlPullError::connection_with_context(
                    format!("Failed to connect to {}:{}", target.host, target.port),
                    e,
                )
            })?;

        // Cursor-style streaming expects an open transaction
        if let Err(e) = conn.execute("SET autocommit = 0").await {
            if let Err(close_err) = conn.close().await {
                tracing::debug!(error = %close_err, "Failed to close connection after setup error");
            }
            return Err(SqlPullError::connection_with_context(
                "Failed to disable auto-commit",
                e,
            ));
        }

        tracing::debug!(host = %target.host, port = target.port, "MySQL connection established");
        Ok(Box::new(SqlxMySqlSession { conn }))
    }
}

/// An open sqlx MySQL connection.
pub struct SqlxMySqlSession {
    conn: MySqlConnection,
}

impl std::fmt::Debug for SqlxMySqlSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqlxMySqlSession").finish_non_exhaustive()
    }
}

#[async_trait]
impl QuerySession for SqlxMySqlSession {
    async fn execute(
        &mut self,
        sql: &str,
        fetch_size: usize,
        sink: &mut dyn RowSink,
    ) -> Result<ExecuteOutcome> {
        let statement = (&mut self.conn)
            .prepare(sql)
            .await
            .map_err(|e| SqlPullError::query_failed("Failed to prepare statement", e))?;

        let columns: Vec<String> = statement
            .columns()
            .iter()
            .map(|column| column.name().to_string())
            .collect();

        if columns.is_empty() {
            let done = statement
                .query()
                .execute(&mut self.conn)
                .await
                .map_err(|e| SqlPullError::query_failed("Failed to execute statement", e))?;
            return Ok(ExecuteOutcome::NoResultSet {
                affected: done.rows_affected(),
            });
        }

        sink.columns(&columns)?;

        let rows = statement.query().fetch(&mut self.conn);
        let rows = stream_batches(rows, fetch_size, sink, render_row).await?;
        Ok(ExecuteOutcome::ResultSet { rows })
    }

    async fn close(self: Box<Self>) -> Result<()> {
        let session = *self;
        session
            .conn
            .close()
            .await
            .map_err(|e| SqlPullError::connection_with_context("Failed to close connection", e))
    }
}
