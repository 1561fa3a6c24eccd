//! Query-to-CSV execution.
//!
//! One call = one connection: connect, run a single statement, stream its
//! result set into a freshly named CSV file, close. The session is closed on
//! every path out of [`execute_to_csv`] once it has been opened. Partially
//! written files are left in place on failure.

use crate::Result;
use crate::config::QueryConfig;
use crate::connection_url::ResolvedConnection;
use crate::driver::{Cells, ExecuteOutcome, QueryDriver, QuerySession, RowSink};
use crate::error::SqlPullError;
use crate::security::Credentials;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Random bytes in the file name token (8 URL-safe base64 characters).
const FILE_TOKEN_BYTES: usize = 6;

/// Generates `{token}_{unix seconds}.csv`.
///
/// The token is random; uniqueness is likely but not guaranteed.
///
/// # Example
/// ```rust
/// let name = sqlpull_core::executor::result_file_name();
/// let (token, _timestamp) = name.trim_end_matches(".csv").rsplit_once('_').unwrap();
/// assert_eq!(token.len(), 8);
/// ```
pub fn result_file_name() -> String {
    let token: [u8; FILE_TOKEN_BYTES] = rand::random();
    format!(
        "{}_{}.csv",
        URL_SAFE_NO_PAD.encode(token),
        chrono::Utc::now().timestamp()
    )
}

/// CSV sink for a query result.
///
/// The file is only created once the result columns arrive, so statements
/// without a result set leave nothing on disk. Null cells become empty
/// fields.
pub struct CsvResultWriter {
    path: PathBuf,
    writer: Option<csv::Writer<File>>,
    rows: u64,
}

impl CsvResultWriter {
    /// Creates a sink targeting `path`. Nothing is opened yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            writer: None,
            rows: 0,
        }
    }

    /// Target path of this sink.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Data rows written so far (header excluded).
    pub const fn rows(&self) -> u64 {
        self.rows
    }

    /// Flushes buffered output. Returns whether a file was created.
    ///
    /// # Errors
    /// Returns an I/O error if flushing fails.
    pub fn finish(&mut self) -> Result<bool> {
        match self.writer.as_mut() {
            Some(writer) => {
                writer.flush().map_err(|e| {
                    SqlPullError::io(format!("Failed to flush {}", self.path.display()), e)
                })?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

impl RowSink for CsvResultWriter {
    fn columns(&mut self, names: &[String]) -> Result<()> {
        let file = File::create(&self.path).map_err(|e| {
            SqlPullError::io(format!("Failed to create {}", self.path.display()), e)
        })?;

        let mut writer = csv::Writer::from_writer(file);
        writer
            .write_record(names)
            .map_err(|e| SqlPullError::csv("Failed to write result header", e))?;
        self.writer = Some(writer);
        Ok(())
    }

    fn row(&mut self, cells: Cells) -> Result<()> {
        let writer = self.writer.as_mut().ok_or_else(|| {
            SqlPullError::query_failed(
                "Result row received before column metadata",
                std::io::Error::other("missing result header"),
            )
        })?;

        writer
            .write_record(cells.into_iter().map(Option::unwrap_or_default))
            .map_err(|e| SqlPullError::csv("Failed to write result row", e))?;
        self.rows = self.rows.saturating_add(1);
        Ok(())
    }
}

/// Runs `sql` against `target` and writes the result set to a new CSV file
/// in `config.output_dir`.
///
/// Returns the file path. When the statement yields no result set, no file
/// is created but the generated path is still returned.
///
/// # Errors
/// - Configuration error for an invalid `config`
/// - Connection error if the driver cannot connect
/// - Query error if execution or streaming fails
/// - I/O or CSV error if the result file cannot be written
///
/// A close failure is only reported when the statement itself succeeded.
pub async fn execute_to_csv(
    driver: &dyn QueryDriver,
    target: &ResolvedConnection,
    credentials: &Credentials,
    config: &QueryConfig,
    sql: &str,
) -> Result<PathBuf> {
    config.validate()?;

    tracing::info!(driver = driver.name(), status = "started", "Realize SQL query");
    let started = Instant::now();

    tracing::info!(url = %target, "Setting up connection to {}", driver.name());
    let mut session = driver.connect(target, credentials).await?;

    let mut sink = CsvResultWriter::new(config.output_dir.join(result_file_name()));
    let outcome = run_statement(session.as_mut(), sql, config.fetch_size, &mut sink).await;
    let closed = session.close().await;

    let outcome = match (outcome, closed) {
        (Ok(outcome), Ok(())) => outcome,
        (Ok(_), Err(close_err)) => return Err(close_err),
        (Err(err), Ok(())) => return Err(err),
        (Err(err), Err(close_err)) => {
            tracing::warn!(error = %close_err, "Failed to close connection after query error");
            return Err(err);
        }
    };

    let duration = started.elapsed().as_secs_f64();
    match outcome {
        ExecuteOutcome::ResultSet { rows } => tracing::info!(
            driver = driver.name(),
            status = "finished",
            duration,
            rows,
            path = %sink.path().display(),
            "Realize SQL query"
        ),
        ExecuteOutcome::NoResultSet { affected } => tracing::info!(
            driver = driver.name(),
            status = "finished",
            duration,
            affected,
            "Realize SQL query produced no result set"
        ),
    }

    Ok(sink.path)
}

async fn run_statement(
    session: &mut dyn QuerySession,
    sql: &str,
    fetch_size: usize,
    sink: &mut CsvResultWriter,
) -> Result<ExecuteOutcome> {
    let outcome = session.execute(sql, fetch_size, sink).await?;
    sink.finish()?;
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_back(path: &Path) -> String {
        std::fs::read_to_string(path).unwrap()
    }

    #[test]
    fn test_result_file_name_format() {
        let name = result_file_name();
        let stem = name.strip_suffix(".csv").unwrap();
        // the token alphabet includes '_' itself
        let (token, timestamp) = stem.rsplit_once('_').unwrap();

        assert_eq!(token.len(), 8);
        assert!(
            token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
        assert!(URL_SAFE_NO_PAD.decode(token).is_ok());
        assert!(timestamp.parse::<i64>().unwrap() > 1_600_000_000);
    }

    #[test]
    fn test_writer_renders_nulls_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let mut sink = CsvResultWriter::new(&path);

        sink.columns(&["id".to_string(), "name".to_string()]).unwrap();
        sink.row(vec![Some("1".to_string()), None]).unwrap();
        sink.row(vec![None, Some("null".to_string())]).unwrap();
        assert!(sink.finish().unwrap());

        assert_eq!(read_back(&path), "id,name\n1,\n,null\n");
        assert_eq!(sink.rows(), 2);
    }

    #[test]
    fn test_writer_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        let mut sink = CsvResultWriter::new(&path);

        sink.columns(&["a".to_string()]).unwrap();
        assert!(sink.finish().unwrap());
        assert_eq!(read_back(&path), "a\n");
    }

    #[test]
    fn test_writer_without_columns_creates_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("none.csv");
        let mut sink = CsvResultWriter::new(&path);

        assert!(!sink.finish().unwrap());
        assert!(!path.exists());
    }

    #[test]
    fn test_writer_rejects_row_before_columns() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = CsvResultWriter::new(dir.path().join("x.csv"));
        let err = sink.row(vec![Some("1".to_string())]).unwrap_err();
        assert!(matches!(err, SqlPullError::QueryExecution { .. }));
    }
}
