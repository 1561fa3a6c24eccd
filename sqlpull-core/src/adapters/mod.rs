//! Query client trait and factory.
//!
//! A query client turns a SQL string into a CSV file on disk. The host
//! platform picks a client by data-source kind through [`create_client`].
//!
//! # Module Structure
//! - `mysql`: MySQL / MongoDB BI client

use crate::Result;
use async_trait::async_trait;
use std::path::PathBuf;

pub mod mysql;

pub use mysql::MySqlClient;

/// A client able to realize a query into a result file.
///
/// # Object Safety
/// This trait is object-safe, allowing for dynamic dispatch through
/// `Box<dyn QueryClient>` or `Arc<dyn QueryClient>`. Implementations must
/// keep credentials out of their `Debug` output.
#[async_trait]
pub trait QueryClient: std::fmt::Debug + Send + Sync {
    /// Data-source kind this client serves (e.g. `"mysql"`).
    fn kind(&self) -> &'static str;

    /// Runs one statement and writes its result set to a new CSV file.
    ///
    /// Opens a fresh connection for the call and closes it before
    /// returning, whatever the outcome.
    ///
    /// # Returns
    /// Path of the result file. Statements without a result set produce no
    /// file, but the generated path is still returned.
    ///
    /// # Errors
    /// Returns connection, query, I/O or CSV errors. Nothing is retried.
    async fn realize_query(&self, query: &str) -> Result<PathBuf>;
}

/// Creates a query client for a data-source kind from raw options.
///
/// # Errors
/// Returns an unsupported-feature error for unknown kinds and a
/// configuration error for invalid options.
///
/// # Example
/// ```rust
/// use serde_json::json;
/// use sqlpull_core::adapters::create_client;
///
/// let options = json!({
///     "mysql_client": {
///         "connection": {
///             "url": "jdbc:mysql://dbhost:3307/",
///             "database": "sales",
///             "sslMode": "require",
///             "authentication": { "basic": { "userName": "etl", "password": "pw" } }
///         }
///     }
/// });
///
/// let client = create_client("mysql", &options).unwrap();
/// assert_eq!(client.kind(), "mysql");
/// assert!(create_client("snowflake", &options).is_err());
/// ```
pub fn create_client(kind: &str, options: &serde_json::Value) -> Result<Box<dyn QueryClient>> {
    if MySqlClient::accepts(kind) {
        #[cfg(feature = "mysql")]
        {
            let client = MySqlClient::from_options(options)?;
            return Ok(Box::new(client));
        }
        #[cfg(not(feature = "mysql"))]
        {
            let _ = options;
            return Err(crate::error::SqlPullError::unsupported_feature(
                "MySQL client",
                "Compile with --features mysql to enable MySQL support",
            ));
        }
    }

    Err(crate::error::SqlPullError::unsupported_feature(
        "query client",
        kind,
    ))
}

#[cfg(all(test, feature = "mysql"))]
mod tests {
    use super::*;
    use crate::error::SqlPullError;
    use serde_json::json;

    fn options(ssl_mode: &str) -> serde_json::Value {
        json!({
            "mysql_client": {
                "connection": {
                    "url": "jdbc:mysql://dbhost/",
                    "database": "sales",
                    "sslMode": ssl_mode,
                    "authentication": { "basic": { "userName": "etl", "password": "pw" } }
                }
            }
        })
    }

    #[test]
    fn test_create_client_mysql() {
        let client = create_client("mysql", &options("prefer")).unwrap();
        assert_eq!(client.kind(), "mysql");
    }

    #[test]
    fn test_create_client_unknown_kind() {
        let err = create_client("redshift", &options("prefer")).unwrap_err();
        assert!(matches!(err, SqlPullError::UnsupportedFeature { .. }));
        assert!(err.to_string().contains("redshift"));
    }

    #[test]
    fn test_boxed_client_debug_hides_password() {
        let client = create_client("mysql", &options("require")).unwrap();
        let debug = format!("{:?}", client);
        assert!(debug.contains("MySqlClient"));
        assert!(!debug.contains("\"pw\""));
    }

    #[test]
    fn test_create_client_invalid_options() {
        let err = create_client("mysql", &options("disable")).unwrap_err();
        assert!(err.is_configuration());
    }
}
