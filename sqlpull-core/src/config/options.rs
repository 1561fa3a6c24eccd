//! Raw data-source options as handed over by the orchestration layer.

use super::ConnectionDescriptor;
use crate::error::SqlPullError;
use crate::Result;
use serde_json::Value;

/// Key holding the MySQL client block inside data-source options.
pub const MYSQL_CLIENT_KEY: &str = "mysql_client";

/// Extracts the connection descriptor from a full options document.
///
/// The expected shape is `{"mysql_client": {"connection": {...}}}`.
///
/// # Errors
/// Returns a configuration error when the client block is absent, the
/// connection block is not an object, or the descriptor is invalid.
///
/// # Example
/// ```rust
/// use serde_json::json;
/// use sqlpull_core::config::descriptor_from_options;
///
/// let options = json!({
///     "mysql_client": {
///         "connection": {
///             "url": "jdbc:mysql://dbhost/",
///             "database": "sales",
///             "sslMode": "prefer",
///             "authentication": { "basic": { "userName": "etl", "password": "pw" } }
///         }
///     }
/// });
/// let descriptor = descriptor_from_options(&options).unwrap();
/// assert_eq!(descriptor.database, "sales");
/// ```
pub fn descriptor_from_options(options: &Value) -> Result<ConnectionDescriptor> {
    let client = match options.get(MYSQL_CLIENT_KEY) {
        Some(client) if !client.is_null() => client,
        _ => {
            return Err(SqlPullError::configuration(
                "Data Source needs a client to Mysql to be able to query the storage but 'mysql_client' is empty.",
            ));
        }
    };

    match client.get("connection") {
        Some(connection @ Value::Object(_)) => ConnectionDescriptor::from_json(connection.clone()),
        _ => Err(SqlPullError::configuration(
            "Missing connection info for Mysql client",
        )),
    }
}
