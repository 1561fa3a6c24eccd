//! Connection descriptor supplied by the host platform.
//!
//! The descriptor mirrors the platform's JSON connection block:
//!
//! ```json
//! {
//!   "url": "jdbc:mysql://dbhost:3306/",
//!   "databaseType": "MongoDBBI",
//!   "database": "sales",
//!   "sslMode": "require",
//!   "authentication": { "basic": { "userName": "etl", "password": "..." } }
//! }
//! ```

use crate::error::SqlPullError;
use crate::security::Credentials;
use crate::Result;
use serde::Deserialize;
use std::str::FromStr;

/// Marker the platform uses for MongoDB's MySQL-compatible BI connector.
pub const MONGODB_BI_MARKER: &str = "MongoDBBI";

/// TLS policy requested for the connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum SslMode {
    /// Use TLS when offered, do not require it or verify the certificate
    Prefer,
    /// Require TLS without certificate verification
    Require,
    /// Require TLS and verify the server certificate
    VerifyFull,
}

impl SslMode {
    /// All accepted modes, in the order the platform documents them.
    pub const ALL: [Self; 3] = [Self::Prefer, Self::Require, Self::VerifyFull];

    /// The wire name of this mode.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Prefer => "prefer",
            Self::Require => "require",
            Self::VerifyFull => "verify-full",
        }
    }
}

impl FromStr for SslMode {
    type Err = SqlPullError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "prefer" => Ok(Self::Prefer),
            "require" => Ok(Self::Require),
            "verify-full" => Ok(Self::VerifyFull),
            _ => Err(SqlPullError::configuration(format!(
                "SSL Mode should be prefer, require and verify-full, got '{}'",
                s
            ))),
        }
    }
}

impl TryFrom<String> for SslMode {
    type Error = SqlPullError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl std::fmt::Display for SslMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Server flavour behind the MySQL wire protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DatabaseType {
    /// MySQL, MariaDB and compatible servers
    #[default]
    MySql,
    /// MongoDB BI connector speaking the MySQL protocol
    MongoDbBi,
}

impl DatabaseType {
    /// Interprets the optional `databaseType` marker of a descriptor.
    pub fn from_marker(marker: Option<&str>) -> Self {
        match marker {
            Some(MONGODB_BI_MARKER) => Self::MongoDbBi,
            _ => Self::MySql,
        }
    }
}

/// Authentication block of a descriptor.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Authentication {
    /// Basic username/password authentication
    #[serde(default)]
    pub basic: Option<Credentials>,
}

/// Structured connection parameters for one MySQL-family data source.
///
/// # Example
/// ```rust
/// use sqlpull_core::config::{ConnectionDescriptor, SslMode};
/// use sqlpull_core::security::Credentials;
///
/// let descriptor = ConnectionDescriptor::new(
///     "jdbc:mysql://dbhost:3307/",
///     "sales",
///     "require",
///     Credentials::new("etl".to_string(), "secret".to_string()),
/// )
/// .unwrap();
///
/// assert_eq!(descriptor.ssl_mode, SslMode::Require);
/// assert!(descriptor.validate().is_ok());
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionDescriptor {
    /// JDBC-style URL embedding host and optional port
    pub url: String,
    /// Optional server flavour marker (`MongoDBBI`)
    #[serde(default)]
    pub database_type: Option<String>,
    /// Database (schema) name
    pub database: String,
    /// Requested TLS policy
    pub ssl_mode: SslMode,
    /// Credentials block
    #[serde(default)]
    pub authentication: Authentication,
}

impl ConnectionDescriptor {
    /// Creates a descriptor, rejecting any `ssl_mode` outside the accepted set.
    ///
    /// # Errors
    /// Returns a configuration error for an unknown SSL mode.
    pub fn new(
        url: impl Into<String>,
        database: impl Into<String>,
        ssl_mode: &str,
        credentials: Credentials,
    ) -> Result<Self> {
        Ok(Self {
            url: url.into(),
            database_type: None,
            database: database.into(),
            ssl_mode: ssl_mode.parse()?,
            authentication: Authentication {
                basic: Some(credentials),
            },
        })
    }

    /// Builder method to set the `databaseType` marker.
    pub fn with_database_type(mut self, marker: impl Into<String>) -> Self {
        self.database_type = Some(marker.into());
        self
    }

    /// Parses a descriptor from the platform's JSON connection block.
    ///
    /// # Errors
    /// Returns a configuration error when fields are missing, the SSL mode is
    /// not accepted, or validation fails.
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        let descriptor: Self = serde_json::from_value(value).map_err(|e| {
            SqlPullError::configuration(format!("Invalid MySQL connection info: {}", e))
        })?;
        descriptor.validate()?;
        Ok(descriptor)
    }

    /// Server flavour derived from the `databaseType` marker.
    pub fn database_type(&self) -> DatabaseType {
        DatabaseType::from_marker(self.database_type.as_deref())
    }

    /// Basic credentials of this descriptor.
    ///
    /// # Errors
    /// Returns a configuration error when no basic credentials are present.
    pub fn credentials(&self) -> Result<&Credentials> {
        self.authentication.basic.as_ref().ok_or_else(|| {
            SqlPullError::configuration("Missing basic authentication for Mysql client")
        })
    }

    /// Validates the descriptor without touching the network.
    ///
    /// # Errors
    /// Returns a configuration error if the URL is empty or credentials are
    /// missing.
    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(SqlPullError::configuration(
                "Connection url cannot be empty",
            ));
        }

        self.credentials()?;
        Ok(())
    }
}

impl std::fmt::Display for ConnectionDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Credentials are intentionally omitted
        write!(
            f,
            "ConnectionDescriptor({} db={} ssl={})",
            self.url, self.database, self.ssl_mode
        )
    }
}
