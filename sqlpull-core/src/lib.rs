//! Core library for sqlpull.
//!
//! sqlpull realizes SQL queries against MySQL-family servers (MySQL and the
//! MongoDB BI connector) into CSV files on local disk, and provides small
//! CSV read/write helpers with per-row transforms.
//!
//! # Security Guarantees
//! - Credentials are held in zeroizing containers and never logged
//! - Connection URLs are logged without credentials
//! - Every query opens its own connection and always closes it
//!
//! # Architecture
//! - Configuration layer turning platform options into a validated
//!   connection descriptor
//! - Factory for query clients keyed by data-source kind
//! - Driver/session traits separating the executor from sqlx

pub mod adapters;
pub mod config;
pub mod connection_url;
pub mod csv_rows;
pub mod driver;
pub mod error;
pub mod executor;
pub mod logging;
pub mod security;

// Re-export commonly used types
pub use adapters::{MySqlClient, QueryClient, create_client};
pub use config::{ConnectionDescriptor, DatabaseType, QueryConfig, SslMode};
pub use connection_url::{ResolvedConnection, build_url};
pub use error::{Result, SqlPullError};
pub use security::Credentials;
