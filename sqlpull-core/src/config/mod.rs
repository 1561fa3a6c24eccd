//! Configuration types for query clients.
//!
//! - `ConnectionDescriptor`: caller-owned connection parameters
//! - `QueryConfig`: output directory and fetch size
//! - `descriptor_from_options`: parsing of the platform's raw options
//!
//! # Security
//! Passwords are held in `Credentials` and never appear in `Display` output.

mod connection;
mod options;
mod query;

pub use connection::{
    Authentication, ConnectionDescriptor, DatabaseType, MONGODB_BI_MARKER, SslMode,
};
pub use options::{MYSQL_CLIENT_KEY, descriptor_from_options};
pub use query::{MYSQL_FETCH_SIZE, QueryConfig};
