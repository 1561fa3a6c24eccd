//! MySQL query client.
//!
//! # Module Structure
//! - `driver`: sqlx connection/session implementation (feature `mysql`)
//! - `value_rendering`: MySQL cell to string conversion (feature `mysql`)
//!
//! # Security Guarantees
//! - Credentials are kept in zeroizing containers and never logged
//! - The logged connection URL carries no credentials
//! - One connection per query, always closed afterwards

#[cfg(feature = "mysql")]
pub mod driver;
#[cfg(feature = "mysql")]
pub mod value_rendering;


use super::QueryClient;
use crate::Result;
use crate::config::{ConnectionDescriptor, QueryConfig};
use crate::connection_url::{ResolvedConnection, build_url};
use crate::driver::QueryDriver;
use crate::security::Credentials;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;

#[cfg(feature = "mysql")]
pub use driver::{SqlxMySqlDriver, SqlxMySqlSession, connect_options};

/// Data-source kind handled by [`MySqlClient`].
pub const MYSQL_KIND: &str = "mysql";

/// Query client for MySQL-family servers.
///
/// Construction validates the descriptor and builds the connection URL up
/// front; nothing touches the network until [`QueryClient::realize_query`].
pub struct MySqlClient {
    connection: ResolvedConnection,
    credentials: Credentials,
    config: QueryConfig,
    driver: Arc<dyn QueryDriver>,
}

impl std::fmt::Debug for MySqlClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MySqlClient")
            .field("connection", &self.connection)
            .field("config", &self.config)
            .field("driver", &self.driver.name())
            // credentials intentionally omitted
            .finish_non_exhaustive()
    }
}

impl MySqlClient {
    /// Whether this client handles the given data-source kind.
    pub fn accepts(kind: &str) -> bool {
        kind == MYSQL_KIND
    }

    /// Creates a client using the sqlx MySQL driver.
    ///
    /// # Errors
    /// Returns a configuration error if the descriptor is invalid or its URL
    /// cannot be parsed.
    #[cfg(feature = "mysql")]
    pub fn new(descriptor: &ConnectionDescriptor) -> Result<Self> {
        Self::with_driver(descriptor, Arc::new(SqlxMySqlDriver))
    }

    /// Creates a client from the platform's raw options document.
    ///
    /// # Errors
    /// Returns a configuration error as described for
    /// [`crate::config::descriptor_from_options`].
    #[cfg(feature = "mysql")]
    pub fn from_options(options: &serde_json::Value) -> Result<Self> {
        let descriptor = crate::config::descriptor_from_options(options)?;
        Self::new(&descriptor)
    }

    /// Creates a client with an explicit driver.
    ///
    /// # Errors
    /// Returns a configuration error if the descriptor is invalid or its URL
    /// cannot be parsed.
    pub fn with_driver(
        descriptor: &ConnectionDescriptor,
        driver: Arc<dyn QueryDriver>,
    ) -> Result<Self> {
        descriptor.validate()?;
        let credentials = descriptor.credentials()?.clone();
        let connection = build_url(descriptor)?;

        Ok(Self {
            connection,
            credentials,
            config: QueryConfig::default(),
            driver,
        })
    }

    /// Replaces the query settings.
    ///
    /// # Errors
    /// Returns a configuration error if `config` is invalid.
    pub fn with_config(mut self, config: QueryConfig) -> Result<Self> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    /// The resolved connection target.
    pub const fn connection(&self) -> &ResolvedConnection {
        &self.connection
    }

    /// The active query settings.
    pub const fn config(&self) -> &QueryConfig {
        &self.config
    }
}

#[async_trait]
impl QueryClient for MySqlClient {
    fn kind(&self) -> &'static str {
        MYSQL_KIND
    }

    async fn realize_query(&self, query: &str) -> Result<PathBuf> {
        crate::executor::execute_to_csv(
            self.driver.as_ref(),
            &self.connection,
            &self.credentials,
            &self.config,
            query,
        )
        .await
    }
}
