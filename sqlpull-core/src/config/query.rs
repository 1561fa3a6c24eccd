//! Query execution settings.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Rows pulled from the server per batch while streaming a result set.
pub const MYSQL_FETCH_SIZE: usize = 1000;

/// Settings for one query client.
///
/// # Example
/// ```rust
/// use sqlpull_core::config::QueryConfig;
///
/// let config = QueryConfig::default().with_output_dir("/tmp/extracts");
/// assert_eq!(config.fetch_size, 1000);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Directory that receives result files
    pub output_dir: PathBuf,
    /// Maximum rows buffered between the server stream and the CSV file
    pub fetch_size: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            fetch_size: MYSQL_FETCH_SIZE,
        }
    }
}

impl QueryConfig {
    /// Validates the settings.
    ///
    /// # Errors
    /// Returns a configuration error if the fetch size is zero.
    pub fn validate(&self) -> crate::Result<()> {
        if self.fetch_size == 0 {
            return Err(crate::error::SqlPullError::configuration(
                "fetch_size must be greater than 0",
            ));
        }

        Ok(())
    }

    /// Builder method to set the output directory.
    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    /// Builder method to set the fetch size.
    pub fn with_fetch_size(mut self, fetch_size: usize) -> Self {
        self.fetch_size = fetch_size;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_config_default() {
        let config = QueryConfig::default();
        assert_eq!(config.output_dir, PathBuf::from("."));
        assert_eq!(config.fetch_size, MYSQL_FETCH_SIZE);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_query_config_zero_fetch_size() {
        let config = QueryConfig::default().with_fetch_size(0);
        assert!(config.validate().is_err());
    }
}
