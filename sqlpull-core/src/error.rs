//! Error types for query extraction and CSV helpers.
//!
//! Every failure is surfaced to the caller; nothing in this crate retries or
//! swallows an error. Connection passwords never appear in error messages.

use thiserror::Error;

/// Main error type for sqlpull operations.
#[derive(Debug, Error)]
pub enum SqlPullError {
    /// Missing or malformed connection descriptor, options or config
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Database connection could not be established or prepared
    #[error("Database connection failed: {context}")]
    Connection {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Statement execution or result streaming failed
    #[error("Query execution failed: {context}")]
    QueryExecution {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Unsupported data source or operation
    #[error("Unsupported operation: {feature} not supported for {database_type}")]
    UnsupportedFeature {
        feature: String,
        database_type: String,
    },

    /// I/O operation failed
    #[error("I/O operation failed: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// CSV encoding or decoding failed
    #[error("CSV operation failed: {context}")]
    Csv {
        context: String,
        #[source]
        source: csv::Error,
    },

    /// Caller-supplied row transform failed
    #[error("Row transform failed: {context}")]
    Transform {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Convenience type alias for Results with SqlPullError
pub type Result<T> = std::result::Result<T, SqlPullError>;

impl SqlPullError {
    /// Creates a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates a connection error with sanitized context
    pub fn connection_failed<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Connection {
            context: "Database connection failed".to_string(),
            source: Box::new(error),
        }
    }

    /// Creates a connection error with explicit context
    pub fn connection_with_context<E>(context: impl Into<String>, error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Connection {
            context: context.into(),
            source: Box::new(error),
        }
    }

    /// Creates a query execution error
    pub fn query_failed<E>(context: impl Into<String>, error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::QueryExecution {
            context: context.into(),
            source: Box::new(error),
        }
    }

    /// Creates an I/O error bound to a path or operation
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Creates a CSV error bound to a path or operation
    pub fn csv(context: impl Into<String>, source: csv::Error) -> Self {
        Self::Csv {
            context: context.into(),
            source,
        }
    }

    /// Wraps an error raised by a caller-supplied transform.
    ///
    /// # Example
    /// ```rust
    /// use sqlpull_core::error::SqlPullError;
    ///
    /// let err = SqlPullError::transform("row 3", "bad".parse::<u32>().unwrap_err());
    /// assert!(err.to_string().contains("row 3"));
    /// ```
    pub fn transform<E>(context: impl Into<String>, error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Transform {
            context: context.into(),
            source: Box::new(error),
        }
    }

    /// Creates an unsupported feature error
    pub fn unsupported_feature(
        feature: impl Into<String>,
        database_type: impl Into<String>,
    ) -> Self {
        Self::UnsupportedFeature {
            feature: feature.into(),
            database_type: database_type.into(),
        }
    }

    /// True for errors detected before any connection attempt.
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }
}
