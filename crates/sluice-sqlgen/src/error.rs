//! Error types for sluice-sqlgen
//!
//! Errors are split the way the polling loop needs to react to them:
//! - Configuration errors surface once, when a source is provisioned
//! - Generation errors surface per poll and leave the cursor untouched
//! - Query errors come from the external database client and may be retried

use std::fmt;
use thiserror::Error;

/// Result type for sluice-sqlgen operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Invalid or conflicting configuration (fatal at provisioning)
    Configuration,
    /// Date/time conversion of a cursor value
    DateTime,
    /// SQL template compilation or execution
    Template,
    /// Checkpoint snapshot could not be read
    Snapshot,
    /// The external database client failed (retriable)
    Query,
}

impl ErrorCategory {
    /// Whether errors in this category are generally retriable
    #[inline]
    pub const fn is_retriable(self) -> bool {
        matches!(self, Self::Query)
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration => write!(f, "configuration"),
            Self::DateTime => write!(f, "datetime"),
            Self::Template => write!(f, "template"),
            Self::Snapshot => write!(f, "snapshot"),
            Self::Query => write!(f, "query"),
        }
    }
}

/// Where a date/time conversion failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateTimeStage {
    /// Converting a configured, restored or polled value into an instant
    InterfaceToTime,
    /// Rendering an instant through the field's token format
    RenderToken,
}

impl fmt::Display for DateTimeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InterfaceToTime => write!(f, "InterfaceToTime"),
            Self::RenderToken => write!(f, "RenderToken"),
        }
    }
}

/// Main error type for sluice-sqlgen
#[derive(Error, Debug)]
#[allow(missing_docs)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// A cursor field value could not be converted
    #[error("{stage} failed for index field '{field}': {message}")]
    DateTime {
        field: String,
        stage: DateTimeStage,
        message: String,
    },

    /// SQL template error
    #[error("template error: {message}")]
    Template { message: String },

    /// Checkpoint snapshot error
    #[error("invalid index snapshot: {message}")]
    Snapshot { message: String },

    /// Query execution failed in the external client
    #[error("query error: {message}")]
    Query { message: String, sql: Option<String> },
}

impl Error {
    /// Get the error category
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Configuration { .. } => ErrorCategory::Configuration,
            Self::DateTime { .. } => ErrorCategory::DateTime,
            Self::Template { .. } => ErrorCategory::Template,
            Self::Snapshot { .. } => ErrorCategory::Snapshot,
            Self::Query { .. } => ErrorCategory::Query,
        }
    }

    /// Whether this error is retriable
    #[inline]
    pub fn is_retriable(&self) -> bool {
        self.category().is_retriable()
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a date/time conversion error
    pub fn datetime(
        field: impl Into<String>,
        stage: DateTimeStage,
        message: impl fmt::Display,
    ) -> Self {
        Self::DateTime {
            field: field.into(),
            stage,
            message: message.to_string(),
        }
    }

    /// Create a template error
    pub fn template(message: impl Into<String>) -> Self {
        Self::Template {
            message: message.into(),
        }
    }

    /// Create a snapshot error
    pub fn snapshot(message: impl Into<String>) -> Self {
        Self::Snapshot {
            message: message.into(),
        }
    }

    /// Create a query error
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
            sql: None,
        }
    }

    /// Create a query error with SQL
    pub fn query_with_sql(message: impl Into<String>, sql: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
            sql: Some(sql.into()),
        }
    }
}
