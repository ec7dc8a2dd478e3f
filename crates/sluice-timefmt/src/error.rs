//! Error types for sluice-timefmt

use thiserror::Error;

/// Result type for layout operations
pub type Result<T> = std::result::Result<T, Error>;

/// Layout compilation and parse failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum Error {
    /// The token string itself is malformed
    #[error("invalid time format {format}: {message}")]
    InvalidFormat { format: String, message: String },

    /// The input did not match a valid layout
    #[error("cannot parse '{value}' with time format {format}: {message}")]
    Parse {
        value: String,
        format: String,
        message: String,
    },
}

impl Error {
    /// Create an invalid format error
    pub fn invalid_format(format: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            format: format.into(),
            message: message.into(),
        }
    }

    /// Create a parse error
    pub fn parse(
        value: impl Into<String>,
        format: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Parse {
            value: value.into(),
            format: format.into(),
            message: message.into(),
        }
    }

    /// The token string involved in the failure
    pub fn format(&self) -> &str {
        match self {
            Self::InvalidFormat { format, .. } | Self::Parse { format, .. } => format,
        }
    }
}
