//! Common error types for omc

use std::path::PathBuf;
use thiserror::Error;

/// Common result type for omc operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across omc crates
#[derive(Error, Debug)]
pub enum Error {
    /// A rule data file could not be read
    #[error("Failed to read rule data {path}: {source}")]
    RuleDataIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A rule data file was read but its content is malformed
    #[error("Invalid rule data in {path}: {message}")]
    InvalidRuleData { path: PathBuf, message: String },

    /// A registry key could not be compiled into a matcher pattern
    #[error("Invalid artist pattern '{key}': {source}")]
    Pattern {
        key: String,
        #[source]
        source: regex::Error,
    },

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    pub(crate) fn invalid_rule_data(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Error::InvalidRuleData {
            path: path.into(),
            message: message.into(),
        }
    }
}
