//! Error types for Reposcan

use thiserror::Error;

/// Result type alias for Reposcan operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for Reposcan operations
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A git invocation exited unsuccessfully
    #[error("git {command} failed: {stderr}")]
    Git {
        /// The git arguments, space separated
        command: String,
        /// Trimmed standard error of the failed invocation
        stderr: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid remote URL template
    #[error("Invalid remote template '{0}': must contain the {{name}} placeholder")]
    Template(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}
