//! Error types for the command line front end.

use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, PackagerError>;

/// Main error type of the binary
#[derive(Error, Debug)]
pub enum PackagerError {
    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Packaging errors
    #[error("{0}")]
    Packager(#[from] crate::packager::Error),
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },
}

impl PackagerError {
    /// Whether the run failed on an absent input rather than a tool.
    pub fn is_missing_input(&self) -> bool {
        match self {
            PackagerError::Cli(_) => true,
            PackagerError::Packager(e) => e.is_missing_input(),
            PackagerError::Io(_) | PackagerError::Json(_) => false,
        }
    }
}
