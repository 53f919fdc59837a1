//! Error types for packaging operations.
//!
//! Failures fall into two fatal groups: missing inputs (environment, files,
//! tools) and external tool failures. Best-effort steps such as icon resizing
//! never produce an [`Error`]; they log a warning and fall back instead.

use std::fmt::Display;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for packaging operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while resolving, staging, building or packaging a platform.
#[derive(Error, Debug)]
pub enum Error {
    /// A required environment variable, file or tool is absent.
    #[error("missing required input: {0}")]
    MissingInput(String),

    /// An external tool ran and exited with a non-zero status.
    #[error("{tool} failed (exit code {code:?}):\n{stderr}")]
    ToolFailed {
        /// Tool name as invoked
        tool: String,
        /// Exit code, `None` when terminated by a signal
        code: Option<i32>,
        /// Captured diagnostic output of the tool
        stderr: String,
    },

    /// An external tool could not be started at all.
    #[error("failed to run `{command}`: {error}")]
    CommandFailed {
        /// Command that could not be spawned
        command: String,
        /// Underlying spawn error
        #[source]
        error: std::io::Error,
    },

    /// A file system operation failed.
    #[error("{context} {}: {error}", path.display())]
    Fs {
        /// What was being done
        context: &'static str,
        /// Path involved
        path: PathBuf,
        /// Underlying IO error
        #[source]
        error: std::io::Error,
    },

    /// IO errors without a known path
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// A JSON input file could not be parsed.
    #[error("invalid JSON in {}: {error}", path.display())]
    InvalidJson {
        /// File that failed to parse
        path: PathBuf,
        /// Parser error
        #[source]
        error: serde_json::Error,
    },

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parse or join errors
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Archive creation errors
    #[error("archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Directory traversal errors
    #[error("directory traversal error: {0}")]
    WalkDir(#[from] walkdir::Error),

    /// Relative path computation errors
    #[error("path prefix error: {0}")]
    StripPrefix(#[from] std::path::StripPrefixError),

    /// Error with added context
    #[error("{context}: {source}")]
    Context {
        /// Added description
        context: String,
        /// Wrapped error
        source: Box<Error>,
    },

    /// Generic error message
    #[error("{0}")]
    GenericError(String),
}

impl Error {
    /// Whether the error stems from absent configuration or files rather than
    /// from a tool that ran and failed.
    pub fn is_missing_input(&self) -> bool {
        match self {
            Error::MissingInput(_) => true,
            Error::Context { source, .. } => source.is_missing_input(),
            _ => false,
        }
    }
}

/// Attaches the operation and path to IO errors.
pub trait ErrorExt<T> {
    /// Convert an IO error into [`Error::Fs`].
    fn fs_context(self, context: &'static str, path: impl AsRef<Path>) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, std::io::Error> {
    fn fs_context(self, context: &'static str, path: impl AsRef<Path>) -> Result<T> {
        self.map_err(|error| Error::Fs {
            context,
            path: path.as_ref().to_path_buf(),
            error,
        })
    }
}

/// Adds a message to a failing `Result` or an empty `Option`.
pub trait Context<T> {
    /// Wrap the failure with `context`.
    fn context<C: Display>(self, context: C) -> Result<T>;

    /// Wrap the failure with a lazily built message.
    fn with_context<C: Display, F: FnOnce() -> C>(self, f: F) -> Result<T>;
}

impl<T> Context<T> for Result<T> {
    fn context<C: Display>(self, context: C) -> Result<T> {
        self.map_err(|e| Error::Context {
            context: context.to_string(),
            source: Box::new(e),
        })
    }

    fn with_context<C: Display, F: FnOnce() -> C>(self, f: F) -> Result<T> {
        self.map_err(|e| Error::Context {
            context: f().to_string(),
            source: Box::new(e),
        })
    }
}

impl<T> Context<T> for Option<T> {
    fn context<C: Display>(self, context: C) -> Result<T> {
        self.ok_or_else(|| Error::GenericError(context.to_string()))
    }

    fn with_context<C: Display, F: FnOnce() -> C>(self, f: F) -> Result<T> {
        self.ok_or_else(|| Error::GenericError(f().to_string()))
    }
}

/// Return early with a [`Error::GenericError`] built from a format string.
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::packager::Error::GenericError(format!($($arg)*)))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_preserves_missing_input_classification() {
        let err: Result<()> = Err(Error::MissingInput("PWA_BASE_URL".into()));
        let err = err.context("resolving android manifest").unwrap_err();
        assert!(err.is_missing_input());
        assert!(err.to_string().starts_with("resolving android manifest: "));
    }

    #[test]
    fn fs_context_names_the_path() {
        let io: std::io::Result<()> = Err(std::io::Error::from(std::io::ErrorKind::NotFound));
        let err = io.fs_context("reading", "/tmp/missing.json").unwrap_err();
        assert!(err.to_string().contains("/tmp/missing.json"));
        assert!(!err.is_missing_input());
    }
}
