//! Typed error handling for deadlabel.
//!
//! Provides structured errors that library consumers can match on,
//! with full context about what went wrong and where.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for deadlabel operations.
///
/// The rule itself never surfaces these: structural problems inside one file
/// degrade to "no violation" / "no correction". They are returned by the
/// loading, configuration and fix layers around it.
#[derive(Error, Debug)]
pub enum DeadlabelError {
    /// I/O error when reading/writing files
    #[error("I/O error at {path}: {message}")]
    Io {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Syntax sidecar is missing or not valid structure/syntax-map JSON
    #[error("Syntax data error in {path}: {message}")]
    Syntax { path: PathBuf, message: String },

    /// Configuration file errors
    #[error("Config error at {path}: {message}")]
    Config { path: PathBuf, message: String },

    /// A node lacks offset/length, or a byte range does not fall on
    /// character boundaries of the text
    #[error("Missing structural data: {message}")]
    MissingStructuralData { message: String },

    /// No token follows the given byte offset
    #[error("No token after byte offset {offset}")]
    NoMatchingToken { offset: usize },

    /// Fix operation errors
    #[error("Fix error: {message}")]
    Fix { message: String },

    /// Cache-related errors
    #[error("Cache error: {message}")]
    Cache { message: String },

    /// Invalid argument provided
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },
}

impl DeadlabelError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Create a syntax data error.
    pub fn syntax(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Syntax {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a config error.
    pub fn config(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Config {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a missing structural data error.
    pub fn missing_structure(message: impl Into<String>) -> Self {
        Self::MissingStructuralData {
            message: message.into(),
        }
    }

    /// Create a fix error.
    pub fn fix(message: impl Into<String>) -> Self {
        Self::Fix {
            message: message.into(),
        }
    }

    /// Create a cache error.
    pub fn cache(message: impl Into<String>) -> Self {
        Self::Cache {
            message: message.into(),
        }
    }

    /// Check if this is a recoverable error (the run can continue with other files).
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Syntax { .. }
                | Self::MissingStructuralData { .. }
                | Self::NoMatchingToken { .. }
                | Self::Cache { .. }
        )
    }

    /// Get the path associated with this error, if any.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::Io { path, .. } => Some(path),
            Self::Syntax { path, .. } => Some(path),
            Self::Config { path, .. } => Some(path),
            _ => None,
        }
    }
}

/// Convenience type alias for deadlabel results.
pub type DeadlabelResult<T> = Result<T, DeadlabelError>;

/// Extension trait for converting std::io::Error with path context.
pub trait IoResultExt<T> {
    /// Add path context to an I/O error.
    fn with_path(self, path: impl Into<PathBuf>) -> DeadlabelResult<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> DeadlabelResult<T> {
        self.map_err(|e| DeadlabelError::io(path, e))
    }
}
