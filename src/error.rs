//! Error types for prompt-rewind.
//!
//! Only the outer surfaces (configuration loading, terminal setup, the CLI)
//! ever hand a [`RewindError`] to a caller. The history core converts its
//! internal failures into "fewer entries" and logs them instead.

use std::path::PathBuf;

use thiserror::Error;

/// Primary error type for prompt-rewind operations.
#[derive(Error, Debug)]
pub enum RewindError {
    /// A session log line failed to parse.
    #[error("Failed to parse session record at line {line}: {message}")]
    ParseError {
        /// Line number where parsing failed (1-based within the batch).
        line: usize,
        /// Human-readable error message.
        message: String,
        /// Underlying serde_json error, if available.
        #[source]
        source: Option<serde_json::Error>,
    },

    /// File not found.
    #[error("File not found: {path}")]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// Directory not found.
    #[error("Directory not found: {path}")]
    DirectoryNotFound {
        /// Path to the missing directory.
        path: PathBuf,
    },

    /// Permission denied when accessing a file or directory.
    #[error("Permission denied: {path}")]
    PermissionDenied {
        /// Path where access was denied.
        path: PathBuf,
    },

    /// The sessions root could not be located.
    #[error("Session log directory not found. Expected at: {expected_path}")]
    SessionsRootNotFound {
        /// Where the sessions root was expected.
        expected_path: PathBuf,
    },

    /// I/O error.
    #[error("I/O error: {context}")]
    IoError {
        /// Context describing the operation that failed.
        context: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Serialization error.
    #[error("Serialization error: {context}")]
    SerializationError {
        /// Context describing the operation that failed.
        context: String,
        /// Underlying serde_json error.
        #[source]
        source: serde_json::Error,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Human-readable error message.
        message: String,
    },

    /// A key binding string could not be understood.
    #[error("Invalid key binding '{spec}': {reason}")]
    InvalidKeyBinding {
        /// The offending key spec.
        spec: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Terminal setup or drawing failed.
    #[error("Terminal error: {message}")]
    TerminalError {
        /// Human-readable error message.
        message: String,
    },

    /// Unsupported operation or feature.
    #[error("Unsupported: {feature}")]
    Unsupported {
        /// Name of the unsupported feature.
        feature: String,
    },

    /// Interrupted operation.
    #[error("Operation interrupted")]
    Interrupted,
}

impl RewindError {
    /// Create a new parse error with source.
    #[must_use]
    pub fn parse_with_source(line: usize, message: impl Into<String>, source: serde_json::Error) -> Self {
        Self::ParseError {
            line,
            message: message.into(),
            source: Some(source),
        }
    }

    /// Create a new I/O error with context.
    #[must_use]
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::IoError {
            context: context.into(),
            source,
        }
    }

    /// Map an I/O error on `path` to the most specific variant.
    #[must_use]
    pub fn from_io_at(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::FileNotFound { path },
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            _ => Self::io(format!("Failed to access {}", path.display()), source),
        }
    }

    /// Like [`RewindError::from_io_at`], for a directory.
    #[must_use]
    pub fn from_dir_io_at(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::DirectoryNotFound { path: path.into() },
            _ => Self::from_io_at(path, source),
        }
    }

    /// Create a new invalid configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create a new terminal error.
    #[must_use]
    pub fn terminal(message: impl Into<String>) -> Self {
        Self::TerminalError {
            message: message.into(),
        }
    }

    /// Get the exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::ParseError { .. } => exit_codes::EXIT_DATA_ERROR,
            Self::FileNotFound { .. }
            | Self::DirectoryNotFound { .. }
            | Self::SessionsRootNotFound { .. } => exit_codes::EXIT_FILE_NOT_FOUND,
            Self::PermissionDenied { .. } => exit_codes::EXIT_PERMISSION_DENIED,
            Self::InvalidConfig { .. } | Self::InvalidKeyBinding { .. } => exit_codes::EXIT_CONFIG_ERROR,
            Self::IoError { .. } | Self::TerminalError { .. } => exit_codes::EXIT_IO_ERROR,
            Self::Interrupted => exit_codes::EXIT_INTERRUPTED,
            _ => exit_codes::EXIT_GENERAL_ERROR,
        }
    }
}

/// Result type alias for prompt-rewind operations.
pub type Result<T> = std::result::Result<T, RewindError>;

impl From<std::io::Error> for RewindError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError {
            context: "I/O operation failed".to_string(),
            source: err,
        }
    }
}

impl From<serde_json::Error> for RewindError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError {
            context: "JSON operation failed".to_string(),
            source: err,
        }
    }
}

/// Exit codes for CLI operations.
pub mod exit_codes {
    /// General/unspecified error.
    pub const EXIT_GENERAL_ERROR: i32 = 1;
    /// Specified file or directory not found.
    pub const EXIT_FILE_NOT_FOUND: i32 = 3;
    /// Insufficient permissions.
    pub const EXIT_PERMISSION_DENIED: i32 = 4;
    /// Invalid configuration.
    pub const EXIT_CONFIG_ERROR: i32 = 5;
    /// Input data format error (BSD standard).
    pub const EXIT_DATA_ERROR: i32 = 65;
    /// I/O error (BSD standard).
    pub const EXIT_IO_ERROR: i32 = 74;
    /// Terminated by Ctrl+C (128 + SIGINT).
    pub const EXIT_INTERRUPTED: i32 = 130;
}
