/// Unified error handling for readpref
///
/// Selection failures are ordinary outcomes the caller has to handle
/// (fail the request or try again once the registry has fresh latencies),
/// so they are kept apart from configuration errors.

use std::fmt;
use thiserror::Error;

/// Main error type for readpref operations
#[derive(Debug, Error)]
pub enum ReadPrefError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Server selection errors
    #[error("Selection error: {0}")]
    Selection(#[from] SelectionError),
}

/// Errors produced by the server selection pipeline
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    /// The read preference mode is not one of the five known modes
    #[error("Invalid read preference: {mode}")]
    InvalidReadPreference { mode: String },

    /// A tag is not of the `name:value` form
    #[error("Invalid tag '{tag}': must be name:value")]
    InvalidTag { tag: String },

    /// Role or tag filtering eliminated every server
    #[error("No server matches the read preference")]
    NoMatchingServer,

    /// A stage that needs at least one candidate received none
    #[error("Empty candidate set in {stage}")]
    EmptyCandidateSet { stage: &'static str },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// Result type alias for readpref operations
pub type ReadPrefResult<T> = Result<T, ReadPrefError>;

impl SelectionError {
    /// Create an invalid read preference error
    pub fn invalid_mode<S: Into<String>>(mode: S) -> Self {
        SelectionError::InvalidReadPreference { mode: mode.into() }
    }

    /// Create an invalid tag error
    pub fn invalid_tag<S: Into<String>>(tag: S) -> Self {
        SelectionError::InvalidTag { tag: tag.into() }
    }

    /// Create an empty candidate set error for the named stage
    pub fn empty(stage: &'static str) -> Self {
        SelectionError::EmptyCandidateSet { stage }
    }

    /// True when no usable server was found, regardless of which stage noticed
    pub fn is_no_server(&self) -> bool {
        matches!(
            self,
            SelectionError::NoMatchingServer | SelectionError::EmptyCandidateSet { .. }
        )
    }
}

impl ReadPrefError {
    /// Check if this error is recoverable (selection may be re-run later)
    pub fn is_recoverable(&self) -> bool {
        match self {
            ReadPrefError::Selection(e) => e.is_no_server(),
            ReadPrefError::Config(_) => false,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ReadPrefError::Config(_) => ErrorSeverity::Critical,
            ReadPrefError::Selection(
                SelectionError::InvalidReadPreference { .. } | SelectionError::InvalidTag { .. },
            ) => ErrorSeverity::Error,
            ReadPrefError::Selection(_) => ErrorSeverity::Warning,
        }
    }
}

/// Error severity levels for logging and monitoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Critical errors that require immediate attention
    Critical,
    /// Errors that affect functionality but don't crash the system
    Error,
    /// Warnings about potential issues
    Warning,
    /// Informational messages about recoverable issues
    Info,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Warning => write!(f, "WARNING"),
            ErrorSeverity::Info => write!(f, "INFO"),
        }
    }
}
