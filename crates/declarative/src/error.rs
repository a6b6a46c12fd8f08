//! Error taxonomy for reconciliation.
//!
//! Every backend maps its own failures into one of these variants before
//! they reach the engine, so callers only ever see this shape.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Category of a reconciliation failure, as reported to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    /// Malformed or missing input, detected before any mutating call
    ValidationError,
    /// Backend (database or subprocess) unreachable
    ConnectionError,
    /// Uniqueness violation on create
    ConflictError,
    /// Non-zero subprocess exit or unparsable backend output
    BackendExecutionError,
    /// Backend denied the requested operation
    PermissionError,
}

impl ErrorKind {
    /// Whether the orchestrator may retry the whole invocation.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ConnectionError)
    }

    /// Get a user-friendly description of this error kind.
    pub fn description(&self) -> &'static str {
        match self {
            Self::ValidationError => "Invalid input",
            Self::ConnectionError => "Backend unreachable",
            Self::ConflictError => "User already exists",
            Self::BackendExecutionError => "Backend command failed",
            Self::PermissionError => "Permission denied",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ValidationError => "ValidationError",
            Self::ConnectionError => "ConnectionError",
            Self::ConflictError => "ConflictError",
            Self::BackendExecutionError => "BackendExecutionError",
            Self::PermissionError => "PermissionError",
        };
        f.write_str(name)
    }
}

/// Errors that can occur while reconciling a user.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed or missing input
    #[error("{0}")]
    Validation(String),

    /// Backend unreachable
    #[error("{0}")]
    Connection(String),

    /// Backend reported a uniqueness violation
    #[error("{0}")]
    Conflict(String),

    /// Backend command failed or produced output we could not parse
    #[error("{}", format_execution(.message, .stderr))]
    BackendExecution {
        /// What failed
        message: String,
        /// Captured error stream, if any
        stderr: String,
    },

    /// Backend denied the operation
    #[error("{0}")]
    Permission(String),
}

fn format_execution(message: &str, stderr: &str) -> String {
    if stderr.is_empty() {
        message.to_string()
    } else {
        format!("{message}: {stderr}")
    }
}

impl Error {
    /// Shorthand for a validation failure.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Shorthand for a backend execution failure without captured output.
    pub fn execution(message: impl Into<String>) -> Self {
        Self::BackendExecution {
            message: message.into(),
            stderr: String::new(),
        }
    }

    /// The taxonomy entry for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::ValidationError,
            Self::Connection(_) => ErrorKind::ConnectionError,
            Self::Conflict(_) => ErrorKind::ConflictError,
            Self::BackendExecution { .. } => ErrorKind::BackendExecutionError,
            Self::Permission(_) => ErrorKind::PermissionError,
        }
    }

    /// Whether this error is typically transient and worth retrying.
    pub fn is_retryable(&self) -> bool {
        self.kind().is_retryable()
    }

    /// Prefix the message with what was being attempted, keeping the kind.
    pub fn context(self, action: impl fmt::Display) -> Self {
        match self {
            Self::Validation(m) => Self::Validation(format!("{action}: {m}")),
            Self::Connection(m) => Self::Connection(format!("{action}: {m}")),
            Self::Conflict(m) => Self::Conflict(format!("{action}: {m}")),
            Self::BackendExecution { message, stderr } => Self::BackendExecution {
                message: format!("{action}: {message}"),
                stderr,
            },
            Self::Permission(m) => Self::Permission(format!("{action}: {m}")),
        }
    }
}

/// Result type for reconciliation operations.
pub type Result<T> = std::result::Result<T, Error>;
