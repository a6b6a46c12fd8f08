//! Error types for FreshRSS CLI operations.
//!
//! Errors are categorized so callers can tell a missing PHP binary from
//! a script that ran and refused the request.

use std::io;
use thiserror::Error;

/// Categories of FreshRSS CLI errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// PHP binary or wrapper could not be found
    Connection,
    /// Not allowed to run the command
    Permission,
    /// Rejected before running anything
    Invalid,
    /// The script ran and failed, or printed something unreadable
    Execution,
}

/// Errors that can occur while running FreshRSS CLI scripts.
#[derive(Debug, Error)]
pub enum Error {
    /// The process could not be started
    #[error("failed to execute {program}: {source}")]
    Spawn {
        /// Program that was spawned (`php` or `sudo`)
        program: String,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The script exited non-zero
    #[error("{script} exited with {}", exit_label(.code))]
    CommandFailed {
        /// Script name, e.g. `create-user.php`
        script: String,
        /// Exit code, if the process exited normally
        code: Option<i32>,
        /// Captured standard error
        stderr: String,
    },

    /// Output did not have the expected shape
    #[error("unexpected output from {script}: {message}")]
    Parse {
        /// Script whose output was read
        script: String,
        /// What was wrong with it
        message: String,
    },

    /// Output was not valid JSON
    #[error("invalid JSON in user listing: {0}")]
    Json(#[from] serde_json::Error),

    /// The username can never be a FreshRSS user
    #[error("invalid FreshRSS username '{0}'")]
    InvalidUsername(String),
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("status {c}"),
        None => "a signal".to_string(),
    }
}

impl Error {
    /// Get the error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Spawn { source, .. } => match source.kind() {
                io::ErrorKind::PermissionDenied => ErrorCategory::Permission,
                _ => ErrorCategory::Connection,
            },
            Error::InvalidUsername(_) => ErrorCategory::Invalid,
            Error::CommandFailed { .. } | Error::Parse { .. } | Error::Json(_) => {
                ErrorCategory::Execution
            }
        }
    }

    /// Captured stderr, for errors from a script that ran
    pub fn stderr(&self) -> Option<&str> {
        match self {
            Error::CommandFailed { stderr, .. } => Some(stderr.trim()),
            _ => None,
        }
    }
}

/// Result type for FreshRSS CLI operations.
pub type Result<T> = std::result::Result<T, Error>;
