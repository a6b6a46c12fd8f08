//! Error types for the TT-RSS account store.
//!
//! Errors are categorized so callers can tell an unreachable database
//! from a rejected write without matching on SQLite codes themselves.

use rusqlite::ErrorCode;
use std::path::PathBuf;
use thiserror::Error;

/// Categories of store errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Database missing, unreadable or busy
    Connection,
    /// Uniqueness or other constraint violation
    Conflict,
    /// Read-only database or statement denied
    Permission,
    /// Bad table mapping
    Config,
    /// Other/unknown errors
    Other,
}

/// Errors that can occur while reading or writing TT-RSS accounts.
#[derive(Debug, Error)]
pub enum Error {
    /// The database could not be opened
    #[error("cannot open database {}: {source}", .path.display())]
    Open {
        /// Path that was opened
        path: PathBuf,
        /// Underlying SQLite error
        #[source]
        source: rusqlite::Error,
    },

    /// Database error
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A table or column name in the mapping is not a plain identifier
    #[error("invalid SQL identifier in table mapping: '{0}'")]
    InvalidIdentifier(String),

    /// A row addressed by id no longer exists
    #[error("user #{0} not found")]
    MissingRow(i64),
}

impl Error {
    /// Get the error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Open { .. } => ErrorCategory::Connection,
            Error::InvalidIdentifier(_) => ErrorCategory::Config,
            Error::MissingRow(_) => ErrorCategory::Other,
            Error::Database(e) => match e.sqlite_error_code() {
                Some(
                    ErrorCode::CannotOpen
                    | ErrorCode::DatabaseBusy
                    | ErrorCode::DatabaseLocked
                    | ErrorCode::NotADatabase
                    | ErrorCode::DatabaseCorrupt
                    | ErrorCode::SystemIoFailure,
                ) => ErrorCategory::Connection,
                Some(ErrorCode::ConstraintViolation) => ErrorCategory::Conflict,
                Some(
                    ErrorCode::ReadOnly
                    | ErrorCode::PermissionDenied
                    | ErrorCode::AuthorizationForStatementDenied,
                ) => ErrorCategory::Permission,
                _ => ErrorCategory::Other,
            },
        }
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, Error>;
