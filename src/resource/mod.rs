//! User store backends
//!
//! Each backend wraps one kit crate behind [`declarative::UserBackend`]:
//! - `ttrss`: the TT-RSS SQLite database, through `ttrsskit`
//! - `freshrss`: the FreshRSS CLI scripts, through `freshrsskit`
//!
//! The backend is picked once, from configuration, when the invocation
//! starts; the engine only ever sees `&dyn UserBackend`.

pub mod freshrss_user;
pub mod ttrss_user;

pub use freshrss_user::FreshrssUsers;
pub use ttrss_user::TtrssUsers;

use declarative::UserBackend;
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;

/// Which application's users to manage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Ttrss,
    Freshrss,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ttrss => f.write_str("ttrss"),
            Self::Freshrss => f.write_str("freshrss"),
        }
    }
}

/// Fully resolved connection settings for one backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendConfig {
    Ttrss {
        database: PathBuf,
        tables: ttrsskit::TableMapping,
    },
    Freshrss(freshrsskit::CliConfig),
}

impl BackendConfig {
    pub fn kind(&self) -> BackendKind {
        match self {
            Self::Ttrss { .. } => BackendKind::Ttrss,
            Self::Freshrss(_) => BackendKind::Freshrss,
        }
    }

    /// Construct the backend; nothing is opened or run yet
    pub fn build(self) -> Box<dyn UserBackend> {
        log::debug!("using {} backend: {self:?}", self.kind());
        match self {
            Self::Ttrss { database, tables } => Box::new(TtrssUsers::new(database, tables)),
            Self::Freshrss(config) => Box::new(FreshrssUsers::new(config)),
        }
    }
}
