//! Actual-state prober

use crate::backend::UserBackend;
use crate::error::Result;
use crate::types::{ActualUser, PasswordCheck, UserSpec};

/// Live state of one user, as read for a single invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Probe {
    /// `None` whether the backend reported absence or never had the user
    pub actual: Option<ActualUser>,
    /// Outcome of checking the supplied password against the stored one
    pub password: PasswordCheck,
}

impl Probe {
    /// Probe for a user that does not exist
    pub fn missing() -> Self {
        Self {
            actual: None,
            password: PasswordCheck::Unknown,
        }
    }

    /// Probe for an existing user
    pub fn found(actual: ActualUser, password: PasswordCheck) -> Self {
        Self {
            actual: Some(actual),
            password,
        }
    }

    pub fn exists(&self) -> bool {
        self.actual.is_some()
    }
}

/// Read the current record for `spec.name`
///
/// "Not found" is never an error. The password is only checked when the
/// user exists and the caller wants it present with a password.
pub fn probe(backend: &dyn UserBackend, spec: &UserSpec) -> Result<Probe> {
    let Some(actual) = backend.fetch(&spec.name)? else {
        log::debug!("{}: user {} not found", backend.kind(), spec.name);
        return Ok(Probe::missing());
    };

    let password = match (&spec.password, spec.state.is_present()) {
        (Some(password), true) => backend.password_matches(&actual, password)?,
        _ => PasswordCheck::Unknown,
    };

    log::debug!(
        "{}: user {} found as {} (password check: {password:?})",
        backend.kind(),
        spec.name,
        actual.id
    );
    Ok(Probe::found(actual, password))
}
