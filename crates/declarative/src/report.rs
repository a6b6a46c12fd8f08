//! Result reporter - one structured result per invocation

use crate::error::{Error, ErrorKind};
use crate::executor::Outcome;
use crate::types::ApplyResult;
use serde::Serialize;

/// Outcome of one reconciliation, as returned to the orchestrator
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconciliationResult {
    pub changed: bool,
    pub msg: String,
    pub failed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    /// Whether the user exists after the run; false when unknown
    pub user_exists: bool,
    /// Fields an update touched (or would touch)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diff: Vec<String>,
}

impl ReconciliationResult {
    /// Build a failed result; `changed` is always false
    pub fn failure(error: &Error, user_exists: bool) -> Self {
        Self {
            changed: false,
            msg: error.to_string(),
            failed: true,
            error_kind: Some(error.kind()),
            user_exists,
            diff: Vec::new(),
        }
    }
}

/// Map an executor outcome to a result
pub fn report(outcome: &Outcome, existed: bool) -> ReconciliationResult {
    let user = &outcome.user;
    let (msg, diff) = match (&outcome.result, outcome.simulated) {
        (ApplyResult::NoChange, _) if existed => (
            format!("User {user} already exists with correct configuration"),
            Vec::new(),
        ),
        (ApplyResult::NoChange, _) => (format!("User {user} does not exist"), Vec::new()),
        (ApplyResult::Created, false) => (format!("User {user} created successfully"), Vec::new()),
        (ApplyResult::Created, true) => (format!("Would create user {user}"), Vec::new()),
        (ApplyResult::Modified { fields }, false) => (
            format!("User {user} updated: {}", fields.join(", ")),
            fields.clone(),
        ),
        (ApplyResult::Modified { fields }, true) => (
            format!("Would update user {user}: {}", fields.join(", ")),
            fields.clone(),
        ),
        (ApplyResult::Removed, false) => (format!("User {user} removed successfully"), Vec::new()),
        (ApplyResult::Removed, true) => (format!("Would remove user {user}"), Vec::new()),
    };

    ReconciliationResult {
        changed: outcome.result.is_change(),
        msg,
        failed: false,
        error_kind: None,
        user_exists: outcome.exists_after,
        diff,
    }
}
