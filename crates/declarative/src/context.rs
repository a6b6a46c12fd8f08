//! Per-invocation reconciliation context
//!
//! Built once per call and passed explicitly through probing, planning
//! and execution. Nothing here outlives the invocation.

use crate::types::WriteOnlyPolicy;

/// Options that govern one reconciliation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileContext {
    /// Report what would change without calling any mutating operation
    pub check_mode: bool,
    /// When to write fields the backend cannot read back
    pub update_password: WriteOnlyPolicy,
}

impl ReconcileContext {
    /// Create a context for a normal run
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context for a check-mode run
    pub fn check() -> Self {
        Self {
            check_mode: true,
            ..Self::default()
        }
    }

    pub fn with_check_mode(mut self, check_mode: bool) -> Self {
        self.check_mode = check_mode;
        self
    }

    pub fn with_update_password(mut self, policy: WriteOnlyPolicy) -> Self {
        self.update_password = policy;
        self
    }
}
