//! # Declarative
//!
//! Idempotent reconciliation of application user accounts.
//!
//! This crate provides the core abstractions for declaring the desired
//! state of a user, reading the live state from a backend, and converging
//! the two with the smallest possible change.
//!
//! ## Core Concepts
//!
//! - **UserSpec**: the validated desired state (name, password, email, attributes, presence)
//! - **UserBackend**: the only way to read or write a user store
//! - **Probe**: the live state of one user, fetched fresh per invocation
//! - **Plan**: the single operation (create, update, delete or nothing) that converges it
//! - **ReconciliationResult**: `changed` / `msg` / `failed`, returned once per call
//!
//! ## Example
//!
//! ```ignore
//! use declarative::{ReconcileContext, UserInput, reconcile};
//!
//! let input: UserInput = serde_json::from_str(r#"{"name": "alice", "password": "hunter2"}"#)?;
//! let result = reconcile(&backend, &input, &ReconcileContext::new());
//! assert!(result.changed);
//!
//! // Running it again converges to a no-op
//! let result = reconcile(&backend, &input, &ReconcileContext::new());
//! assert!(!result.changed);
//! ```
//!
//! ## Check Mode
//!
//! With [`ReconcileContext::check`], the plan is computed as usual but no
//! mutating backend call is made; the result says what would happen.

pub mod backend;
pub mod context;
pub mod descriptor;
pub mod diff;
pub mod error;
pub mod executor;
pub mod planner;
pub mod probe;
pub mod reconcile;
pub mod report;
pub mod types;

#[cfg(test)]
mod memory;

// Re-export main types at crate root
pub use backend::{Access, AttrKind, AttrSpec, AttributeSchema, RequiredField, UserBackend};
pub use context::ReconcileContext;
pub use descriptor::{UserInput, ensure_creatable};
pub use diff::{FieldChange, FieldDiff, diff_fields};
pub use error::{Error, ErrorKind, Result};
pub use executor::{Outcome, execute};
pub use planner::{Operation, Plan, plan};
pub use probe::{Probe, probe};
pub use reconcile::{reconcile, validate};
pub use report::{ReconciliationResult, report};
pub use types::{
    ActualUser, ApplyResult, AttrValue, Attributes, DesiredState, PasswordCheck, RecordId,
    Secret, UserSpec, WriteOnlyPolicy,
};
