//! Execution engine - applies a plan through a backend, or simulates it

use crate::backend::UserBackend;
use crate::context::ReconcileContext;
use crate::error::Result;
use crate::planner::{Operation, Plan};
use crate::types::ApplyResult;

/// What happened when a plan was executed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub user: String,
    pub result: ApplyResult,
    /// True in check mode: nothing was actually written
    pub simulated: bool,
    /// Whether the user exists once the plan has run
    pub exists_after: bool,
}

/// Execute a plan
///
/// In check mode no mutating backend call is made. Otherwise each
/// operation is a single backend call; the first failure aborts the run
/// and is returned with the operation prefixed to its message.
pub fn execute(plan: &Plan, backend: &dyn UserBackend, ctx: &ReconcileContext) -> Result<Outcome> {
    let user = plan.user();
    let mut outcome = Outcome {
        user: user.to_string(),
        result: ApplyResult::NoChange,
        simulated: ctx.check_mode,
        exists_after: plan.existed(),
    };

    for operation in plan.operations() {
        let result = if ctx.check_mode {
            simulate(operation)
        } else {
            apply(operation, backend)
                .map_err(|e| e.context(format!("Failed to {} user {user}", operation.verb())))?
        };

        if !ctx.check_mode {
            match result {
                ApplyResult::Created => outcome.exists_after = true,
                ApplyResult::Removed => outcome.exists_after = false,
                _ => {}
            }
        }
        if result.is_change() {
            log::info!(
                "{}: {} user {user}{}",
                backend.kind(),
                operation.verb(),
                if ctx.check_mode { " (check mode)" } else { "" }
            );
        }
        outcome.result = result;
    }

    Ok(outcome)
}

fn simulate(operation: &Operation) -> ApplyResult {
    match operation {
        Operation::Create(_) => ApplyResult::Created,
        Operation::Update { diff, .. } => ApplyResult::Modified {
            fields: diff.field_names(),
        },
        Operation::Delete(_) => ApplyResult::Removed,
        Operation::NoOp => ApplyResult::NoChange,
    }
}

fn apply(operation: &Operation, backend: &dyn UserBackend) -> Result<ApplyResult> {
    match operation {
        Operation::Create(spec) => {
            let id = backend.create(spec)?;
            log::debug!("{}: created {} as {id}", backend.kind(), spec.name);
            Ok(ApplyResult::Created)
        }
        Operation::Update { id, diff } => {
            backend.update(id, diff)?;
            Ok(ApplyResult::Modified {
                fields: diff.field_names(),
            })
        }
        Operation::Delete(id) => {
            backend.delete(id)?;
            Ok(ApplyResult::Removed)
        }
        Operation::NoOp => Ok(ApplyResult::NoChange),
    }
}
