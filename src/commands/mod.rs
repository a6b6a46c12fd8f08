//! Command implementations

pub mod run;
pub mod user;

use crate::Context;
use crate::config::{ConnectionOverrides, HostConfig};
use crate::resource::BackendKind;
use crate::ui;
use anyhow::Result;
use declarative::{ReconcileContext, ReconciliationResult, UserInput, reconcile};
use std::process::ExitCode;

/// Resolve the backend, reconcile one user and print the result
pub fn reconcile_user(
    ctx: &Context,
    kind: BackendKind,
    input: &UserInput,
    overrides: &ConnectionOverrides,
    reconcile_ctx: &ReconcileContext,
) -> Result<ReconciliationResult> {
    let config = HostConfig::load(ctx.config.as_deref())?;
    let backend = config.backend(kind, overrides).build();

    let result = reconcile(backend.as_ref(), input, reconcile_ctx);
    log::info!(
        "{kind}: changed={} failed={} check_mode={}",
        result.changed,
        result.failed,
        reconcile_ctx.check_mode
    );
    Ok(result)
}

/// Exit status for a result: 1 when it failed
pub fn exit_code(result: &ReconciliationResult) -> ExitCode {
    if result.failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Print a result the way the global flags ask for
pub fn finish(ctx: &Context, result: &ReconciliationResult, check_mode: bool) -> Result<ExitCode> {
    ui::print_result(result, ctx.json, ctx.quiet)?;
    if check_mode && result.changed && !ctx.json {
        ui::check_mode_note(ctx.quiet);
    }
    Ok(exit_code(result))
}
