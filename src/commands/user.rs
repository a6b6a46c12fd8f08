//! `hostusers ttrss` and `hostusers freshrss`

use super::{finish, reconcile_user};
use crate::Context;
use crate::cli::{FreshrssArgs, TtrssArgs, UserArgs};
use crate::resource::BackendKind;
use anyhow::Result;
use declarative::ReconcileContext;
use std::process::ExitCode;

fn reconcile_context(user: &UserArgs) -> ReconcileContext {
    ReconcileContext::new()
        .with_check_mode(user.check)
        .with_update_password(user.update_password.into())
}

pub fn ttrss(ctx: &Context, args: TtrssArgs) -> Result<ExitCode> {
    let reconcile_ctx = reconcile_context(&args.user);
    let (input, overrides) = args.into_parts();
    let result = reconcile_user(ctx, BackendKind::Ttrss, &input, &overrides, &reconcile_ctx)?;
    finish(ctx, &result, reconcile_ctx.check_mode)
}

pub fn freshrss(ctx: &Context, args: FreshrssArgs) -> Result<ExitCode> {
    let reconcile_ctx = reconcile_context(&args.user);
    let (input, overrides) = args.into_parts();
    let result = reconcile_user(ctx, BackendKind::Freshrss, &input, &overrides, &reconcile_ctx)?;
    finish(ctx, &result, reconcile_ctx.check_mode)
}
