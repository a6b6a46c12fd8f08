//! `hostusers run ARGS.json`: module-style invocation
//!
//! Prints exactly one JSON result once the args are read, including when
//! they are malformed or the config is invalid.

use super::{exit_code, reconcile_user};
use crate::Context;
use crate::invocation::ModuleArgs;
use anyhow::{Context as _, Result};
use declarative::{Error, ReconciliationResult};
use std::io::Read;
use std::path::Path;
use std::process::ExitCode;

pub fn run(ctx: &Context, args_file: &Path) -> Result<ExitCode> {
    let content = read_args(args_file)?;

    let result = match ModuleArgs::from_json(&content) {
        Ok(args) => {
            let reconcile_ctx = args.context();
            let backend = args.backend;
            let (input, overrides) = args.into_parts();
            reconcile_user(ctx, backend, &input, &overrides, &reconcile_ctx).unwrap_or_else(|e| {
                ReconciliationResult::failure(&Error::validation(format!("{e:#}")), false)
            })
        }
        Err(e) => {
            ReconciliationResult::failure(&Error::validation(format!("invalid args: {e}")), false)
        }
    };

    println!("{}", serde_json::to_string(&result)?);
    Ok(exit_code(&result))
}

fn read_args(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .context("Could not read args from stdin")?;
        return Ok(content);
    }
    std::fs::read_to_string(path)
        .with_context(|| format!("Could not read args file: {}", path.display()))
}
