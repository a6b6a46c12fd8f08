//! The reconciliation pipeline
//!
//! Descriptor → Prober → Planner → Executor → Reporter, for one user.

use crate::backend::UserBackend;
use crate::context::ReconcileContext;
use crate::descriptor::{UserInput, ensure_creatable};
use crate::error::Result;
use crate::executor::{Outcome, execute};
use crate::planner::{Operation, plan};
use crate::probe::probe;
use crate::report::{ReconciliationResult, report};
use crate::types::UserSpec;

/// Reconcile one user and report the outcome
///
/// Never fails: every error is folded into the returned result.
pub fn reconcile(
    backend: &dyn UserBackend,
    input: &UserInput,
    ctx: &ReconcileContext,
) -> ReconciliationResult {
    let mut existed = None;
    match run(backend, input, ctx, &mut existed) {
        Ok(outcome) => report(&outcome, existed.unwrap_or(false)),
        Err(e) => {
            log::warn!("{}: {e}", backend.kind());
            ReconciliationResult::failure(&e, existed.unwrap_or(false))
        }
    }
}

fn run(
    backend: &dyn UserBackend,
    input: &UserInput,
    ctx: &ReconcileContext,
    existed: &mut Option<bool>,
) -> Result<Outcome> {
    let spec = UserSpec::from_input(input, backend.schema())?;
    backend.validate_name(&spec.name)?;

    let probe = probe(backend, &spec)
        .map_err(|e| e.context(format!("Failed to look up user {}", spec.name)))?;
    *existed = Some(probe.exists());

    if spec.state.is_present() && !probe.exists() {
        ensure_creatable(&spec, backend.schema())
            .map_err(|e| e.context(format!("Cannot create user {}", spec.name)))?;
    }

    let plan = plan(&spec, &probe, backend.schema(), ctx);
    let verbs: Vec<_> = plan.operations().iter().map(Operation::verb).collect();
    log::debug!("{}: plan for {}: {verbs:?}", backend.kind(), spec.name);

    execute(&plan, backend, ctx)
}

/// Validate input without touching the backend
pub fn validate(backend: &dyn UserBackend, input: &UserInput) -> Result<UserSpec> {
    let spec = UserSpec::from_input(input, backend.schema())?;
    backend.validate_name(&spec.name)?;
    Ok(spec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::memory::MemoryBackend;
    use crate::types::{AttrValue, DesiredState};
    use serde_json::json;

    fn input(value: serde_json::Value) -> UserInput {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_alice_scenario() {
        let backend = MemoryBackend::new();
        let ctx = ReconcileContext::new();
        let create = input(json!({"name": "alice", "password": "hunter2", "state": "present"}));
        let delete = input(json!({"name": "alice", "state": "absent"}));

        let first = reconcile(&backend, &create, &ctx);
        assert!(first.changed);
        assert!(!first.failed);
        assert!(first.user_exists);

        let second = reconcile(&backend, &create, &ctx);
        assert!(!second.changed, "{}", second.msg);

        let third = reconcile(&backend, &delete, &ctx);
        assert!(third.changed);
        assert!(!third.user_exists);

        let fourth = reconcile(&backend, &delete, &ctx);
        assert!(!fourth.changed);
        assert!(!fourth.failed);
    }

    #[test]
    fn test_fixed_point_after_change() {
        let backend = MemoryBackend::new();
        let ctx = ReconcileContext::new();
        let desired = input(json!({
            "name": "bob",
            "password": "pw",
            "email": "bob@example.org",
            "attributes": {"access_level": 10, "api_enabled": true}
        }));

        let result = reconcile(&backend, &desired, &ctx);
        assert!(result.changed && !result.failed);

        let actual = backend.get("bob").unwrap();
        assert_eq!(actual.email.as_deref(), Some("bob@example.org"));
        assert_eq!(actual.attributes["access_level"], AttrValue::Int(10));
        assert_eq!(actual.attributes["api_enabled"], AttrValue::Bool(true));
        assert!(actual.password_hash.is_some());
    }

    #[test]
    fn test_check_mode_purity() {
        let backend = MemoryBackend::new();
        backend.seed(crate::types::UserSpec::present("carol").with_password("pw"));
        let before = backend.snapshot();
        let ctx = ReconcileContext::check();

        let inputs = [
            input(json!({"name": "dave", "password": "x"})),
            input(json!({"name": "carol", "state": "absent"})),
            input(json!({"name": "carol", "password": "new", "attributes": {"access_level": 10}})),
            input(json!({"name": "nobody", "state": "absent"})),
        ];
        for _ in 0..3 {
            for desired in &inputs {
                let result = reconcile(&backend, desired, &ctx);
                assert!(!result.failed, "{}", result.msg);
            }
        }

        assert_eq!(backend.snapshot(), before);
    }

    #[test]
    fn test_check_mode_reports_would_create() {
        let backend = MemoryBackend::new();
        let result = reconcile(
            &backend,
            &input(json!({"name": "dave", "password": "x"})),
            &ReconcileContext::check(),
        );
        assert!(result.changed);
        assert_eq!(result.msg, "Would create user dave");
        assert!(!result.user_exists);
    }

    #[test]
    fn test_absence_noop() {
        let backend = MemoryBackend::new();
        let result = reconcile(
            &backend,
            &input(json!({"name": "x", "state": "absent"})),
            &ReconcileContext::new(),
        );
        assert!(!result.changed);
        assert!(!result.failed);
        assert_eq!(result.msg, "User x does not exist");
    }

    #[test]
    fn test_partial_field_preservation() {
        let backend = MemoryBackend::new();
        backend.seed(
            crate::types::UserSpec::present("erin")
                .with_password("pw")
                .with_attr("access_level", AttrValue::Int(0))
                .with_attr("api_enabled", AttrValue::Bool(true)),
        );

        let result = reconcile(
            &backend,
            &input(json!({"name": "erin", "attributes": {"access_level": 10}})),
            &ReconcileContext::new(),
        );

        assert!(result.changed);
        assert_eq!(result.diff, vec!["access_level"]);
        let actual = backend.get("erin").unwrap();
        assert_eq!(actual.attributes["access_level"], AttrValue::Int(10));
        assert_eq!(actual.attributes["api_enabled"], AttrValue::Bool(true));
    }

    #[test]
    fn test_missing_password_on_create() {
        let backend = MemoryBackend::new();
        let result = reconcile(
            &backend,
            &input(json!({"name": "frank", "email": "frank@example.org"})),
            &ReconcileContext::new(),
        );
        assert!(result.failed);
        assert!(!result.changed);
        assert_eq!(result.error_kind, Some(ErrorKind::ValidationError));
        assert!(result.msg.ends_with("missing required field: password"));
        assert_eq!(backend.calls(), vec!["fetch frank"]);
    }

    #[test]
    fn test_existing_user_needs_no_password() {
        let backend = MemoryBackend::new();
        backend.seed(crate::types::UserSpec::present("gina").with_password("pw"));
        let result = reconcile(
            &backend,
            &input(json!({"name": "gina", "email": "gina@example.org"})),
            &ReconcileContext::new(),
        );
        assert!(result.changed, "{}", result.msg);
        assert_eq!(result.msg, "User gina updated: email");
    }

    #[test]
    fn test_validation_happens_before_backend_calls() {
        let backend = MemoryBackend::new();
        let result = reconcile(
            &backend,
            &input(json!({"name": "", "state": "present"})),
            &ReconcileContext::new(),
        );
        assert_eq!(result.error_kind, Some(ErrorKind::ValidationError));
        assert!(backend.calls().is_empty());
    }

    #[test]
    fn test_fetch_failure_is_reported() {
        let backend = MemoryBackend::new();
        backend.fail_fetch(crate::error::Error::Connection("database is locked".into()));
        let result = reconcile(
            &backend,
            &input(json!({"name": "hank", "password": "pw"})),
            &ReconcileContext::new(),
        );
        assert!(result.failed);
        assert!(!result.changed);
        assert_eq!(result.error_kind, Some(ErrorKind::ConnectionError));
        assert_eq!(result.msg, "Failed to look up user hank: database is locked");
    }

    #[test]
    fn test_validate_does_not_touch_backend() {
        let backend = MemoryBackend::new();
        let spec = validate(&backend, &input(json!({"name": "ivy", "password": "pw"}))).unwrap();
        assert_eq!(spec.state, DesiredState::Present);
        assert!(backend.calls().is_empty());
    }
}
