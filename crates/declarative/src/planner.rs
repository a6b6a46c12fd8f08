//! Planner - turns desired and actual state into a plan

use crate::backend::AttributeSchema;
use crate::context::ReconcileContext;
use crate::diff::{FieldDiff, diff_fields};
use crate::probe::Probe;
use crate::types::{DesiredState, RecordId, UserSpec};

/// A single step towards the desired state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Create(UserSpec),
    Update { id: RecordId, diff: FieldDiff },
    Delete(RecordId),
    NoOp,
}

impl Operation {
    /// Verb used in messages ("create", "update", "remove")
    pub fn verb(&self) -> &'static str {
        match self {
            Self::Create(_) => "create",
            Self::Update { .. } => "update",
            Self::Delete(_) => "remove",
            Self::NoOp => "check",
        }
    }

    pub fn is_noop(&self) -> bool {
        matches!(self, Self::NoOp)
    }
}

/// An ordered, immutable list of operations for one user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    user: String,
    existed: bool,
    operations: Vec<Operation>,
}

impl Plan {
    fn single(user: &str, existed: bool, operation: Operation) -> Self {
        Self {
            user: user.to_string(),
            existed,
            operations: vec![operation],
        }
    }

    /// Name of the user the plan targets
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Whether the user existed when the plan was computed
    pub fn existed(&self) -> bool {
        self.existed
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Check if applying the plan would change anything
    pub fn has_changes(&self) -> bool {
        self.operations.iter().any(|op| !op.is_noop())
    }
}

/// Compute the plan for one user
///
/// Pure: the outcome depends only on the arguments.
pub fn plan(
    desired: &UserSpec,
    probe: &Probe,
    schema: &AttributeSchema,
    ctx: &ReconcileContext,
) -> Plan {
    let name = desired.name.as_str();
    let operation = match (desired.state, &probe.actual) {
        (DesiredState::Absent, None) => Operation::NoOp,
        (DesiredState::Absent, Some(actual)) => Operation::Delete(actual.id.clone()),
        (DesiredState::Present, None) => Operation::Create(desired.clone()),
        (DesiredState::Present, Some(actual)) => {
            let diff = diff_fields(desired, actual, probe.password, ctx.update_password, schema);
            if diff.is_empty() {
                Operation::NoOp
            } else {
                Operation::Update {
                    id: actual.id.clone(),
                    diff,
                }
            }
        }
    };

    Plan::single(name, probe.exists(), operation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{AttrKind, AttrSpec, RequiredField};
    use crate::types::{ActualUser, AttrValue, Attributes, PasswordCheck};

    const SCHEMA: AttributeSchema = AttributeSchema {
        attributes: &[AttrSpec::readable("access_level", AttrKind::Int)],
        required_on_create: &[RequiredField::Password],
    };

    fn existing(level: i64) -> Probe {
        let mut attributes = Attributes::new();
        attributes.insert("access_level".into(), AttrValue::Int(level));
        Probe::found(
            ActualUser {
                id: RecordId::Row(3),
                name: "alice".into(),
                email: None,
                attributes,
                password_hash: Some("SSHA-512:00".into()),
            },
            PasswordCheck::Unknown,
        )
    }

    fn single_op(plan: &Plan) -> &Operation {
        assert_eq!(plan.operations().len(), 1);
        &plan.operations()[0]
    }

    #[test]
    fn test_absent_and_missing_is_noop() {
        let plan = plan(&UserSpec::absent("x"), &Probe::missing(), &SCHEMA, &ReconcileContext::new());
        assert_eq!(single_op(&plan), &Operation::NoOp);
        assert!(!plan.has_changes());
        assert!(!plan.existed());
    }

    #[test]
    fn test_absent_and_existing_deletes() {
        let plan = plan(&UserSpec::absent("alice"), &existing(0), &SCHEMA, &ReconcileContext::new());
        assert_eq!(single_op(&plan), &Operation::Delete(RecordId::Row(3)));
        assert!(plan.existed());
    }

    #[test]
    fn test_present_and_missing_creates() {
        let desired = UserSpec::present("alice").with_password("pw");
        let plan = plan(&desired, &Probe::missing(), &SCHEMA, &ReconcileContext::new());
        assert_eq!(single_op(&plan), &Operation::Create(desired));
    }

    #[test]
    fn test_present_and_matching_is_noop() {
        let desired = UserSpec::present("alice").with_attr("access_level", AttrValue::Int(10));
        let plan = plan(&desired, &existing(10), &SCHEMA, &ReconcileContext::new());
        assert!(!plan.has_changes());
    }

    #[test]
    fn test_present_and_drifted_updates() {
        let desired = UserSpec::present("alice").with_attr("access_level", AttrValue::Int(10));
        let plan = plan(&desired, &existing(0), &SCHEMA, &ReconcileContext::new());
        match single_op(&plan) {
            Operation::Update { id, diff } => {
                assert_eq!(id, &RecordId::Row(3));
                assert_eq!(diff.field_names(), vec!["access_level"]);
            }
            other => panic!("expected update, got {other:?}"),
        }
    }

    #[test]
    fn test_plan_ignores_check_mode() {
        let desired = UserSpec::present("alice").with_password("pw");
        let normal = plan(&desired, &Probe::missing(), &SCHEMA, &ReconcileContext::new());
        let check = plan(&desired, &Probe::missing(), &SCHEMA, &ReconcileContext::check());
        assert_eq!(normal, check);
    }
}
