//! Field-level diff between desired and actual state

use crate::backend::{Access, AttributeSchema};
use crate::types::{ActualUser, AttrValue, Attributes, PasswordCheck, Secret, UserSpec, WriteOnlyPolicy};
use serde::Serialize;

/// One changed field, for reporting
///
/// Secret values never appear here: passwords and secret attributes are
/// reported by name only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldChange {
    pub field: String,
    pub from: Option<String>,
    pub to: Option<String>,
}

/// The fields an update must write, and nothing else
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldDiff {
    /// New password to store, if one must be written
    pub password: Option<Secret>,
    /// New email, if it differs
    pub email: Option<String>,
    /// Changed attributes only
    pub attributes: Attributes,
    /// Human-readable view of the same changes, in apply order
    pub changes: Vec<FieldChange>,
}

impl FieldDiff {
    /// Check if there is nothing to write
    pub fn is_empty(&self) -> bool {
        self.password.is_none() && self.email.is_none() && self.attributes.is_empty()
    }

    /// Names of the changed fields
    pub fn field_names(&self) -> Vec<String> {
        self.changes.iter().map(|c| c.field.clone()).collect()
    }
}

/// Compare a present spec with an existing record
///
/// Only fields named in the desired state are compared; anything it leaves
/// out is left alone. Write-only fields can't be compared, so they are
/// written only when the policy says so (or, for the password, when the
/// backend proves it differs).
pub fn diff_fields(
    desired: &UserSpec,
    actual: &ActualUser,
    password_check: PasswordCheck,
    policy: WriteOnlyPolicy,
    schema: &AttributeSchema,
) -> FieldDiff {
    let mut diff = FieldDiff::default();
    let always = policy == WriteOnlyPolicy::Always;

    if let Some(password) = &desired.password {
        let write = match password_check {
            PasswordCheck::Matches => false,
            PasswordCheck::Differs => true,
            PasswordCheck::Unknown => always,
        };
        if write {
            diff.password = Some(password.clone());
            diff.changes.push(FieldChange {
                field: "password".to_string(),
                from: None,
                to: None,
            });
        }
    }

    if let Some(email) = &desired.email
        && actual.email.as_ref() != Some(email)
    {
        diff.email = Some(email.clone());
        diff.changes.push(FieldChange {
            field: "email".to_string(),
            from: actual.email.clone(),
            to: Some(email.clone()),
        });
    }

    for (name, value) in &desired.attributes {
        let access = schema.get(name).map_or(Access::Readable, |spec| spec.access);
        let write = match access {
            Access::Readable => actual.attributes.get(name) != Some(value),
            Access::WriteOnly => always,
            Access::CreateOnly => false,
        };
        if !write {
            continue;
        }

        let secret = matches!(value, AttrValue::Secret(_));
        diff.attributes.insert(name.clone(), value.clone());
        diff.changes.push(FieldChange {
            field: name.clone(),
            from: if secret {
                None
            } else {
                actual.attributes.get(name).map(ToString::to_string)
            },
            to: if secret { None } else { Some(value.to_string()) },
        });
    }

    diff
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{AttrKind, AttrSpec, RequiredField};
    use crate::types::RecordId;

    const SCHEMA: AttributeSchema = AttributeSchema {
        attributes: &[
            AttrSpec::readable("a", AttrKind::Int),
            AttrSpec::readable("b", AttrKind::Int),
            AttrSpec::write_only("token", AttrKind::Secret),
            AttrSpec::create_only("no_default_feeds", AttrKind::Bool),
        ],
        required_on_create: &[RequiredField::Password],
    };

    fn actual() -> ActualUser {
        let mut attributes = Attributes::new();
        attributes.insert("a".into(), AttrValue::Int(1));
        attributes.insert("b".into(), AttrValue::Int(2));
        ActualUser {
            id: RecordId::Row(7),
            name: "alice".into(),
            email: Some("alice@example.org".into()),
            attributes,
            password_hash: Some("SSHA-512:abc".into()),
        }
    }

    #[test]
    fn test_partial_spec_touches_only_named_fields() {
        let desired = UserSpec::present("alice").with_attr("a", AttrValue::Int(5));
        let diff = diff_fields(
            &desired,
            &actual(),
            PasswordCheck::Unknown,
            WriteOnlyPolicy::OnCreate,
            &SCHEMA,
        );

        assert_eq!(diff.attributes.len(), 1);
        assert_eq!(diff.attributes["a"], AttrValue::Int(5));
        assert!(diff.email.is_none());
        assert_eq!(
            diff.changes,
            vec![FieldChange {
                field: "a".into(),
                from: Some("1".into()),
                to: Some("5".into()),
            }]
        );
    }

    #[test]
    fn test_matching_fields_produce_empty_diff() {
        let desired = UserSpec::present("alice")
            .with_email("alice@example.org")
            .with_attr("b", AttrValue::Int(2));
        let diff = diff_fields(
            &desired,
            &actual(),
            PasswordCheck::Unknown,
            WriteOnlyPolicy::OnCreate,
            &SCHEMA,
        );
        assert!(diff.is_empty());
        assert!(diff.changes.is_empty());
    }

    #[test]
    fn test_password_follows_check_and_policy() {
        let desired = UserSpec::present("alice").with_password("hunter2");
        let cases = [
            (PasswordCheck::Matches, WriteOnlyPolicy::Always, false),
            (PasswordCheck::Differs, WriteOnlyPolicy::OnCreate, true),
            (PasswordCheck::Unknown, WriteOnlyPolicy::OnCreate, false),
            (PasswordCheck::Unknown, WriteOnlyPolicy::Always, true),
        ];
        for (check, policy, expected) in cases {
            let diff = diff_fields(&desired, &actual(), check, policy, &SCHEMA);
            assert_eq!(diff.password.is_some(), expected, "{check:?} / {policy:?}");
        }
    }

    #[test]
    fn test_write_only_attributes() {
        let desired = UserSpec::present("alice")
            .with_attr("token", AttrValue::Secret(Secret::new("t0k")))
            .with_attr("no_default_feeds", AttrValue::Bool(true));

        let diff = diff_fields(
            &desired,
            &actual(),
            PasswordCheck::Unknown,
            WriteOnlyPolicy::OnCreate,
            &SCHEMA,
        );
        assert!(diff.is_empty());

        let diff = diff_fields(
            &desired,
            &actual(),
            PasswordCheck::Unknown,
            WriteOnlyPolicy::Always,
            &SCHEMA,
        );
        assert_eq!(diff.field_names(), vec!["token"]);
        assert_eq!(diff.changes[0].to, None);
    }

    #[test]
    fn test_email_change_reports_old_and_new() {
        let desired = UserSpec::present("alice").with_email("new@example.org");
        let diff = diff_fields(
            &desired,
            &actual(),
            PasswordCheck::Unknown,
            WriteOnlyPolicy::OnCreate,
            &SCHEMA,
        );
        assert_eq!(diff.email.as_deref(), Some("new@example.org"));
        assert_eq!(diff.changes[0].from.as_deref(), Some("alice@example.org"));
    }
}
