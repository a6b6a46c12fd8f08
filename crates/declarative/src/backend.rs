//! Backend adapter trait for user stores
//!
//! A backend is the only way the engine reads or writes a hosted
//! application's user records. Each backend also publishes an
//! [`AttributeSchema`] so input can be validated before any call.

use crate::error::Result;
use crate::types::{ActualUser, PasswordCheck, RecordId, Secret, UserSpec};
use crate::diff::FieldDiff;

/// Value type of a backend attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrKind {
    Text,
    Int,
    Bool,
    /// Text that must never be printed
    Secret,
}

/// Whether the backend can report an attribute back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Reported by `fetch`, compared on every run
    Readable,
    /// Accepted on create and update, never reported back
    WriteOnly,
    /// Accepted on create only
    CreateOnly,
}

/// Declaration of one attribute a backend understands
#[derive(Debug, Clone, Copy)]
pub struct AttrSpec {
    pub name: &'static str,
    pub kind: AttrKind,
    pub access: Access,
    /// Allowed integer values; empty means unrestricted
    pub allowed: &'static [i64],
}

impl AttrSpec {
    pub const fn readable(name: &'static str, kind: AttrKind) -> Self {
        Self {
            name,
            kind,
            access: Access::Readable,
            allowed: &[],
        }
    }

    pub const fn write_only(name: &'static str, kind: AttrKind) -> Self {
        Self {
            name,
            kind,
            access: Access::WriteOnly,
            allowed: &[],
        }
    }

    pub const fn create_only(name: &'static str, kind: AttrKind) -> Self {
        Self {
            name,
            kind,
            access: Access::CreateOnly,
            allowed: &[],
        }
    }

    pub const fn one_of(mut self, allowed: &'static [i64]) -> Self {
        self.allowed = allowed;
        self
    }
}

/// Fields that must be supplied when a user is first created
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredField {
    Password,
    Email,
}

impl RequiredField {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Password => "password",
            Self::Email => "email",
        }
    }
}

/// Everything the engine needs to know about a backend's attributes
#[derive(Debug, Clone, Copy)]
pub struct AttributeSchema {
    pub attributes: &'static [AttrSpec],
    pub required_on_create: &'static [RequiredField],
}

impl AttributeSchema {
    /// Look up an attribute by name
    pub fn get(&self, name: &str) -> Option<&AttrSpec> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Names of all known attributes, for error messages
    pub fn names(&self) -> Vec<&'static str> {
        self.attributes.iter().map(|a| a.name).collect()
    }
}

/// Core trait for user stores
///
/// Implementations must not cache state between calls: every `fetch`
/// reads live state. No call is retried here; the engine calls each
/// mutating method at most once per invocation.
pub trait UserBackend {
    /// Short backend name used in logs ("ttrss", "freshrss")
    fn kind(&self) -> &'static str;

    /// Attributes this backend understands
    fn schema(&self) -> &AttributeSchema;

    /// Reject names the backend could never store
    fn validate_name(&self, _name: &str) -> Result<()> {
        Ok(())
    }

    /// Current record for `name`, or `None` if there is none
    fn fetch(&self, name: &str) -> Result<Option<ActualUser>>;

    /// Create a record from a present spec
    fn create(&self, spec: &UserSpec) -> Result<RecordId>;

    /// Apply exactly the fields in `diff` to an existing record
    fn update(&self, id: &RecordId, diff: &FieldDiff) -> Result<()>;

    /// Remove an existing record
    fn delete(&self, id: &RecordId) -> Result<()>;

    /// Check a supplied password against the stored one
    ///
    /// Backends that cannot verify return [`PasswordCheck::Unknown`].
    fn password_matches(&self, _actual: &ActualUser, _password: &Secret) -> Result<PasswordCheck> {
        Ok(PasswordCheck::Unknown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: AttributeSchema = AttributeSchema {
        attributes: &[
            AttrSpec::readable("access_level", AttrKind::Int).one_of(&[0, 10]),
            AttrSpec::write_only("token", AttrKind::Secret),
        ],
        required_on_create: &[RequiredField::Password],
    };

    #[test]
    fn test_schema_lookup() {
        let level = SCHEMA.get("access_level").unwrap();
        assert_eq!(level.kind, AttrKind::Int);
        assert_eq!(level.allowed, &[0, 10]);
        assert_eq!(SCHEMA.get("token").unwrap().access, Access::WriteOnly);
        assert!(SCHEMA.get("language").is_none());
        assert_eq!(SCHEMA.names(), vec!["access_level", "token"]);
    }
}
