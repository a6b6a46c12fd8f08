//! Core types for user reconciliation

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A plaintext secret supplied by the caller.
///
/// Never printed: `Debug` and `Display` both redact the value.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    /// Wrap a plaintext value
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the plaintext, for handing to a backend only
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Check if the secret is the empty string
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(********)")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("********")
    }
}

/// Whether the user should exist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DesiredState {
    /// User exists with the declared attributes
    #[default]
    Present,
    /// User does not exist
    Absent,
}

impl DesiredState {
    /// Check if state represents presence
    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present)
    }

    /// Check if state represents absence
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

impl fmt::Display for DesiredState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Present => f.write_str("present"),
            Self::Absent => f.write_str("absent"),
        }
    }
}

/// A typed backend attribute value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    Text(String),
    Int(i64),
    Bool(bool),
    /// Write-only text that must never be printed
    Secret(Secret),
}

impl AttrValue {
    /// Integer payload, if this is an integer
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Boolean payload, if this is a boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Text payload (plain or secret), if this is text
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            Self::Secret(s) => Some(s.expose()),
            _ => None,
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(v) => f.write_str(v),
            Self::Int(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Secret(s) => write!(f, "{s}"),
        }
    }
}

/// Backend-specific attributes, keyed by attribute name
pub type Attributes = BTreeMap<String, AttrValue>;

/// Validated desired state of one user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSpec {
    pub name: String,
    pub password: Option<Secret>,
    pub email: Option<String>,
    pub attributes: Attributes,
    pub state: DesiredState,
}

impl UserSpec {
    /// A spec that only asks for the user to be gone
    pub fn absent(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            password: None,
            email: None,
            attributes: Attributes::new(),
            state: DesiredState::Absent,
        }
    }

    /// A spec for a present user with no optional fields set
    pub fn present(name: impl Into<String>) -> Self {
        Self {
            state: DesiredState::Present,
            ..Self::absent(name)
        }
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(Secret::new(password));
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: AttrValue) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }
}

/// How a backend addresses an existing record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum RecordId {
    /// Database row id
    Row(i64),
    /// Backends addressed by user name only
    Name(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Row(id) => write!(f, "#{id}"),
            Self::Name(name) => f.write_str(name),
        }
    }
}

/// The backend's live view of an existing user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActualUser {
    pub id: RecordId,
    pub name: String,
    pub email: Option<String>,
    /// Readable attributes only; write-only ones are never reported back
    pub attributes: Attributes,
    /// Opaque stored hash, if the backend exposes one
    pub password_hash: Option<String>,
}

/// Result of checking a supplied password against the stored one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordCheck {
    Matches,
    Differs,
    /// Backend cannot verify passwords
    Unknown,
}

/// When to write fields the backend cannot read back (passwords, tokens)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteOnlyPolicy {
    /// Only when creating, or when the backend proves the value differs
    #[default]
    OnCreate,
    /// On every run where a value is supplied and not proven equal
    Always,
}

/// Result of applying a plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyResult {
    /// No changes needed
    NoChange,
    /// User was created
    Created,
    /// User was modified
    Modified { fields: Vec<String> },
    /// User was removed
    Removed,
}

impl ApplyResult {
    /// Check if the result represents a change
    pub fn is_change(&self) -> bool {
        !matches!(self, Self::NoChange)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_is_redacted() {
        let secret = Secret::new("hunter2");
        assert!(!format!("{secret:?}").contains("hunter2"));
        assert!(!format!("{secret}").contains("hunter2"));
        assert_eq!(secret.expose(), "hunter2");

        let spec = UserSpec::present("alice").with_password("hunter2");
        assert!(!format!("{spec:?}").contains("hunter2"));
    }

    #[test]
    fn test_desired_state_default_is_present() {
        assert_eq!(DesiredState::default(), DesiredState::Present);
        let state: DesiredState = serde_json::from_str("\"absent\"").unwrap();
        assert!(state.is_absent());
    }

    #[test]
    fn test_write_only_policy_names() {
        let policy: WriteOnlyPolicy = serde_json::from_str("\"on_create\"").unwrap();
        assert_eq!(policy, WriteOnlyPolicy::OnCreate);
        let policy: WriteOnlyPolicy = serde_json::from_str("\"always\"").unwrap();
        assert_eq!(policy, WriteOnlyPolicy::Always);
    }

    #[test]
    fn test_secret_attr_display_is_redacted() {
        let value = AttrValue::Secret(Secret::new("token"));
        assert_eq!(value.to_string(), "********");
        assert_eq!(value.as_text(), Some("token"));
    }
}
