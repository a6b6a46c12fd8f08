//! Module-style invocation: one JSON object in, one JSON result out
//!
//! ```json
//! {
//!   "backend": "freshrss",
//!   "username": "alice",
//!   "password": "hunter2",
//!   "language": "fr",
//!   "check_mode": true,
//!   "become_user": "www"
//! }
//! ```
//!
//! Attributes may be nested under `attributes` or given at top level;
//! connection settings may be nested under `connection` or given at top
//! level. Nested values win.

use crate::config::ConnectionOverrides;
use crate::resource::BackendKind;
use declarative::{DesiredState, ReconcileContext, Secret, UserInput, WriteOnlyPolicy};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Top-level keys that are connection settings, not user attributes
const CONNECTION_KEYS: &[&str] = &["database", "db", "php_binary", "freshrss_path", "become_user"];

#[derive(Debug, Clone, Deserialize)]
pub struct ModuleArgs {
    pub backend: BackendKind,
    #[serde(default, alias = "username")]
    pub name: Option<String>,
    #[serde(default)]
    pub password: Option<Secret>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub state: DesiredState,
    #[serde(default)]
    pub attributes: BTreeMap<String, Value>,
    #[serde(default)]
    pub check_mode: bool,
    #[serde(default)]
    pub update_password: WriteOnlyPolicy,
    #[serde(default)]
    pub connection: ConnectionOverrides,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl ModuleArgs {
    pub fn from_json(content: &str) -> serde_json::Result<Self> {
        serde_json::from_str(content)
    }

    /// Split into the desired-state input and the connection overrides
    pub fn into_parts(self) -> (UserInput, ConnectionOverrides) {
        let mut attributes = self.attributes;
        let mut connection = self.connection;

        for (key, value) in self.extra {
            if CONNECTION_KEYS.contains(&key.as_str()) {
                let text = match value {
                    Value::String(s) => Some(s),
                    Value::Null => None,
                    other => Some(other.to_string()),
                };
                let slot = match key.as_str() {
                    "database" | "db" => &mut connection.database,
                    "php_binary" => &mut connection.php_binary,
                    "freshrss_path" => &mut connection.freshrss_path,
                    _ => &mut connection.become_user,
                };
                if slot.is_none() {
                    *slot = text;
                }
            } else {
                attributes.entry(key).or_insert(value);
            }
        }

        let input = UserInput {
            name: self.name,
            password: self.password,
            email: self.email,
            attributes,
            state: self.state,
        };
        (input, connection)
    }

    pub fn context(&self) -> ReconcileContext {
        ReconcileContext::new()
            .with_check_mode(self.check_mode)
            .with_update_password(self.update_password)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_level_attributes_and_connection() {
        let args = ModuleArgs::from_json(
            r#"{
                "backend": "freshrss",
                "username": "alice",
                "password": "pw",
                "language": "fr",
                "no_default_feeds": true,
                "become_user": "www",
                "check_mode": true,
                "update_password": "always"
            }"#,
        )
        .unwrap();
        assert_eq!(args.backend, BackendKind::Freshrss);
        let ctx = args.context();
        assert!(ctx.check_mode);

        let (input, connection) = args.into_parts();
        assert_eq!(input.name.as_deref(), Some("alice"));
        assert_eq!(input.attributes["language"], "fr");
        assert_eq!(input.attributes["no_default_feeds"], true);
        assert!(!input.attributes.contains_key("become_user"));
        assert_eq!(connection.become_user.as_deref(), Some("www"));
    }

    #[test]
    fn test_nested_values_win() {
        let args = ModuleArgs::from_json(
            r#"{
                "backend": "ttrss",
                "name": "bob",
                "access_level": 0,
                "attributes": {"access_level": 10},
                "db": "/tmp/top.db",
                "connection": {"database": "/tmp/nested.db"}
            }"#,
        )
        .unwrap();

        let (input, connection) = args.into_parts();
        assert_eq!(input.attributes["access_level"], 10);
        assert_eq!(connection.database.as_deref(), Some("/tmp/nested.db"));
        assert_eq!(input.state, DesiredState::Present);
    }

    #[test]
    fn test_backend_is_required() {
        assert!(ModuleArgs::from_json(r#"{"name": "bob"}"#).is_err());
        assert!(ModuleArgs::from_json(r#"{"backend": "nextcloud", "name": "bob"}"#).is_err());
    }
}
