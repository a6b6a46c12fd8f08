//! Desired-state descriptor: raw caller input to a validated [`UserSpec`]

use crate::backend::{AttrKind, AttrSpec, AttributeSchema, RequiredField};
use crate::error::{Error, Result};
use crate::types::{AttrValue, Attributes, DesiredState, Secret, UserSpec};
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::LazyLock;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is valid")
});

/// Raw, unvalidated user input as the caller supplied it
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserInput {
    #[serde(default, alias = "username")]
    pub name: Option<String>,
    #[serde(default)]
    pub password: Option<Secret>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, Value>,
    #[serde(default)]
    pub state: DesiredState,
}

impl UserSpec {
    /// Validate raw input against a backend's attribute schema
    ///
    /// For `state=absent` everything but the name is dropped, even when
    /// supplied. Empty passwords and emails count as not supplied.
    pub fn from_input(input: &UserInput, schema: &AttributeSchema) -> Result<Self> {
        let name = validate_name(input.name.as_deref())?;

        if input.state.is_absent() {
            return Ok(Self::absent(name));
        }

        let password = input.password.clone().filter(|p| !p.is_empty());

        let email = match input.email.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(email) if EMAIL_RE.is_match(email) => Some(email.to_string()),
            Some(email) => {
                return Err(Error::validation(format!("invalid email address: {email}")));
            }
        };

        let mut attributes = Attributes::new();
        for (key, raw) in &input.attributes {
            let spec = schema.get(key).ok_or_else(|| {
                Error::validation(format!(
                    "unknown attribute '{key}' (expected one of: {})",
                    schema.names().join(", ")
                ))
            })?;
            if let Some(value) = convert_attr(spec, raw)? {
                attributes.insert(key.clone(), value);
            }
        }

        Ok(Self {
            name,
            password,
            email,
            attributes,
            state: DesiredState::Present,
        })
    }
}

/// Check that a spec carries what the backend needs to create a user
///
/// Only meaningful once the record is known not to exist.
pub fn ensure_creatable(spec: &UserSpec, schema: &AttributeSchema) -> Result<()> {
    for field in schema.required_on_create {
        let supplied = match field {
            RequiredField::Password => spec.password.is_some(),
            RequiredField::Email => spec.email.is_some(),
        };
        if !supplied {
            return Err(Error::validation(format!(
                "missing required field: {}",
                field.name()
            )));
        }
    }
    Ok(())
}

fn validate_name(name: Option<&str>) -> Result<String> {
    let name = name.unwrap_or_default();
    if name.trim().is_empty() {
        return Err(Error::validation("missing required field: name"));
    }
    if name.trim() != name {
        return Err(Error::validation(format!(
            "name must not have leading or trailing whitespace: '{name}'"
        )));
    }
    Ok(name.to_string())
}

/// Convert one raw value to the attribute's declared type
///
/// `null` means "not specified". Strings are accepted for integers and
/// booleans, since command lines and templates only produce strings.
fn convert_attr(spec: &AttrSpec, raw: &Value) -> Result<Option<AttrValue>> {
    let invalid = || {
        Error::validation(format!(
            "attribute '{}' expects {}, got {raw}",
            spec.name,
            kind_name(spec.kind)
        ))
    };

    let value = match (spec.kind, raw) {
        (_, Value::Null) => return Ok(None),
        // Stores read blank text back as unset
        (AttrKind::Text | AttrKind::Secret, Value::String(s)) if s.trim().is_empty() => {
            return Ok(None);
        }
        (AttrKind::Text, Value::String(s)) => AttrValue::Text(s.clone()),
        (AttrKind::Text, Value::Number(n)) => AttrValue::Text(n.to_string()),
        (AttrKind::Secret, Value::String(s)) => AttrValue::Secret(Secret::new(s.as_str())),
        (AttrKind::Int, Value::Number(n)) => AttrValue::Int(n.as_i64().ok_or_else(invalid)?),
        (AttrKind::Int, Value::String(s)) => {
            AttrValue::Int(s.trim().parse().map_err(|_| invalid())?)
        }
        (AttrKind::Bool, Value::Bool(b)) => AttrValue::Bool(*b),
        (AttrKind::Bool, Value::String(s)) => AttrValue::Bool(parse_bool(s).ok_or_else(invalid)?),
        (AttrKind::Bool, Value::Number(n)) => match n.as_i64() {
            Some(0) => AttrValue::Bool(false),
            Some(1) => AttrValue::Bool(true),
            _ => return Err(invalid()),
        },
        _ => return Err(invalid()),
    };

    if let AttrValue::Int(v) = value
        && !spec.allowed.is_empty()
        && !spec.allowed.contains(&v)
    {
        let allowed: Vec<String> = spec.allowed.iter().map(ToString::to_string).collect();
        return Err(Error::validation(format!(
            "attribute '{}' must be one of {}, got {v}",
            spec.name,
            allowed.join(", ")
        )));
    }

    Ok(Some(value))
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

fn kind_name(kind: AttrKind) -> &'static str {
    match kind {
        AttrKind::Text | AttrKind::Secret => "a string",
        AttrKind::Int => "an integer",
        AttrKind::Bool => "a boolean",
    }
}
