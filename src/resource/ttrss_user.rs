//! TT-RSS user backend
//!
//! Reads and writes `ttrss_users` (and the API access preference) in the
//! TT-RSS SQLite database. The database is opened for each call, never
//! created.

use declarative::{
    ActualUser, AttrKind, AttrSpec, AttrValue, Attributes, AttributeSchema, Error, FieldDiff,
    PasswordCheck, RecordId, RequiredField, Result, Secret, UserBackend, UserSpec,
};
use std::path::PathBuf;
use ttrsskit::{
    ACCESS_ADMIN, ACCESS_USER, ErrorCategory, NewUser, Store, TableMapping, UserChanges, UserRow,
    Verification,
};

const SCHEMA: AttributeSchema = AttributeSchema {
    attributes: &[
        AttrSpec::readable("access_level", AttrKind::Int).one_of(&[ACCESS_USER, ACCESS_ADMIN]),
        AttrSpec::readable("api_enabled", AttrKind::Bool),
        AttrSpec::readable("full_name", AttrKind::Text),
    ],
    required_on_create: &[RequiredField::Password],
};

/// Users of one TT-RSS database
#[derive(Debug, Clone)]
pub struct TtrssUsers {
    database: PathBuf,
    tables: TableMapping,
}

impl TtrssUsers {
    pub fn new(database: PathBuf, tables: TableMapping) -> Self {
        Self { database, tables }
    }

    fn open(&self) -> Result<Store> {
        Store::open(&self.database, self.tables.clone()).map_err(store_error)
    }
}

/// Map a store error onto the reconciliation taxonomy
fn store_error(error: ttrsskit::Error) -> Error {
    let message = error.to_string();
    match error.category() {
        ErrorCategory::Connection => Error::Connection(message),
        ErrorCategory::Conflict => Error::Conflict(message),
        ErrorCategory::Permission => Error::Permission(message),
        ErrorCategory::Config => Error::Validation(message),
        ErrorCategory::Other => Error::execution(message),
    }
}

fn row_id(id: &RecordId) -> Result<i64> {
    match id {
        RecordId::Row(id) => Ok(*id),
        RecordId::Name(name) => Err(Error::execution(format!(
            "TT-RSS users are addressed by row id, got name '{name}'"
        ))),
    }
}

fn to_actual(row: UserRow) -> ActualUser {
    let mut attributes = Attributes::new();
    attributes.insert("access_level".to_string(), AttrValue::Int(row.access_level));
    attributes.insert(
        "api_enabled".to_string(),
        AttrValue::Bool(row.api_enabled.unwrap_or(false)),
    );
    if let Some(full_name) = row.full_name {
        attributes.insert("full_name".to_string(), AttrValue::Text(full_name));
    }

    ActualUser {
        id: RecordId::Row(row.id),
        name: row.login,
        email: row.email,
        attributes,
        password_hash: Some(row.pwd_hash).filter(|h| !h.is_empty()),
    }
}

fn int_attr(attributes: &Attributes, name: &str) -> Option<i64> {
    attributes.get(name).and_then(AttrValue::as_int)
}

fn bool_attr(attributes: &Attributes, name: &str) -> Option<bool> {
    attributes.get(name).and_then(AttrValue::as_bool)
}

fn text_attr<'a>(attributes: &'a Attributes, name: &str) -> Option<&'a str> {
    attributes.get(name).and_then(AttrValue::as_text)
}

impl UserBackend for TtrssUsers {
    fn kind(&self) -> &'static str {
        "ttrss"
    }

    fn schema(&self) -> &AttributeSchema {
        &SCHEMA
    }

    fn fetch(&self, name: &str) -> Result<Option<ActualUser>> {
        let row = self.open()?.find_user(name).map_err(store_error)?;
        Ok(row.map(to_actual))
    }

    fn create(&self, spec: &UserSpec) -> Result<RecordId> {
        let password = spec
            .password
            .as_ref()
            .ok_or_else(|| Error::validation("missing required field: password"))?;

        let user = NewUser {
            login: &spec.name,
            password: password.expose(),
            access_level: int_attr(&spec.attributes, "access_level").unwrap_or(ACCESS_USER),
            email: spec.email.as_deref(),
            full_name: text_attr(&spec.attributes, "full_name"),
            api_enabled: bool_attr(&spec.attributes, "api_enabled").unwrap_or(false),
        };
        let id = self.open()?.insert_user(&user).map_err(store_error)?;
        Ok(RecordId::Row(id))
    }

    fn update(&self, id: &RecordId, diff: &FieldDiff) -> Result<()> {
        let id = row_id(id)?;
        let changes = UserChanges {
            password: diff.password.as_ref().map(Secret::expose),
            access_level: int_attr(&diff.attributes, "access_level"),
            email: diff.email.as_deref(),
            full_name: text_attr(&diff.attributes, "full_name"),
            api_enabled: bool_attr(&diff.attributes, "api_enabled"),
        };
        if changes.is_empty() {
            return Ok(());
        }
        self.open()?.update_user(id, &changes).map_err(store_error)
    }

    fn delete(&self, id: &RecordId) -> Result<()> {
        let id = row_id(id)?;
        self.open()?.delete_user(id).map_err(store_error)
    }

    fn password_matches(&self, actual: &ActualUser, password: &Secret) -> Result<PasswordCheck> {
        let store = self.open()?;
        let Some(row) = store.find_user(&actual.name).map_err(store_error)? else {
            return Ok(PasswordCheck::Differs);
        };

        Ok(match store.verify_password(&row, password.expose()) {
            Verification::Match => PasswordCheck::Matches,
            // Legacy schemes get rewritten with the current one
            Verification::Mismatch | Verification::UnsupportedScheme => PasswordCheck::Differs,
        })
    }
}
