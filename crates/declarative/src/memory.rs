//! In-memory backend for engine tests

use crate::backend::{Access, AttrKind, AttrSpec, AttributeSchema, RequiredField, UserBackend};
use crate::diff::FieldDiff;
use crate::error::{Error, Result};
use crate::types::{ActualUser, PasswordCheck, RecordId, Secret, UserSpec};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

const SCHEMA: AttributeSchema = AttributeSchema {
    attributes: &[
        AttrSpec::readable("access_level", AttrKind::Int).one_of(&[0, 10]),
        AttrSpec::readable("api_enabled", AttrKind::Bool),
        AttrSpec::readable("language", AttrKind::Text),
        AttrSpec::write_only("token", AttrKind::Secret),
    ],
    required_on_create: &[RequiredField::Password],
};

fn fake_hash(password: &Secret) -> String {
    format!("memory:{}", password.expose())
}

/// Records every call; optional one-shot failures for fetch and writes
#[derive(Debug, Default)]
pub struct MemoryBackend {
    users: RefCell<BTreeMap<String, ActualUser>>,
    calls: RefCell<Vec<String>>,
    next_id: Cell<i64>,
    fail_fetch: RefCell<Option<Error>>,
    fail_write: RefCell<Option<Error>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a user directly, without recording a call
    pub fn seed(&self, spec: UserSpec) {
        let id = self.allocate_id();
        self.users.borrow_mut().insert(spec.name.clone(), to_actual(id, &spec));
    }

    /// Make the next mutating call fail with `error`
    pub fn fail_next(&self, error: Error) {
        *self.fail_write.borrow_mut() = Some(error);
    }

    /// Make the next fetch fail with `error`
    pub fn fail_fetch(&self, error: Error) {
        *self.fail_fetch.borrow_mut() = Some(error);
    }

    pub fn get(&self, name: &str) -> Option<ActualUser> {
        self.users.borrow().get(name).cloned()
    }

    pub fn snapshot(&self) -> BTreeMap<String, ActualUser> {
        self.users.borrow().clone()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn allocate_id(&self) -> i64 {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        id
    }

    fn record(&self, call: String) -> Result<()> {
        self.calls.borrow_mut().push(call);
        match self.fail_write.borrow_mut().take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn name_for(&self, id: &RecordId) -> Result<String> {
        self.users
            .borrow()
            .values()
            .find(|u| &u.id == id)
            .map(|u| u.name.clone())
            .ok_or_else(|| Error::execution(format!("no record {id}")))
    }
}

fn to_actual(id: i64, spec: &UserSpec) -> ActualUser {
    let attributes = spec
        .attributes
        .iter()
        .filter(|(name, _)| {
            SCHEMA
                .get(name)
                .is_some_and(|a| a.access == Access::Readable)
        })
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    ActualUser {
        id: RecordId::Row(id),
        name: spec.name.clone(),
        email: spec.email.clone(),
        attributes,
        password_hash: spec.password.as_ref().map(fake_hash),
    }
}

impl UserBackend for MemoryBackend {
    fn kind(&self) -> &'static str {
        "memory"
    }

    fn schema(&self) -> &AttributeSchema {
        &SCHEMA
    }

    fn fetch(&self, name: &str) -> Result<Option<ActualUser>> {
        self.calls.borrow_mut().push(format!("fetch {name}"));
        if let Some(e) = self.fail_fetch.borrow_mut().take() {
            return Err(e);
        }
        Ok(self.get(name))
    }

    fn create(&self, spec: &UserSpec) -> Result<RecordId> {
        self.record(format!("create {}", spec.name))?;
        if self.users.borrow().contains_key(&spec.name) {
            return Err(Error::Conflict(format!("user {} already exists", spec.name)));
        }
        let id = self.allocate_id();
        self.users.borrow_mut().insert(spec.name.clone(), to_actual(id, spec));
        Ok(RecordId::Row(id))
    }

    fn update(&self, id: &RecordId, diff: &FieldDiff) -> Result<()> {
        let name = self.name_for(id)?;
        self.record(format!("update {name}"))?;
        let mut users = self.users.borrow_mut();
        let Some(user) = users.get_mut(&name) else {
            return Err(Error::execution(format!("no record {id}")));
        };
        if let Some(password) = &diff.password {
            user.password_hash = Some(fake_hash(password));
        }
        if let Some(email) = &diff.email {
            user.email = Some(email.clone());
        }
        for (k, v) in &diff.attributes {
            if SCHEMA
                .get(k)
                .is_some_and(|a| a.access == Access::Readable)
            {
                user.attributes.insert(k.clone(), v.clone());
            }
        }
        Ok(())
    }

    fn delete(&self, id: &RecordId) -> Result<()> {
        let name = self.name_for(id)?;
        self.record(format!("delete {name}"))?;
        self.users.borrow_mut().remove(&name);
        Ok(())
    }

    fn password_matches(&self, actual: &ActualUser, password: &Secret) -> Result<PasswordCheck> {
        Ok(match &actual.password_hash {
            Some(hash) if *hash == fake_hash(password) => PasswordCheck::Matches,
            _ => PasswordCheck::Differs,
        })
    }
}
