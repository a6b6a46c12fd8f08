//! Table and column names for the TT-RSS schema
//!
//! Defaults match a stock TT-RSS install. Installs with a table prefix or
//! renamed columns can override any of them from config.

use crate::error::{Error, Result};
use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;

static IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is valid")
});

/// Where accounts and their preferences live
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TableMapping {
    pub users_table: String,
    pub id: String,
    pub login: String,
    pub pwd_hash: String,
    pub salt: String,
    pub access_level: String,
    pub email: String,
    pub full_name: String,

    pub prefs_table: String,
    pub owner_uid: String,
    pub pref_name: String,
    pub profile: String,
    pub value: String,
}

impl Default for TableMapping {
    fn default() -> Self {
        Self {
            users_table: "ttrss_users".to_string(),
            id: "id".to_string(),
            login: "login".to_string(),
            pwd_hash: "pwd_hash".to_string(),
            salt: "salt".to_string(),
            access_level: "access_level".to_string(),
            email: "email".to_string(),
            full_name: "full_name".to_string(),
            prefs_table: "ttrss_user_prefs2".to_string(),
            owner_uid: "owner_uid".to_string(),
            pref_name: "pref_name".to_string(),
            profile: "profile".to_string(),
            value: "value".to_string(),
        }
    }
}

impl TableMapping {
    /// Reject any name that would need quoting to be spliced into SQL
    pub fn validate(&self) -> Result<()> {
        for name in self.identifiers() {
            if !IDENTIFIER.is_match(name) {
                return Err(Error::InvalidIdentifier(name.to_string()));
            }
        }
        Ok(())
    }

    fn identifiers(&self) -> [&str; 13] {
        [
            &self.users_table,
            &self.id,
            &self.login,
            &self.pwd_hash,
            &self.salt,
            &self.access_level,
            &self.email,
            &self.full_name,
            &self.prefs_table,
            &self.owner_uid,
            &self.pref_name,
            &self.profile,
            &self.value,
        ]
    }
}
