//! Data types for the TT-RSS account store

/// Access level of an ordinary user
pub const ACCESS_USER: i64 = 0;

/// Access level of an administrator
pub const ACCESS_ADMIN: i64 = 10;

/// Preference key controlling API access
pub const API_ACCESS_PREF: &str = "ENABLE_API_ACCESS";

/// One row of the users table, with the API access preference joined in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRow {
    pub id: i64,
    pub login: String,
    pub pwd_hash: String,
    pub salt: String,
    pub access_level: i64,
    /// `None` when the column is NULL or empty
    pub email: Option<String>,
    /// `None` when the column is NULL or empty
    pub full_name: Option<String>,
    /// `None` when no preference row exists (TT-RSS then treats it as off)
    pub api_enabled: Option<bool>,
}

/// Columns for a new account
///
/// The password arrives in plaintext; the store salts and hashes it.
#[derive(Debug, Clone)]
pub struct NewUser<'a> {
    pub login: &'a str,
    pub password: &'a str,
    pub access_level: i64,
    pub email: Option<&'a str>,
    pub full_name: Option<&'a str>,
    pub api_enabled: bool,
}

impl<'a> NewUser<'a> {
    /// An ordinary user with API access off
    pub fn new(login: &'a str, password: &'a str) -> Self {
        Self {
            login,
            password,
            access_level: ACCESS_USER,
            email: None,
            full_name: None,
            api_enabled: false,
        }
    }
}

/// Columns to change on an existing account; `None` leaves a column alone
#[derive(Debug, Clone, Default)]
pub struct UserChanges<'a> {
    pub password: Option<&'a str>,
    pub access_level: Option<i64>,
    pub email: Option<&'a str>,
    pub full_name: Option<&'a str>,
    pub api_enabled: Option<bool>,
}

impl UserChanges<'_> {
    /// Check if nothing would be written
    pub fn is_empty(&self) -> bool {
        self.password.is_none()
            && self.access_level.is_none()
            && self.email.is_none()
            && self.full_name.is_none()
            && self.api_enabled.is_none()
    }
}
