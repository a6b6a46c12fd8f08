//! # TT-RSS Kit
//!
//! Direct access to Tiny Tiny RSS user accounts in its SQLite database.
//!
//! This crate provides functionality to:
//! - Look up an account by login, case-insensitively, with its API access flag
//! - Create, update and delete accounts the way TT-RSS itself stores them
//! - Hash and verify passwords with TT-RSS's salted SHA schemes
//!
//! ## Example
//!
//! ```no_run
//! use ttrsskit::{NewUser, Store, TableMapping};
//! use std::path::Path;
//!
//! let store = Store::open(Path::new("/var/db/tt-rss/ttrss.db"), TableMapping::default())?;
//!
//! if store.find_user("alice")?.is_none() {
//!     let id = store.insert_user(&NewUser::new("alice", "hunter2"))?;
//!     println!("created user #{id}");
//! }
//! # Ok::<(), ttrsskit::Error>(())
//! ```

mod error;
mod mapping;
pub mod password;
mod types;

pub use error::{Error, ErrorCategory, Result};
pub use mapping::TableMapping;
pub use password::{HashAlgo, Verification};
pub use types::{ACCESS_ADMIN, ACCESS_USER, API_ACCESS_PREF, NewUser, UserChanges, UserRow};

use rusqlite::types::Value;
use rusqlite::{Connection, OpenFlags, OptionalExtension, params, params_from_iter};
use std::path::Path;
use std::time::Duration;

/// How long a statement waits on a locked database before failing
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// An open TT-RSS database
pub struct Store {
    conn: Connection,
    tables: TableMapping,
}

impl Store {
    /// Open an existing TT-RSS database
    ///
    /// Never creates the file: a missing database is an error, not an
    /// empty account list.
    pub fn open(db_path: &Path, tables: TableMapping) -> Result<Self> {
        Self::open_with(
            db_path,
            tables,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
    }

    /// Create a database with the account tables, for fresh installs and tests
    pub fn create(db_path: &Path, tables: TableMapping) -> Result<Self> {
        let store = Self::open_with(db_path, tables, OpenFlags::default())?;
        store.create_tables()?;
        Ok(store)
    }

    fn open_with(db_path: &Path, tables: TableMapping, flags: OpenFlags) -> Result<Self> {
        tables.validate()?;

        let conn = Connection::open_with_flags(db_path, flags).map_err(|source| Error::Open {
            path: db_path.to_path_buf(),
            source,
        })?;
        conn.busy_timeout(BUSY_TIMEOUT)?;

        Ok(Self { conn, tables })
    }

    /// Table mapping in use
    pub fn tables(&self) -> &TableMapping {
        &self.tables
    }

    /// Create the users and preference tables if they don't exist
    pub fn create_tables(&self) -> Result<()> {
        let t = &self.tables;
        self.conn.execute_batch(&format!(
            "
            CREATE TABLE IF NOT EXISTS {users} (
                {id} INTEGER PRIMARY KEY,
                {login} TEXT NOT NULL UNIQUE,
                {pwd_hash} TEXT NOT NULL,
                {salt} TEXT NOT NULL DEFAULT '',
                {access_level} INTEGER NOT NULL DEFAULT 0,
                {email} TEXT NOT NULL DEFAULT '',
                {full_name} TEXT NOT NULL DEFAULT ''
            );

            CREATE TABLE IF NOT EXISTS {prefs} (
                {owner_uid} INTEGER NOT NULL REFERENCES {users}({id}) ON DELETE CASCADE,
                {pref_name} TEXT NOT NULL,
                {profile} INTEGER,
                {value} TEXT NOT NULL
            );
            ",
            users = t.users_table,
            id = t.id,
            login = t.login,
            pwd_hash = t.pwd_hash,
            salt = t.salt,
            access_level = t.access_level,
            email = t.email,
            full_name = t.full_name,
            prefs = t.prefs_table,
            owner_uid = t.owner_uid,
            pref_name = t.pref_name,
            profile = t.profile,
            value = t.value,
        ))?;
        Ok(())
    }

    /// Find an account by login, ignoring case
    pub fn find_user(&self, login: &str) -> Result<Option<UserRow>> {
        let t = &self.tables;
        let sql = format!(
            "SELECT u.{id}, u.{login}, u.{pwd_hash}, u.{salt}, u.{access_level}, u.{email}, u.{full_name},
                    (SELECT p.{value} FROM {prefs} p
                      WHERE p.{owner_uid} = u.{id} AND p.{pref_name} = ?2 AND p.{profile} IS NULL
                      LIMIT 1)
             FROM {users} u
             WHERE LOWER(u.{login}) = LOWER(?1)
             ORDER BY u.{id}
             LIMIT 1",
            id = t.id,
            login = t.login,
            pwd_hash = t.pwd_hash,
            salt = t.salt,
            access_level = t.access_level,
            email = t.email,
            full_name = t.full_name,
            value = t.value,
            prefs = t.prefs_table,
            owner_uid = t.owner_uid,
            pref_name = t.pref_name,
            profile = t.profile,
            users = t.users_table,
        );

        let row = self
            .conn
            .query_row(&sql, params![login, API_ACCESS_PREF], |row| {
                let api: Option<String> = row.get(7)?;
                Ok(UserRow {
                    id: row.get(0)?,
                    login: row.get(1)?,
                    pwd_hash: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                    salt: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                    access_level: row.get::<_, Option<i64>>(4)?.unwrap_or(ACCESS_USER),
                    email: non_empty(row.get(5)?),
                    full_name: non_empty(row.get(6)?),
                    api_enabled: api.as_deref().map(parse_pref_bool),
                })
            })
            .optional()?;
        Ok(row)
    }

    /// Insert a new account and return its id
    pub fn insert_user(&self, user: &NewUser<'_>) -> Result<i64> {
        let t = &self.tables;
        let salt = password::generate_salt();
        let pwd_hash = password::hash_password(user.password, &salt, HashAlgo::Ssha512);

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            &format!(
                "INSERT INTO {users} ({login}, {pwd_hash}, {salt}, {access_level}, {email}, {full_name})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                users = t.users_table,
                login = t.login,
                pwd_hash = t.pwd_hash,
                salt = t.salt,
                access_level = t.access_level,
                email = t.email,
                full_name = t.full_name,
            ),
            params![
                user.login,
                pwd_hash,
                salt,
                user.access_level,
                user.email.unwrap_or(""),
                user.full_name.unwrap_or(""),
            ],
        )?;
        let id = tx.last_insert_rowid();
        write_api_access(&tx, t, id, user.api_enabled)?;
        tx.commit()?;

        Ok(id)
    }

    /// Write the given columns of an existing account
    ///
    /// A new password gets a new salt. Columns left `None` are untouched.
    pub fn update_user(&self, id: i64, changes: &UserChanges<'_>) -> Result<()> {
        let t = &self.tables;
        let mut columns: Vec<&str> = Vec::new();
        let mut values: Vec<Value> = Vec::new();

        if let Some(password) = changes.password {
            let salt = password::generate_salt();
            let pwd_hash = password::hash_password(password, &salt, HashAlgo::Ssha512);
            columns.push(&t.pwd_hash);
            values.push(Value::Text(pwd_hash));
            columns.push(&t.salt);
            values.push(Value::Text(salt));
        }
        if let Some(level) = changes.access_level {
            columns.push(&t.access_level);
            values.push(Value::Integer(level));
        }
        if let Some(email) = changes.email {
            columns.push(&t.email);
            values.push(Value::Text(email.to_string()));
        }
        if let Some(full_name) = changes.full_name {
            columns.push(&t.full_name);
            values.push(Value::Text(full_name.to_string()));
        }

        let tx = self.conn.unchecked_transaction()?;

        let affected = if columns.is_empty() {
            tx.query_row(
                &format!("SELECT COUNT(*) FROM {} WHERE {} = ?1", t.users_table, t.id),
                [id],
                |row| row.get::<_, i64>(0),
            )?
        } else {
            let assignments: Vec<String> = columns
                .iter()
                .enumerate()
                .map(|(i, column)| format!("{column} = ?{}", i + 1))
                .collect();
            values.push(Value::Integer(id));
            let sql = format!(
                "UPDATE {} SET {} WHERE {} = ?{}",
                t.users_table,
                assignments.join(", "),
                t.id,
                values.len()
            );
            tx.execute(&sql, params_from_iter(values.iter()))? as i64
        };
        if affected == 0 {
            return Err(Error::MissingRow(id));
        }

        if let Some(enabled) = changes.api_enabled {
            write_api_access(&tx, t, id, enabled)?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Delete an account and its preferences
    pub fn delete_user(&self, id: i64) -> Result<()> {
        let t = &self.tables;
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            &format!("DELETE FROM {} WHERE {} = ?1", t.prefs_table, t.owner_uid),
            [id],
        )?;
        let affected = tx.execute(
            &format!("DELETE FROM {} WHERE {} = ?1", t.users_table, t.id),
            [id],
        )?;
        if affected == 0 {
            return Err(Error::MissingRow(id));
        }
        tx.commit()?;
        Ok(())
    }

    /// Check a plaintext password against an account's stored hash
    pub fn verify_password(&self, user: &UserRow, password: &str) -> Verification {
        password::verify_password(password, &user.salt, &user.pwd_hash)
    }
}

/// Set the API access preference in the default profile
fn write_api_access(conn: &Connection, t: &TableMapping, id: i64, enabled: bool) -> Result<()> {
    let value = if enabled { "true" } else { "false" };
    let updated = conn.execute(
        &format!(
            "UPDATE {prefs} SET {value} = ?1
             WHERE {owner_uid} = ?2 AND {pref_name} = ?3 AND {profile} IS NULL",
            prefs = t.prefs_table,
            value = t.value,
            owner_uid = t.owner_uid,
            pref_name = t.pref_name,
            profile = t.profile,
        ),
        params![value, id, API_ACCESS_PREF],
    )?;
    if updated == 0 {
        conn.execute(
            &format!(
                "INSERT INTO {prefs} ({owner_uid}, {pref_name}, {profile}, {value})
                 VALUES (?1, ?2, NULL, ?3)",
                prefs = t.prefs_table,
                owner_uid = t.owner_uid,
                pref_name = t.pref_name,
                profile = t.profile,
                value = t.value,
            ),
            params![id, API_ACCESS_PREF, value],
        )?;
    }
    Ok(())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn parse_pref_bool(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "true" | "1")
}

// ============================================================================
// Tests
// ============================================================================
