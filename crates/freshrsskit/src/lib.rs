//! # freshrsskit
//!
//! User management for FreshRSS through its PHP command-line scripts.
//!
//! FreshRSS has no stable database layout to write to, so every
//! operation runs one of the `cli/*.php` scripts shipped with it:
//! - `user-info.php --json` to read all users
//! - `create-user.php`, `update-user.php` and `delete-user.php` to change them
//!
//! ## Example
//!
//! ```no_run
//! use freshrsskit::{CliConfig, Client, UserOptions};
//!
//! let client = Client::new(CliConfig::default());
//!
//! if client.find_user("alice")?.is_none() {
//!     let options = UserOptions {
//!         password: Some("hunter2".into()),
//!         language: Some("en".into()),
//!         ..UserOptions::default()
//!     };
//!     client.create_user("alice", &options)?;
//! }
//! # Ok::<(), freshrsskit::Error>(())
//! ```

pub mod error;
pub mod runner;
pub mod types;

pub use error::{Error, ErrorCategory, Result};
pub use runner::{CommandOutput, CommandRunner, SystemRunner};
pub use types::{
    CliConfig, DEFAULT_FRESHRSS_PATH, DEFAULT_PHP_BINARY, Scripts, UserInfo, UserOptions,
};

use regex::Regex;
use std::sync::LazyLock;

/// Usernames FreshRSS accepts
static USERNAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9a-zA-Z_][0-9a-zA-Z_.@-]{1,38}|[0-9a-zA-Z])$")
        .expect("username pattern is valid")
});

/// Check if `name` is a username FreshRSS would accept
pub fn is_valid_username(name: &str) -> bool {
    USERNAME.is_match(name)
}

/// Client for a FreshRSS installation.
pub struct Client {
    config: CliConfig,
    runner: Box<dyn CommandRunner>,
}

impl Client {
    /// Create a client that runs real processes.
    pub fn new(config: CliConfig) -> Self {
        Self::with_runner(config, Box::new(SystemRunner))
    }

    /// Create a client with a custom runner (useful for testing).
    pub fn with_runner(config: CliConfig, runner: Box<dyn CommandRunner>) -> Self {
        Self { config, runner }
    }

    /// Installation this client talks to
    pub fn config(&self) -> &CliConfig {
        &self.config
    }

    /// Read every user
    ///
    /// Anything but a JSON array of user objects is an error: an empty or
    /// garbled listing must never be mistaken for "no users".
    pub fn list_users(&self) -> Result<Vec<UserInfo>> {
        let script = &self.config.scripts.list;
        let output = self.run_script(script, vec!["--json".to_string()])?;

        let value: serde_json::Value = serde_json::from_str(output.stdout.trim())?;
        if !value.is_array() {
            return Err(Error::Parse {
                script: script.clone(),
                message: "expected a JSON array of users".to_string(),
            });
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Find one user by exact name
    pub fn find_user(&self, name: &str) -> Result<Option<UserInfo>> {
        Ok(self.list_users()?.into_iter().find(|u| u.user == name))
    }

    /// Create a user
    pub fn create_user(&self, name: &str, options: &UserOptions) -> Result<()> {
        let mut args = user_arg(name);
        args.extend(options.to_args(true));
        self.run_script(&self.config.scripts.create, args)?;
        Ok(())
    }

    /// Change the given options of an existing user
    pub fn update_user(&self, name: &str, options: &UserOptions) -> Result<()> {
        let mut args = user_arg(name);
        args.extend(options.to_args(false));
        self.run_script(&self.config.scripts.update, args)?;
        Ok(())
    }

    /// Delete a user and all of its data
    pub fn delete_user(&self, name: &str) -> Result<()> {
        self.run_script(&self.config.scripts.delete, user_arg(name))?;
        Ok(())
    }

    /// Program and arguments for one script, wrapped in sudo if configured
    fn command_line(&self, script: &str, args: Vec<String>) -> (String, Vec<String>) {
        let script_path = self.config.path.join("cli").join(script);
        let php = self.config.php_binary.to_string_lossy().to_string();

        let mut full = Vec::with_capacity(args.len() + 4);
        let program = match &self.config.become_user {
            Some(user) => {
                full.extend(["-u".to_string(), user.clone(), php]);
                "sudo".to_string()
            }
            None => php,
        };
        full.push(script_path.to_string_lossy().to_string());
        full.extend(args);
        (program, full)
    }

    /// Run a script; only exit status 0 is success
    fn run_script(&self, script: &str, args: Vec<String>) -> Result<CommandOutput> {
        let (program, args) = self.command_line(script, args);
        // Arguments carry passwords: log the script only
        log::debug!("running {script} in {}", self.config.path.display());

        let output = self
            .runner
            .run(&program, &args, &self.config.path)
            .map_err(|source| Error::Spawn {
                program: program.clone(),
                source,
            })?;

        if !output.success() {
            log::debug!("{script} failed with {:?}", output.code);
            return Err(Error::CommandFailed {
                script: script.to_string(),
                code: output.code,
                stderr: output.stderr,
            });
        }
        Ok(output)
    }
}

fn user_arg(name: &str) -> Vec<String> {
    vec!["--user".to_string(), name.to_string()]
}

// ============================================================================
// Tests
// ============================================================================
