use crate::config::ConnectionOverrides;
use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use declarative::{DesiredState, Secret, UserInput, WriteOnlyPolicy};
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "hostusers")]
#[command(version)]
#[command(about = "Idempotent user accounts for TT-RSS and FreshRSS", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Print the result as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Config file [default: ~/.config/hostusers/config.toml]
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Reconcile a Tiny Tiny RSS user
    Ttrss(TtrssArgs),

    /// Reconcile a FreshRSS user
    Freshrss(FreshrssArgs),

    /// Reconcile from a JSON args file (module-style)
    Run {
        /// Args file, or - for stdin
        #[arg(value_name = "ARGS.json")]
        args_file: PathBuf,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

// ============================================================================
// Shared user arguments
// ============================================================================

#[derive(Clone, Copy, Default, ValueEnum)]
pub enum StateArg {
    #[default]
    Present,
    Absent,
}

impl From<StateArg> for DesiredState {
    fn from(state: StateArg) -> Self {
        match state {
            StateArg::Present => Self::Present,
            StateArg::Absent => Self::Absent,
        }
    }
}

#[derive(Clone, Copy, Default, ValueEnum)]
pub enum UpdatePasswordArg {
    #[default]
    OnCreate,
    Always,
}

impl From<UpdatePasswordArg> for WriteOnlyPolicy {
    fn from(policy: UpdatePasswordArg) -> Self {
        match policy {
            UpdatePasswordArg::OnCreate => Self::OnCreate,
            UpdatePasswordArg::Always => Self::Always,
        }
    }
}

#[derive(Args)]
pub struct UserArgs {
    /// User name
    #[arg(short, long, alias = "username")]
    pub name: String,

    /// Password (required to create)
    #[arg(long, env = "HOSTUSERS_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Email address
    #[arg(long)]
    pub email: Option<String>,

    /// Whether the user should exist
    #[arg(long, value_enum, default_value_t)]
    pub state: StateArg,

    /// Report what would change without changing anything
    #[arg(long)]
    pub check: bool,

    /// When to write fields that can't be read back
    #[arg(long, value_enum, default_value_t)]
    pub update_password: UpdatePasswordArg,
}

impl UserArgs {
    fn into_input(self, attributes: BTreeMap<String, Value>) -> UserInput {
        UserInput {
            name: Some(self.name),
            password: self.password.map(Secret::new),
            email: self.email,
            attributes,
            state: self.state.into(),
        }
    }
}

/// Collect the attributes that were actually given
fn collect(pairs: impl IntoIterator<Item = (&'static str, Option<Value>)>) -> BTreeMap<String, Value> {
    pairs
        .into_iter()
        .filter_map(|(name, value)| value.map(|v| (name.to_string(), v)))
        .collect()
}

// ============================================================================
// TT-RSS
// ============================================================================

#[derive(Args)]
pub struct TtrssArgs {
    #[command(flatten)]
    pub user: UserArgs,

    /// 0 for a regular user, 10 for an admin
    #[arg(long, value_parser = ["0", "10"])]
    pub access_level: Option<String>,

    /// Allow API access
    #[arg(long)]
    pub api_enabled: Option<bool>,

    /// Full name
    #[arg(long)]
    pub full_name: Option<String>,

    /// TT-RSS SQLite database
    #[arg(long, value_name = "PATH")]
    pub db: Option<String>,
}

impl TtrssArgs {
    pub fn into_parts(self) -> (UserInput, ConnectionOverrides) {
        let attributes = collect([
            ("access_level", self.access_level.map(Value::from)),
            ("api_enabled", self.api_enabled.map(Value::from)),
            ("full_name", self.full_name.map(Value::from)),
        ]);
        let overrides = ConnectionOverrides {
            database: self.db,
            ..ConnectionOverrides::default()
        };
        (self.user.into_input(attributes), overrides)
    }
}

// ============================================================================
// FreshRSS
// ============================================================================

#[derive(Args)]
pub struct FreshrssArgs {
    #[command(flatten)]
    pub user: UserArgs,

    /// Interface language
    #[arg(long)]
    pub language: Option<String>,

    /// Timezone (write-only)
    #[arg(long)]
    pub timezone: Option<String>,

    /// API password (write-only)
    #[arg(long, env = "HOSTUSERS_API_PASSWORD", hide_env_values = true)]
    pub api_password: Option<String>,

    /// Authentication token (write-only)
    #[arg(long, env = "HOSTUSERS_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    #[arg(long)]
    pub purge_after_months: Option<i64>,

    #[arg(long)]
    pub feed_min_articles_default: Option<i64>,

    #[arg(long)]
    pub feed_ttl_default: Option<i64>,

    #[arg(long)]
    pub since_hours_posts_per_rss: Option<i64>,

    #[arg(long)]
    pub max_posts_per_rss: Option<i64>,

    /// Don't subscribe a new user to the default feeds
    #[arg(long)]
    pub no_default_feeds: bool,

    /// PHP interpreter
    #[arg(long, value_name = "PATH")]
    pub php_binary: Option<String>,

    /// FreshRSS install directory
    #[arg(long, value_name = "PATH")]
    pub freshrss_path: Option<String>,

    /// Run the FreshRSS scripts as this user (through sudo)
    #[arg(long, value_name = "USER")]
    pub become_user: Option<String>,
}

impl FreshrssArgs {
    pub fn into_parts(self) -> (UserInput, ConnectionOverrides) {
        let attributes = collect([
            ("language", self.language.map(Value::from)),
            ("timezone", self.timezone.map(Value::from)),
            ("api_password", self.api_password.map(Value::from)),
            ("token", self.token.map(Value::from)),
            ("purge_after_months", self.purge_after_months.map(Value::from)),
            ("feed_min_articles_default", self.feed_min_articles_default.map(Value::from)),
            ("feed_ttl_default", self.feed_ttl_default.map(Value::from)),
            ("since_hours_posts_per_rss", self.since_hours_posts_per_rss.map(Value::from)),
            ("max_posts_per_rss", self.max_posts_per_rss.map(Value::from)),
            ("no_default_feeds", self.no_default_feeds.then(|| json!(true))),
        ]);
        let overrides = ConnectionOverrides {
            php_binary: self.php_binary,
            freshrss_path: self.freshrss_path,
            become_user: self.become_user,
            ..ConnectionOverrides::default()
        };
        (self.user.into_input(attributes), overrides)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_ttrss_flags_become_attributes() {
        let cli = Cli::try_parse_from([
            "hostusers",
            "ttrss",
            "--name",
            "alice",
            "--password",
            "pw",
            "--access-level",
            "10",
            "--api-enabled",
            "true",
            "--db",
            "/tmp/ttrss.db",
            "--check",
        ])
        .unwrap();
        let Command::Ttrss(args) = cli.command else {
            panic!("expected ttrss");
        };
        assert!(args.user.check);

        let (input, overrides) = args.into_parts();
        assert_eq!(input.name.as_deref(), Some("alice"));
        assert_eq!(input.attributes["access_level"], "10");
        assert_eq!(input.attributes["api_enabled"], true);
        assert!(!input.attributes.contains_key("full_name"));
        assert_eq!(overrides.database.as_deref(), Some("/tmp/ttrss.db"));
    }

    #[test]
    fn test_freshrss_flags() {
        let cli = Cli::try_parse_from([
            "hostusers",
            "--json",
            "freshrss",
            "--username",
            "bob",
            "--state",
            "absent",
            "--no-default-feeds",
            "--feed-ttl-default",
            "3600",
            "--become-user",
            "www",
            "--update-password",
            "always",
        ])
        .unwrap();
        assert!(cli.json);
        let Command::Freshrss(args) = cli.command else {
            panic!("expected freshrss");
        };
        assert!(matches!(args.user.update_password, UpdatePasswordArg::Always));

        let (input, overrides) = args.into_parts();
        assert_eq!(input.state, DesiredState::Absent);
        assert_eq!(input.attributes["no_default_feeds"], true);
        assert_eq!(input.attributes["feed_ttl_default"], 3600);
        assert_eq!(overrides.become_user.as_deref(), Some("www"));
    }

    #[test]
    fn test_invalid_access_level_is_rejected() {
        assert!(
            Cli::try_parse_from(["hostusers", "ttrss", "--name", "a", "--access-level", "5"])
                .is_err()
        );
    }
}
