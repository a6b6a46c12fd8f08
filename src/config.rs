//! Connection configuration
//!
//! Read from `~/.config/hostusers/config.toml` (or `--config`):
//!
//! ```toml
//! [ttrss]
//! database = "/var/db/tt-rss/ttrss.db"
//!
//! [ttrss.tables]
//! users_table = "ttrss_users"
//!
//! [freshrss]
//! php_binary = "/usr/pkg/bin/php83"
//! path = "/usr/pkg/share/freshrss"
//! become_user = "www"
//! ```
//!
//! Command-line flags and `connection` overrides in an args file take
//! precedence over the file.

use crate::paths;
use crate::resource::{BackendConfig, BackendKind};
use anyhow::{Context, Result, bail};
use freshrsskit::CliConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use ttrsskit::TableMapping;

/// Default TT-RSS database (pkgsrc layout)
pub const DEFAULT_TTRSS_DATABASE: &str = "/var/db/tt-rss/ttrss.db";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HostConfig {
    pub ttrss: TtrssConfig,
    pub freshrss: CliConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TtrssConfig {
    pub database: PathBuf,
    pub tables: TableMapping,
}

impl Default for TtrssConfig {
    fn default() -> Self {
        Self {
            database: PathBuf::from(DEFAULT_TTRSS_DATABASE),
            tables: TableMapping::default(),
        }
    }
}

/// Connection settings given for a single invocation
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConnectionOverrides {
    #[serde(alias = "db")]
    pub database: Option<String>,
    pub php_binary: Option<String>,
    #[serde(alias = "path")]
    pub freshrss_path: Option<String>,
    pub become_user: Option<String>,
}

impl HostConfig {
    /// Load the config file
    ///
    /// A missing default file means defaults; a file named with `--config`
    /// must exist.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let config_path = match explicit {
            Some(path) => {
                if !path.exists() {
                    bail!("Config file not found: {}", path.display());
                }
                path.to_path_buf()
            }
            None => {
                let path = paths::config_file()?;
                if !path.exists() {
                    log::debug!("No config at {}, using defaults", path.display());
                    return Ok(Self::default());
                }
                path
            }
        };

        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Could not read config file: {}", config_path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Invalid config file: {}", config_path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("Invalid TOML format")?;
        config
            .ttrss
            .tables
            .validate()
            .context("Invalid [ttrss.tables] mapping")?;
        Ok(config)
    }

    /// Resolve the settings for one backend, overrides first
    pub fn backend(&self, kind: BackendKind, overrides: &ConnectionOverrides) -> BackendConfig {
        match kind {
            BackendKind::Ttrss => {
                let database = overrides
                    .database
                    .as_deref()
                    .map_or_else(|| expand_buf(&self.ttrss.database), paths::expand);
                BackendConfig::Ttrss {
                    database,
                    tables: self.ttrss.tables.clone(),
                }
            }
            BackendKind::Freshrss => {
                let base = &self.freshrss;
                let php_binary = overrides
                    .php_binary
                    .as_deref()
                    .map_or_else(|| expand_buf(&base.php_binary), paths::expand);
                let path = overrides
                    .freshrss_path
                    .as_deref()
                    .map_or_else(|| expand_buf(&base.path), paths::expand);
                BackendConfig::Freshrss(CliConfig {
                    php_binary,
                    path,
                    become_user: overrides
                        .become_user
                        .clone()
                        .or_else(|| base.become_user.clone())
                        .filter(|u| !u.is_empty()),
                    scripts: base.scripts.clone(),
                })
            }
        }
    }
}

fn expand_buf(path: &Path) -> PathBuf {
    paths::expand(&path.to_string_lossy())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_is_default() {
        let config = HostConfig::parse("").unwrap();
        assert_eq!(config, HostConfig::default());

        let BackendConfig::Ttrss { database, tables } =
            config.backend(BackendKind::Ttrss, &ConnectionOverrides::default())
        else {
            panic!("expected ttrss");
        };
        assert_eq!(database, PathBuf::from(DEFAULT_TTRSS_DATABASE));
        assert_eq!(tables.users_table, "ttrss_users");
    }

    #[test]
    fn test_parse_full_config() {
        let config = HostConfig::parse(
            r#"
            [ttrss]
            database = "~/tt-rss/ttrss.db"

            [ttrss.tables]
            users_table = "rss_users"

            [freshrss]
            php_binary = "/usr/bin/php"
            path = "/srv/freshrss"
            become_user = "www"

            [freshrss.scripts]
            list = "list-users.php"
            "#,
        )
        .unwrap();

        assert_eq!(config.ttrss.tables.users_table, "rss_users");
        assert_eq!(config.ttrss.tables.prefs_table, "ttrss_user_prefs2");

        let BackendConfig::Ttrss { database, .. } =
            config.backend(BackendKind::Ttrss, &ConnectionOverrides::default())
        else {
            panic!("expected ttrss");
        };
        let home = dirs::home_dir().unwrap();
        assert_eq!(database, home.join("tt-rss").join("ttrss.db"));

        let BackendConfig::Freshrss(cli) =
            config.backend(BackendKind::Freshrss, &ConnectionOverrides::default())
        else {
            panic!("expected freshrss");
        };
        assert_eq!(cli.php_binary, PathBuf::from("/usr/bin/php"));
        assert_eq!(cli.become_user.as_deref(), Some("www"));
        assert_eq!(cli.scripts.list, "list-users.php");
        assert_eq!(cli.scripts.create, "create-user.php");
    }

    #[test]
    fn test_overrides_win() {
        let config = HostConfig::parse("[freshrss]\nbecome_user = \"www\"\n").unwrap();
        let overrides = ConnectionOverrides {
            freshrss_path: Some("/opt/freshrss".into()),
            become_user: Some(String::new()),
            ..ConnectionOverrides::default()
        };

        let BackendConfig::Freshrss(cli) = config.backend(BackendKind::Freshrss, &overrides) else {
            panic!("expected freshrss");
        };
        assert_eq!(cli.path, PathBuf::from("/opt/freshrss"));
        assert_eq!(cli.php_binary, PathBuf::from(freshrsskit::DEFAULT_PHP_BINARY));
        assert_eq!(cli.become_user, None);
    }

    #[test]
    fn test_rejects_bad_config() {
        assert!(HostConfig::parse("[ttrss]\ndatabse = \"x\"\n").is_err());
        assert!(HostConfig::parse("[ttrss.tables]\nlogin = \"login; DROP TABLE x\"\n").is_err());
    }

    #[test]
    fn test_explicit_path_must_exist() {
        let tmp = tempfile::TempDir::new().unwrap();
        assert!(HostConfig::load(Some(&tmp.path().join("missing.toml"))).is_err());

        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[ttrss]\ndatabase = \"/tmp/t.db\"\n").unwrap();
        let config = HostConfig::load(Some(&path)).unwrap();
        assert_eq!(config.ttrss.database, PathBuf::from("/tmp/t.db"));
    }
}
