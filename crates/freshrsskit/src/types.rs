//! Data types for the FreshRSS CLI

use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;

/// Default PHP interpreter (pkgsrc layout)
pub const DEFAULT_PHP_BINARY: &str = "/usr/pkg/bin/php83";

/// Default FreshRSS install directory (pkgsrc layout)
pub const DEFAULT_FRESHRSS_PATH: &str = "/usr/pkg/share/freshrss";

/// Where FreshRSS lives and how to run its scripts
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    pub php_binary: PathBuf,
    /// Install directory; scripts are under `cli/` and run from here
    pub path: PathBuf,
    /// Run scripts as this user through `sudo -u`
    pub become_user: Option<String>,
    pub scripts: Scripts,
}

/// Script names under `cli/`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Scripts {
    /// Must accept `--json` and print every user
    pub list: String,
    pub create: String,
    pub update: String,
    pub delete: String,
}

impl Default for Scripts {
    fn default() -> Self {
        Self {
            list: "user-info.php".to_string(),
            create: "create-user.php".to_string(),
            update: "update-user.php".to_string(),
            delete: "delete-user.php".to_string(),
        }
    }
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            php_binary: PathBuf::from(DEFAULT_PHP_BINARY),
            path: PathBuf::from(DEFAULT_FRESHRSS_PATH),
            become_user: None,
            scripts: Scripts::default(),
        }
    }
}

/// One entry of `cli/user-info.php --json`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserInfo {
    pub user: String,
    pub lang: String,
    /// Empty when the user has no email
    pub mail_login: String,
}

impl UserInfo {
    /// Email address, if one is set
    pub fn email(&self) -> Option<&str> {
        Some(self.mail_login.as_str()).filter(|m| !m.is_empty())
    }
}

/// Options accepted by `create-user.php` and `update-user.php`
///
/// Unset options are not passed, so the script leaves them alone.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct UserOptions {
    pub password: Option<String>,
    pub email: Option<String>,
    pub language: Option<String>,
    pub timezone: Option<String>,
    pub api_password: Option<String>,
    pub token: Option<String>,
    pub purge_after_months: Option<i64>,
    pub feed_min_articles_default: Option<i64>,
    pub feed_ttl_default: Option<i64>,
    pub since_hours_posts_per_rss: Option<i64>,
    pub max_posts_per_rss: Option<i64>,
    /// Create only: skip the default feed subscriptions
    pub no_default_feeds: bool,
}

impl UserOptions {
    /// Command-line flags for these options
    ///
    /// `--no-default-feeds` is only emitted when `creating`.
    pub fn to_args(&self, creating: bool) -> Vec<String> {
        let mut args = Vec::new();

        let text = [
            ("--password", &self.password),
            ("--api-password", &self.api_password),
            ("--email", &self.email),
            ("--language", &self.language),
            ("--timezone", &self.timezone),
            ("--token", &self.token),
        ];
        for (flag, value) in text {
            if let Some(value) = value {
                args.push(flag.to_string());
                args.push(value.clone());
            }
        }

        let numbers = [
            ("--purge-after-months", self.purge_after_months),
            ("--feed-min-articles-default", self.feed_min_articles_default),
            ("--feed-ttl-default", self.feed_ttl_default),
            ("--since-hours-posts-per-rss", self.since_hours_posts_per_rss),
            ("--max-posts-per-rss", self.max_posts_per_rss),
        ];
        for (flag, value) in numbers {
            if let Some(value) = value {
                args.push(flag.to_string());
                args.push(value.to_string());
            }
        }

        if creating && self.no_default_feeds {
            args.push("--no-default-feeds".to_string());
        }
        args
    }

    /// Check if no option is set
    pub fn is_empty(&self) -> bool {
        self.to_args(true).is_empty()
    }
}

fn redacted(value: &Option<String>) -> Option<&'static str> {
    value.as_ref().map(|_| "********")
}

impl fmt::Debug for UserOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserOptions")
            .field("password", &redacted(&self.password))
            .field("email", &self.email)
            .field("language", &self.language)
            .field("timezone", &self.timezone)
            .field("api_password", &redacted(&self.api_password))
            .field("token", &redacted(&self.token))
            .field("purge_after_months", &self.purge_after_months)
            .field("feed_min_articles_default", &self.feed_min_articles_default)
            .field("feed_ttl_default", &self.feed_ttl_default)
            .field("since_hours_posts_per_rss", &self.since_hours_posts_per_rss)
            .field("max_posts_per_rss", &self.max_posts_per_rss)
            .field("no_default_feeds", &self.no_default_feeds)
            .finish()
    }
}
