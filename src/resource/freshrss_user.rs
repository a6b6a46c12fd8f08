//! FreshRSS user backend
//!
//! Every call runs one of the FreshRSS CLI scripts; the listing is the only
//! script that runs in check mode.

use declarative::{
    ActualUser, AttrKind, AttrSpec, AttrValue, Attributes, AttributeSchema, Error, FieldDiff,
    RecordId, RequiredField, Result, UserBackend, UserSpec,
};
use freshrsskit::{CliConfig, Client, ErrorCategory, UserInfo, UserOptions};

/// Language FreshRSS gets when none is asked for
const DEFAULT_LANGUAGE: &str = "en";

const SCHEMA: AttributeSchema = AttributeSchema {
    attributes: &[
        AttrSpec::readable("language", AttrKind::Text),
        AttrSpec::write_only("timezone", AttrKind::Text),
        AttrSpec::write_only("api_password", AttrKind::Secret),
        AttrSpec::write_only("token", AttrKind::Secret),
        AttrSpec::write_only("purge_after_months", AttrKind::Int),
        AttrSpec::write_only("feed_min_articles_default", AttrKind::Int),
        AttrSpec::write_only("feed_ttl_default", AttrKind::Int),
        AttrSpec::write_only("since_hours_posts_per_rss", AttrKind::Int),
        AttrSpec::write_only("max_posts_per_rss", AttrKind::Int),
        AttrSpec::create_only("no_default_feeds", AttrKind::Bool),
    ],
    required_on_create: &[RequiredField::Password],
};

/// Users of one FreshRSS installation
pub struct FreshrssUsers {
    client: Client,
}

impl FreshrssUsers {
    pub fn new(config: CliConfig) -> Self {
        Self::with_client(Client::new(config))
    }

    /// Use a preconfigured client (useful for testing)
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

/// Map a CLI error onto the reconciliation taxonomy
fn cli_error(error: freshrsskit::Error) -> Error {
    let message = error.to_string();
    match error.category() {
        ErrorCategory::Connection => Error::Connection(message),
        ErrorCategory::Permission => Error::Permission(message),
        ErrorCategory::Invalid => Error::Validation(message),
        ErrorCategory::Execution => Error::BackendExecution {
            stderr: error.stderr().unwrap_or_default().to_string(),
            message,
        },
    }
}

fn user_name(id: &RecordId) -> Result<&str> {
    match id {
        RecordId::Name(name) => Ok(name),
        RecordId::Row(id) => Err(Error::execution(format!(
            "FreshRSS users are addressed by name, got row #{id}"
        ))),
    }
}

fn to_actual(info: UserInfo) -> ActualUser {
    let mut attributes = Attributes::new();
    attributes.insert("language".to_string(), AttrValue::Text(info.lang.clone()));

    ActualUser {
        id: RecordId::Name(info.user.clone()),
        email: info.email().map(str::to_string),
        name: info.user,
        attributes,
        password_hash: None,
    }
}

/// Script options for the given attributes
fn options(attributes: &Attributes) -> UserOptions {
    let text = |name: &str| {
        attributes
            .get(name)
            .and_then(AttrValue::as_text)
            .map(str::to_string)
    };
    let int = |name: &str| attributes.get(name).and_then(AttrValue::as_int);

    UserOptions {
        language: text("language"),
        timezone: text("timezone"),
        api_password: text("api_password"),
        token: text("token"),
        purge_after_months: int("purge_after_months"),
        feed_min_articles_default: int("feed_min_articles_default"),
        feed_ttl_default: int("feed_ttl_default"),
        since_hours_posts_per_rss: int("since_hours_posts_per_rss"),
        max_posts_per_rss: int("max_posts_per_rss"),
        no_default_feeds: attributes
            .get("no_default_feeds")
            .and_then(AttrValue::as_bool)
            .unwrap_or(false),
        ..UserOptions::default()
    }
}

impl UserBackend for FreshrssUsers {
    fn kind(&self) -> &'static str {
        "freshrss"
    }

    fn schema(&self) -> &AttributeSchema {
        &SCHEMA
    }

    fn validate_name(&self, name: &str) -> Result<()> {
        if freshrsskit::is_valid_username(name) {
            Ok(())
        } else {
            Err(cli_error(freshrsskit::Error::InvalidUsername(
                name.to_string(),
            )))
        }
    }

    fn fetch(&self, name: &str) -> Result<Option<ActualUser>> {
        let info = self.client.find_user(name).map_err(cli_error)?;
        Ok(info.map(to_actual))
    }

    fn create(&self, spec: &UserSpec) -> Result<RecordId> {
        let mut options = options(&spec.attributes);
        options.password = spec.password.as_ref().map(|p| p.expose().to_string());
        options.email.clone_from(&spec.email);
        options
            .language
            .get_or_insert_with(|| DEFAULT_LANGUAGE.to_string());

        self.client
            .create_user(&spec.name, &options)
            .map_err(cli_error)?;
        Ok(RecordId::Name(spec.name.clone()))
    }

    fn update(&self, id: &RecordId, diff: &FieldDiff) -> Result<()> {
        let name = user_name(id)?;
        let mut options = options(&diff.attributes);
        options.password = diff.password.as_ref().map(|p| p.expose().to_string());
        options.email.clone_from(&diff.email);
        if options.is_empty() {
            return Ok(());
        }
        self.client.update_user(name, &options).map_err(cli_error)
    }

    fn delete(&self, id: &RecordId) -> Result<()> {
        self.client.delete_user(user_name(id)?).map_err(cli_error)
    }
}
