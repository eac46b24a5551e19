//! Typed application settings and their override layer.
//!
//! `Settings` is the flat record an application runs with. Profiles never
//! mutate it; they describe a `SettingsOverrides` and compose a new record
//! with [`Settings::merge`].

use std::fmt;
use std::time::Duration;

use serde::{Serialize, Serializer};

use super::constants::{
    COMMENTS_PER_PAGE, DEFAULT_DATABASE_URL, DEFAULT_MAIL_PORT, DEFAULT_MAIL_SENDER,
    DEFAULT_MAIL_SERVER, DEFAULT_MAIL_SUBJECT_PREFIX, FOLLOWERS_PER_PAGE, POSTS_PER_PAGE,
    SLOW_DB_QUERY_TIME_MS,
};

/// Application settings
#[derive(Clone, PartialEq, Serialize)]
pub struct Settings {
    #[serde(skip_serializing)]
    pub secret_key: Option<String>,
    pub debug: bool,
    pub testing: bool,
    pub ssl_disable: bool,
    /// Cross-site request forgery protection for the form layer
    pub csrf_enabled: bool,
    pub database: DatabaseSettings,
    pub mail: MailSettings,
    pub pagination: PaginationSettings,
}

/// Database settings consumed by the ORM layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub commit_on_teardown: bool,
    pub track_modifications: bool,
    pub record_queries: bool,
    #[serde(serialize_with = "serialize_millis")]
    pub slow_query_threshold: Duration,
}

/// Outgoing mail settings, also used by the error alert handler.
#[derive(Clone, PartialEq, Serialize)]
pub struct MailSettings {
    pub server: String,
    pub port: u16,
    pub use_tls: bool,
    pub username: Option<String>,
    #[serde(skip_serializing)]
    pub password: Option<String>,
    pub subject_prefix: String,
    pub sender: String,
    /// Administrator address receiving error alerts
    pub admin: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaginationSettings {
    pub posts_per_page: u64,
    pub followers_per_page: u64,
    pub comments_per_page: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            secret_key: None,
            debug: false,
            testing: false,
            ssl_disable: false,
            csrf_enabled: true,
            database: DatabaseSettings::default(),
            mail: MailSettings::default(),
            pagination: PaginationSettings::default(),
        }
    }
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: DEFAULT_DATABASE_URL.to_string(),
            commit_on_teardown: true,
            track_modifications: false,
            record_queries: true,
            slow_query_threshold: Duration::from_millis(SLOW_DB_QUERY_TIME_MS),
        }
    }
}

impl Default for MailSettings {
    fn default() -> Self {
        Self {
            server: DEFAULT_MAIL_SERVER.to_string(),
            port: DEFAULT_MAIL_PORT,
            use_tls: true,
            username: None,
            password: None,
            subject_prefix: DEFAULT_MAIL_SUBJECT_PREFIX.to_string(),
            sender: DEFAULT_MAIL_SENDER.to_string(),
            admin: None,
        }
    }
}

impl Default for PaginationSettings {
    fn default() -> Self {
        Self {
            posts_per_page: POSTS_PER_PAGE,
            followers_per_page: FOLLOWERS_PER_PAGE,
            comments_per_page: COMMENTS_PER_PAGE,
        }
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("secret_key", &redacted(&self.secret_key))
            .field("debug", &self.debug)
            .field("testing", &self.testing)
            .field("ssl_disable", &self.ssl_disable)
            .field("csrf_enabled", &self.csrf_enabled)
            .field("database", &self.database)
            .field("mail", &self.mail)
            .field("pagination", &self.pagination)
            .finish()
    }
}

impl fmt::Debug for MailSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailSettings")
            .field("server", &self.server)
            .field("port", &self.port)
            .field("use_tls", &self.use_tls)
            .field("username", &self.username)
            .field("password", &redacted(&self.password))
            .field("subject_prefix", &self.subject_prefix)
            .field("sender", &self.sender)
            .field("admin", &self.admin)
            .finish()
    }
}

fn redacted(value: &Option<String>) -> &'static str {
    match value {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

fn serialize_millis<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(value.as_millis() as u64)
}

// =============================================================================
// Overrides
// =============================================================================

/// Values a profile sets on top of its parent. `None` inherits.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsOverrides {
    pub secret_key: Option<String>,
    pub debug: Option<bool>,
    pub testing: Option<bool>,
    pub ssl_disable: Option<bool>,
    pub csrf_enabled: Option<bool>,
    pub database: DatabaseOverrides,
    pub mail: MailOverrides,
    pub pagination: PaginationOverrides,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatabaseOverrides {
    pub url: Option<String>,
    pub commit_on_teardown: Option<bool>,
    pub track_modifications: Option<bool>,
    pub record_queries: Option<bool>,
    pub slow_query_threshold: Option<Duration>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MailOverrides {
    pub server: Option<String>,
    pub port: Option<u16>,
    pub use_tls: Option<bool>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub subject_prefix: Option<String>,
    pub sender: Option<String>,
    pub admin: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaginationOverrides {
    pub posts_per_page: Option<u64>,
    pub followers_per_page: Option<u64>,
    pub comments_per_page: Option<u64>,
}

impl Settings {
    /// Compose a new record: every value set in `overrides` wins, the rest
    /// is carried over from `self`.
    pub fn merge(&self, overrides: &SettingsOverrides) -> Settings {
        let db = &overrides.database;
        let mail = &overrides.mail;
        let pages = &overrides.pagination;

        Settings {
            secret_key: overrides.secret_key.clone().or_else(|| self.secret_key.clone()),
            debug: overrides.debug.unwrap_or(self.debug),
            testing: overrides.testing.unwrap_or(self.testing),
            ssl_disable: overrides.ssl_disable.unwrap_or(self.ssl_disable),
            csrf_enabled: overrides.csrf_enabled.unwrap_or(self.csrf_enabled),
            database: DatabaseSettings {
                url: db.url.clone().unwrap_or_else(|| self.database.url.clone()),
                commit_on_teardown: db
                    .commit_on_teardown
                    .unwrap_or(self.database.commit_on_teardown),
                track_modifications: db
                    .track_modifications
                    .unwrap_or(self.database.track_modifications),
                record_queries: db.record_queries.unwrap_or(self.database.record_queries),
                slow_query_threshold: db
                    .slow_query_threshold
                    .unwrap_or(self.database.slow_query_threshold),
            },
            mail: MailSettings {
                server: mail.server.clone().unwrap_or_else(|| self.mail.server.clone()),
                port: mail.port.unwrap_or(self.mail.port),
                use_tls: mail.use_tls.unwrap_or(self.mail.use_tls),
                username: mail.username.clone().or_else(|| self.mail.username.clone()),
                password: mail.password.clone().or_else(|| self.mail.password.clone()),
                subject_prefix: mail
                    .subject_prefix
                    .clone()
                    .unwrap_or_else(|| self.mail.subject_prefix.clone()),
                sender: mail.sender.clone().unwrap_or_else(|| self.mail.sender.clone()),
                admin: mail.admin.clone().or_else(|| self.mail.admin.clone()),
            },
            pagination: PaginationSettings {
                posts_per_page: pages.posts_per_page.unwrap_or(self.pagination.posts_per_page),
                followers_per_page: pages
                    .followers_per_page
                    .unwrap_or(self.pagination.followers_per_page),
                comments_per_page: pages
                    .comments_per_page
                    .unwrap_or(self.pagination.comments_per_page),
            },
        }
    }
}

// =============================================================================
// Inspection
// =============================================================================

/// A single setting value, typed for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingValue {
    Text(Option<String>),
    Integer(u64),
    Bool(bool),
    Duration(Duration),
    /// Secrets only reveal whether they are set
    Secret { set: bool },
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingValue::Text(Some(v)) => write!(f, "{}", v),
            SettingValue::Text(None) => write!(f, "<unset>"),
            SettingValue::Integer(v) => write!(f, "{}", v),
            SettingValue::Bool(v) => write!(f, "{}", v),
            SettingValue::Duration(v) => write!(f, "{}ms", v.as_millis()),
            SettingValue::Secret { set: true } => write!(f, "[REDACTED]"),
            SettingValue::Secret { set: false } => write!(f, "<unset>"),
        }
    }
}

impl Settings {
    /// All settings as `(key, value)` pairs, in declaration order.
    pub fn entries(&self) -> Vec<(&'static str, SettingValue)> {
        let text = |v: &str| SettingValue::Text(Some(v.to_string()));
        vec![
            ("secret_key", SettingValue::Secret { set: self.secret_key.is_some() }),
            ("debug", SettingValue::Bool(self.debug)),
            ("testing", SettingValue::Bool(self.testing)),
            ("ssl_disable", SettingValue::Bool(self.ssl_disable)),
            ("csrf_enabled", SettingValue::Bool(self.csrf_enabled)),
            ("database.url", text(&self.database.url)),
            ("database.commit_on_teardown", SettingValue::Bool(self.database.commit_on_teardown)),
            ("database.track_modifications", SettingValue::Bool(self.database.track_modifications)),
            ("database.record_queries", SettingValue::Bool(self.database.record_queries)),
            (
                "database.slow_query_threshold",
                SettingValue::Duration(self.database.slow_query_threshold),
            ),
            ("mail.server", text(&self.mail.server)),
            ("mail.port", SettingValue::Integer(u64::from(self.mail.port))),
            ("mail.use_tls", SettingValue::Bool(self.mail.use_tls)),
            ("mail.username", SettingValue::Text(self.mail.username.clone())),
            ("mail.password", SettingValue::Secret { set: self.mail.password.is_some() }),
            ("mail.subject_prefix", text(&self.mail.subject_prefix)),
            ("mail.sender", text(&self.mail.sender)),
            ("mail.admin", SettingValue::Text(self.mail.admin.clone())),
            ("pagination.posts_per_page", SettingValue::Integer(self.pagination.posts_per_page)),
            (
                "pagination.followers_per_page",
                SettingValue::Integer(self.pagination.followers_per_page),
            ),
            (
                "pagination.comments_per_page",
                SettingValue::Integer(self.pagination.comments_per_page),
            ),
        ]
    }

    /// Look up a single setting by its dotted key.
    pub fn get(&self, key: &str) -> Option<SettingValue> {
        self.entries()
            .into_iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_overrides_keep_every_value() {
        let base = Settings::default();
        assert_eq!(base.merge(&SettingsOverrides::default()), base);
    }

    #[test]
    fn test_override_wins_and_rest_is_inherited() {
        let base = Settings::default();
        let overrides = SettingsOverrides {
            debug: Some(true),
            database: DatabaseOverrides {
                url: Some("sqlite://dev.sqlite".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };

        let merged = base.merge(&overrides);
        assert!(merged.debug);
        assert_eq!(merged.database.url, "sqlite://dev.sqlite");
        assert_eq!(merged.database.record_queries, base.database.record_queries);
        assert_eq!(merged.mail, base.mail);
    }

    #[test]
    fn test_merge_is_layered() {
        let parent = Settings::default().merge(&SettingsOverrides {
            mail: MailOverrides {
                port: Some(2525),
                sender: Some("ops@example.com".to_string()),
                ..Default::default()
            },
            ..Default::default()
        });
        let child = parent.merge(&SettingsOverrides {
            mail: MailOverrides {
                port: Some(25),
                ..Default::default()
            },
            ..Default::default()
        });

        assert_eq!(child.mail.port, 25);
        assert_eq!(child.mail.sender, "ops@example.com");
        assert_eq!(child.mail.server, DEFAULT_MAIL_SERVER);
    }

    #[test]
    fn test_secrets_are_redacted() {
        let settings = Settings::default().merge(&SettingsOverrides {
            secret_key: Some("hunter2".to_string()),
            mail: MailOverrides {
                password: Some("p4ss".to_string()),
                ..Default::default()
            },
            ..Default::default()
        });

        let debug = format!("{:?}", settings);
        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains("p4ss"));

        let json = serde_json::to_string(&settings).unwrap();
        assert!(!json.contains("hunter2"));
        assert!(!json.contains("p4ss"));

        assert_eq!(settings.get("secret_key").unwrap().to_string(), "[REDACTED]");
    }

    #[test]
    fn test_get_by_key() {
        let settings = Settings::default();
        assert_eq!(
            settings.get("database.slow_query_threshold"),
            Some(SettingValue::Duration(Duration::from_millis(500)))
        );
        assert_eq!(settings.get("mail.admin"), Some(SettingValue::Text(None)));
        assert_eq!(settings.get("nope"), None);
    }
}
