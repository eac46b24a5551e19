//! Profile registry.
//!
//! Immutable name → profile table built once at startup and passed to
//! whatever constructs the application. Unknown names are an error; only an
//! absent selection falls back to the designated default.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use common::{
    AppError, AppResult, DatabaseOverrides, MailOverrides, Settings, SettingsOverrides,
    DEFAULT_ALIAS, DEFAULT_ENVIRONMENT, DEV_DATABASE_FILE, ENV_ADMIN, ENV_DATABASE_URL,
    ENV_DEV_DATABASE_URL, ENV_MAIL_PASSWORD, ENV_MAIL_USERNAME, ENV_SECRET_KEY, ENV_SSL_DISABLE,
    ENV_TEST_DATABASE_URL, PROD_DATABASE_FILE, TEST_DATABASE_FILE,
};

use crate::env::EnvVars;
use crate::profile::{InitStep, Profile};

/// Name → profile lookup table.
#[derive(Debug, Clone)]
pub struct Registry {
    profiles: BTreeMap<String, Arc<Profile>>,
    default: String,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Declare the standard SoConn profiles.
    ///
    /// External values are read from `env` here and never again. SQLite
    /// fallbacks are placed under `base_dir`.
    pub fn standard(env: &EnvVars, base_dir: &Path) -> AppResult<Self> {
        let sqlite = |file: &str| format!("sqlite://{}?mode=rwc", base_dir.join(file).display());

        let base = Profile::root(
            "base",
            Settings::default().merge(&SettingsOverrides {
                secret_key: env.get_string(ENV_SECRET_KEY),
                mail: MailOverrides {
                    username: env.get_string(ENV_MAIL_USERNAME),
                    password: env.get_string(ENV_MAIL_PASSWORD),
                    admin: env.get_string(ENV_ADMIN),
                    ..Default::default()
                },
                ..Default::default()
            }),
        );

        let dev = Profile::derive(
            "dev",
            &base,
            SettingsOverrides {
                debug: Some(true),
                database: DatabaseOverrides {
                    url: Some(
                        env.get_string(ENV_DEV_DATABASE_URL)
                            .unwrap_or_else(|| sqlite(DEV_DATABASE_FILE)),
                    ),
                    ..Default::default()
                },
                ..Default::default()
            },
            Vec::new(),
        );

        let test = Profile::derive(
            "test",
            &base,
            SettingsOverrides {
                testing: Some(true),
                csrf_enabled: Some(false),
                database: DatabaseOverrides {
                    url: Some(
                        env.get_string(ENV_TEST_DATABASE_URL)
                            .unwrap_or_else(|| sqlite(TEST_DATABASE_FILE)),
                    ),
                    ..Default::default()
                },
                ..Default::default()
            },
            Vec::new(),
        );

        let prod = Profile::derive(
            "prod",
            &base,
            SettingsOverrides {
                database: DatabaseOverrides {
                    url: Some(
                        env.get_string(ENV_DATABASE_URL)
                            .unwrap_or_else(|| sqlite(PROD_DATABASE_FILE)),
                    ),
                    ..Default::default()
                },
                ..Default::default()
            },
            vec![InitStep::MailErrors],
        );

        let heroku = Profile::derive(
            "heroku",
            &prod,
            SettingsOverrides {
                ssl_disable: Some(env.is_set(ENV_SSL_DISABLE)),
                ..Default::default()
            },
            vec![InitStep::ProxyFix, InitStep::StderrLog],
        );

        let unix = Profile::derive("unix", &prod, Default::default(), vec![InitStep::Syslog]);

        Registry::builder()
            .register(Arc::clone(&dev))
            .register(test)
            .register(prod)
            .register(heroku)
            .register(unix)
            .register_as(DEFAULT_ALIAS, dev)
            .default_profile(DEFAULT_ENVIRONMENT)
            .build()
    }

    /// Look up the profile registered under `name`.
    pub fn resolve(&self, name: &str) -> AppResult<Arc<Profile>> {
        self.profiles
            .get(name)
            .cloned()
            .ok_or_else(|| AppError::unknown_environment(name, self.names()))
    }

    /// Resolve an optional selection: `None` picks the default profile.
    pub fn select(&self, name: Option<&str>) -> AppResult<Arc<Profile>> {
        match name {
            Some(name) => self.resolve(name),
            None => {
                tracing::debug!(default = %self.default, "No environment selected, using default");
                self.resolve(&self.default)
            }
        }
    }

    /// Registered names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    pub fn default_name(&self) -> &str {
        &self.default
    }
}

/// Validating builder for custom registries.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    profiles: BTreeMap<String, Arc<Profile>>,
    default: Option<String>,
    duplicates: Vec<String>,
}

impl RegistryBuilder {
    /// Register a profile under its own name.
    pub fn register(self, profile: Arc<Profile>) -> Self {
        let name = profile.name().to_string();
        self.register_as(name, profile)
    }

    /// Register a profile under an explicit key, e.g. an alias.
    pub fn register_as(mut self, key: impl Into<String>, profile: Arc<Profile>) -> Self {
        let key = key.into();
        if self.profiles.insert(key.clone(), profile).is_some() {
            self.duplicates.push(key);
        }
        self
    }

    /// Designate the profile used when no environment is selected.
    pub fn default_profile(mut self, name: impl Into<String>) -> Self {
        self.default = Some(name.into());
        self
    }

    pub fn build(self) -> AppResult<Registry> {
        if !self.duplicates.is_empty() {
            return Err(AppError::config(format!(
                "profiles registered twice: {}",
                self.duplicates.join(", ")
            )));
        }

        let default = self
            .default
            .ok_or_else(|| AppError::config("no default profile designated"))?;
        if !self.profiles.contains_key(&default) {
            return Err(AppError::config(format!(
                "default profile '{}' is not registered",
                default
            )));
        }

        Ok(Registry {
            profiles: self.profiles,
            default,
        })
    }
}
