//! Deployment profiles.
//!
//! A profile is a named settings record plus the init steps it adds on top
//! of its parent. Inheritance is explicit composition: the effective
//! settings are computed once from the parent's record, and the init chain
//! is the parent's chain followed by the profile's own steps.

use std::fmt;
use std::sync::Arc;

use common::{Settings, SettingsOverrides};

/// A single initialization capability applied to an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitStep {
    /// Mail ERROR events to the administrator
    MailErrors,
    /// Restore client address, scheme and host from proxy headers
    ProxyFix,
    /// Log WARN and above to stderr
    StderrLog,
    /// Log WARN and above to syslog
    Syslog,
}

impl InitStep {
    pub fn name(&self) -> &'static str {
        match self {
            InitStep::MailErrors => "mail-errors",
            InitStep::ProxyFix => "proxy-fix",
            InitStep::StderrLog => "stderr-log",
            InitStep::Syslog => "syslog",
        }
    }
}

impl fmt::Display for InitStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Named settings bundle with its initialization behavior.
#[derive(Debug, Clone)]
pub struct Profile {
    name: String,
    parent: Option<Arc<Profile>>,
    settings: Settings,
    steps: Vec<InitStep>,
}

impl Profile {
    /// A root profile with no parent and no init steps.
    pub fn root(name: impl Into<String>, settings: Settings) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            parent: None,
            settings,
            steps: Vec::new(),
        })
    }

    /// The root profile holding hardcoded base defaults.
    pub fn base() -> Arc<Self> {
        Self::root("base", Settings::default())
    }

    /// Derive a child profile from `parent`.
    pub fn derive(
        name: impl Into<String>,
        parent: &Arc<Profile>,
        overrides: SettingsOverrides,
        steps: Vec<InitStep>,
    ) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            settings: parent.settings.merge(&overrides),
            parent: Some(Arc::clone(parent)),
            steps,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<&Arc<Profile>> {
        self.parent.as_ref()
    }

    /// Effective settings: parent's record overridden by this profile.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Steps declared on this profile only.
    pub fn own_steps(&self) -> &[InitStep] {
        &self.steps
    }

    /// Full init chain, root ancestor first.
    pub fn init_chain(&self) -> Vec<InitStep> {
        let mut chain = self
            .parent
            .as_ref()
            .map(|p| p.init_chain())
            .unwrap_or_default();
        chain.extend_from_slice(&self.steps);
        chain
    }

    /// Profile names from the root ancestor down to this profile.
    pub fn lineage(&self) -> Vec<&str> {
        let mut names = self
            .parent
            .as_ref()
            .map(|p| p.lineage())
            .unwrap_or_default();
        names.push(&self.name);
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::MailOverrides;

    #[test]
    fn test_child_chain_runs_parent_first() {
        let base = Profile::base();
        let prod = Profile::derive("prod", &base, Default::default(), vec![InitStep::MailErrors]);
        let heroku = Profile::derive(
            "heroku",
            &prod,
            Default::default(),
            vec![InitStep::ProxyFix, InitStep::StderrLog],
        );

        assert!(base.init_chain().is_empty());
        assert_eq!(
            heroku.init_chain(),
            vec![InitStep::MailErrors, InitStep::ProxyFix, InitStep::StderrLog]
        );
        assert_eq!(heroku.own_steps(), &[InitStep::ProxyFix, InitStep::StderrLog]);
        assert_eq!(heroku.lineage(), vec!["base", "prod", "heroku"]);
    }

    #[test]
    fn test_settings_are_inherited_transitively() {
        let base = Profile::base();
        let middle = Profile::derive(
            "middle",
            &base,
            SettingsOverrides {
                mail: MailOverrides {
                    port: Some(2525),
                    server: Some("mail.internal".to_string()),
                    ..Default::default()
                },
                ..Default::default()
            },
            Vec::new(),
        );
        let leaf = Profile::derive(
            "leaf",
            &middle,
            SettingsOverrides {
                mail: MailOverrides {
                    port: Some(25),
                    ..Default::default()
                },
                ..Default::default()
            },
            Vec::new(),
        );

        assert_eq!(leaf.settings().mail.port, 25);
        assert_eq!(leaf.settings().mail.server, "mail.internal");
        assert_eq!(leaf.settings().pagination, base.settings().pagination);
        assert_eq!(leaf.parent().map(|p| p.name()), Some("middle"));
    }
}
