//! Environment variable snapshots.
//!
//! Profiles read their external values once, at declaration time, from an
//! `EnvVars` snapshot instead of the live process environment.

use std::collections::HashMap;

/// Immutable copy of a set of environment variables.
#[derive(Debug, Clone, Default)]
pub struct EnvVars {
    vars: HashMap<String, String>,
}

impl EnvVars {
    /// Snapshot the current process environment. Non-UTF-8 entries are skipped.
    pub fn from_process() -> Self {
        std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect()
    }

    /// Get a variable. Empty values are treated as unset.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Owned variant of [`EnvVars::get`].
    pub fn get_string(&self, key: &str) -> Option<String> {
        self.get(key).map(str::to_string)
    }

    /// Whether a variable is set to a non-empty value.
    pub fn is_set(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

impl<K, V> FromIterator<(K, V)> for EnvVars
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_values_are_unset() {
        let env: EnvVars = [("MAIL_USERNAME", ""), ("SOCONN_ADMIN", "admin@example.com")]
            .into_iter()
            .collect();

        assert_eq!(env.get("MAIL_USERNAME"), None);
        assert!(!env.is_set("MAIL_USERNAME"));
        assert_eq!(env.get_string("SOCONN_ADMIN").as_deref(), Some("admin@example.com"));
        assert_eq!(env.get("MISSING"), None);
    }
}
