use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

use crate::error::ConfigError;

pub const DEFAULT_REALM: &str = "backend";

static REALM_NAME: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^[a-z0-9][a-z0-9_-]*$").ok());

/// Name of an authentication domain, also used as the URL prefix.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Realm(String);

impl Realm {
    /// # Errors
    /// Returns `ConfigError::InvalidRealm` unless `name` matches `[a-z0-9][a-z0-9_-]*`.
    pub fn new(name: &str) -> Result<Self, ConfigError> {
        if REALM_NAME.as_ref().is_some_and(|regex| regex.is_match(name)) {
            Ok(Self(name.to_string()))
        } else {
            Err(ConfigError::InvalidRealm(name.to_string()))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Route prefix, e.g. `/backend`.
    #[must_use]
    pub fn prefix(&self) -> String {
        format!("/{}", self.0)
    }
}

impl Default for Realm {
    fn default() -> Self {
        Self(DEFAULT_REALM.to_string())
    }
}

impl fmt::Display for Realm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_slug_names() {
        for name in ["backend", "admin-2", "ops_console", "0"] {
            assert!(Realm::new(name).is_ok(), "{name} should be accepted");
        }
        assert_eq!(Realm::default().prefix(), "/backend");
    }

    #[test]
    fn rejects_names_unsafe_for_paths() {
        for name in ["", "Backend", "-admin", "a/b", "a b", "..", "admin?x"] {
            assert_eq!(
                Realm::new(name),
                Err(ConfigError::InvalidRealm(name.to_string()))
            );
        }
    }
}
