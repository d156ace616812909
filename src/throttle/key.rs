use std::fmt;

/// Throttling key: normalized identifier and caller origin joined by `|`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ThrottleKey(String);

impl ThrottleKey {
    /// Derive the key for an attempt.
    ///
    /// The identifier is trimmed and lowercased so `Alice@Example.com` and
    /// `alice@example.com` share one counter. The origin is used verbatim.
    #[must_use]
    pub fn derive(identifier: &str, origin: &str) -> Self {
        Self(format!("{}|{}", identifier.trim().to_lowercase(), origin.trim()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ThrottleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
