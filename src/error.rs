//! Error types shared by the stores and configuration.

/// Failure of a backing store (attempt tracker or session store).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        Self::Unavailable(err.to_string())
    }
}

/// Rejected gate configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("max attempts must be at least 1")]
    ZeroMaxAttempts,
    #[error("decay window must be at least 1 second")]
    ZeroDecayWindow,
    #[error("invalid realm name: {0:?} (expected [a-z0-9][a-z0-9_-]*)")]
    InvalidRealm(String),
}
