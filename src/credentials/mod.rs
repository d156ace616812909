//! Credential verification.

mod file;
pub mod hash;
mod postgres;

pub use self::file::FileCredentialStore;
pub use self::postgres::PgCredentialStore;

use async_trait::async_trait;
use secrecy::SecretString;

/// Result of checking an identifier and secret.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VerifyResult {
    /// Carries the subject id of the authenticated principal.
    Success(String),
    Failure,
    StoreUnavailable,
}

#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn verify(&self, identifier: &str, secret: &SecretString) -> VerifyResult;
}

/// Normalize an identifier for lookup and subject ids.
#[must_use]
pub fn normalize_identifier(identifier: &str) -> String {
    identifier.trim().to_lowercase()
}
