//! Realm-scoped session identities.
//!
//! A user agent holds one [`SessionId`] (the `bastion_session` cookie). The
//! store keeps one identity per `(SessionId, realm)` pair, so logging into or out
//! of one realm never changes another realm of the same browser.

mod guard;
mod memory;

pub use self::guard::SessionGuard;
pub use self::memory::{MemorySessionStore, DEFAULT_SESSION_TTL_SECONDS};

use async_trait::async_trait;
use base64ct::{Base64UrlUnpadded, Encoding};
use rand::{rngs::OsRng, RngCore};
use std::fmt;

use crate::error::StoreError;

const SESSION_ID_BYTES: usize = 32;

/// Opaque per-user-agent session handle.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    /// Fresh random id: 32 bytes from the OS RNG, base64url without padding.
    ///
    /// # Errors
    /// Returns `StoreError` if the OS RNG fails.
    pub fn generate() -> Result<Self, StoreError> {
        let mut bytes = [0u8; SESSION_ID_BYTES];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|err| StoreError::Unavailable(format!("failed to generate session id: {err}")))?;
        Ok(Self(Base64UrlUnpadded::encode_string(&bytes)))
    }

    /// Accept a client-supplied id only if it has the shape of a generated one.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let decoded = Base64UrlUnpadded::decode_vec(value).ok()?;
        (decoded.len() == SESSION_ID_BYTES).then(|| Self(value.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Ids are bearer credentials; keep them out of logs.
impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionId(..)")
    }
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Create or overwrite the identity of `realm` for `session`.
    async fn establish(
        &self,
        session: &SessionId,
        realm: &str,
        subject_id: &str,
    ) -> Result<(), StoreError>;

    async fn subject(&self, session: &SessionId, realm: &str)
        -> Result<Option<String>, StoreError>;

    async fn is_authenticated(&self, session: &SessionId, realm: &str) -> Result<bool, StoreError> {
        Ok(self.subject(session, realm).await?.is_some())
    }

    /// Remove the identity of `realm`. Idempotent.
    async fn terminate(&self, session: &SessionId, realm: &str) -> Result<(), StoreError>;

    /// Move every realm identity of `session` to a fresh id and return it.
    async fn rotate(&self, session: &SessionId) -> Result<SessionId, StoreError>;

    /// Drop expired identities, returning how many were removed.
    async fn prune(&self) -> Result<u64, StoreError>;
}
