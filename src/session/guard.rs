use std::sync::Arc;

use super::{SessionId, SessionStore};
use crate::error::StoreError;

/// One user agent's view of the session store.
///
/// The realm is passed on every call; the guard itself only knows which
/// session it speaks for.
#[derive(Clone)]
pub struct SessionGuard {
    store: Arc<dyn SessionStore>,
    session: SessionId,
}

impl SessionGuard {
    #[must_use]
    pub fn new(store: Arc<dyn SessionStore>, session: SessionId) -> Self {
        Self { store, session }
    }

    #[must_use]
    pub fn session_id(&self) -> &SessionId {
        &self.session
    }

    /// # Errors
    /// Returns `StoreError` if the session store fails.
    pub async fn establish(&self, realm: &str, subject_id: &str) -> Result<(), StoreError> {
        self.store.establish(&self.session, realm, subject_id).await
    }

    /// # Errors
    /// Returns `StoreError` if the session store fails.
    pub async fn is_authenticated(&self, realm: &str) -> Result<bool, StoreError> {
        self.store.is_authenticated(&self.session, realm).await
    }

    /// # Errors
    /// Returns `StoreError` if the session store fails.
    pub async fn subject(&self, realm: &str) -> Result<Option<String>, StoreError> {
        self.store.subject(&self.session, realm).await
    }

    /// # Errors
    /// Returns `StoreError` if the session store fails.
    pub async fn terminate(&self, realm: &str) -> Result<(), StoreError> {
        self.store.terminate(&self.session, realm).await
    }

    /// Re-key the session and point this guard at the new id.
    ///
    /// # Errors
    /// Returns `StoreError` if the session store fails.
    pub async fn rotate(&mut self) -> Result<&SessionId, StoreError> {
        self.session = self.store.rotate(&self.session).await?;
        Ok(&self.session)
    }
}

impl std::fmt::Debug for SessionGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionGuard")
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}
