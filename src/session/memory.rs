use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::sync::Mutex;

use super::{SessionId, SessionStore};
use crate::clock::Clock;
use crate::error::StoreError;

pub const DEFAULT_SESSION_TTL_SECONDS: u64 = 2 * 60 * 60;

#[derive(Clone, Debug)]
struct Identity {
    subject_id: String,
    established_at: SystemTime,
}

type Realms = HashMap<String, Identity>;

/// Process-local session store. Identities expire `ttl` after they were
/// established; expired entries read as absent until pruned.
pub struct MemorySessionStore {
    ttl: Duration,
    clock: Arc<dyn Clock>,
    sessions: Mutex<HashMap<SessionId, Realms>>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl,
            clock,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    fn is_live(&self, identity: &Identity, now: SystemTime) -> bool {
        identity.established_at + self.ttl > now
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn establish(
        &self,
        session: &SessionId,
        realm: &str,
        subject_id: &str,
    ) -> Result<(), StoreError> {
        let identity = Identity {
            subject_id: subject_id.to_string(),
            established_at: self.clock.now(),
        };
        self.sessions
            .lock()
            .await
            .entry(session.clone())
            .or_default()
            .insert(realm.to_string(), identity);
        Ok(())
    }

    async fn subject(
        &self,
        session: &SessionId,
        realm: &str,
    ) -> Result<Option<String>, StoreError> {
        let now = self.clock.now();
        let sessions = self.sessions.lock().await;
        Ok(sessions
            .get(session)
            .and_then(|realms| realms.get(realm))
            .filter(|identity| self.is_live(identity, now))
            .map(|identity| identity.subject_id.clone()))
    }

    async fn terminate(&self, session: &SessionId, realm: &str) -> Result<(), StoreError> {
        let mut sessions = self.sessions.lock().await;
        if let Some(realms) = sessions.get_mut(session) {
            realms.remove(realm);
            if realms.is_empty() {
                sessions.remove(session);
            }
        }
        Ok(())
    }

    async fn rotate(&self, session: &SessionId) -> Result<SessionId, StoreError> {
        let fresh = SessionId::generate()?;
        let mut sessions = self.sessions.lock().await;
        if let Some(realms) = sessions.remove(session) {
            sessions.insert(fresh.clone(), realms);
        }
        Ok(fresh)
    }

    async fn prune(&self) -> Result<u64, StoreError> {
        let now = self.clock.now();
        let mut sessions = self.sessions.lock().await;
        let mut removed: u64 = 0;
        sessions.retain(|_, realms| {
            let before = realms.len();
            realms.retain(|_, identity| self.is_live(identity, now));
            removed += u64::try_from(before - realms.len()).unwrap_or(0);
            !realms.is_empty()
        });
        Ok(removed)
    }
}
