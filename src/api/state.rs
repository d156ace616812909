use axum::http::HeaderMap;
use sqlx::PgPool;
use std::sync::Arc;

use super::handlers::cookies::session_from_headers;
use crate::error::StoreError;
use crate::gate::{AuthenticationGate, Realm};
use crate::session::{SessionGuard, SessionId, SessionStore, DEFAULT_SESSION_TTL_SECONDS};

/// HTTP settings that do not affect the login state machine.
#[derive(Clone, Debug)]
pub struct HttpConfig {
    session_ttl_seconds: u64,
    secure_cookie: bool,
    trust_proxy_headers: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
            secure_cookie: false,
            trust_proxy_headers: false,
        }
    }
}

impl HttpConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_session_ttl_seconds(mut self, seconds: u64) -> Self {
        self.session_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_secure_cookie(mut self, secure: bool) -> Self {
        self.secure_cookie = secure;
        self
    }

    #[must_use]
    pub fn with_trust_proxy_headers(mut self, trust: bool) -> Self {
        self.trust_proxy_headers = trust;
        self
    }

    #[must_use]
    pub fn session_ttl_seconds(&self) -> u64 {
        self.session_ttl_seconds
    }

    #[must_use]
    pub fn secure_cookie(&self) -> bool {
        self.secure_cookie
    }

    #[must_use]
    pub fn trust_proxy_headers(&self) -> bool {
        self.trust_proxy_headers
    }
}

/// Shared state handed to every handler through an `Extension`.
pub struct AppState {
    gate: AuthenticationGate,
    sessions: Arc<dyn SessionStore>,
    config: HttpConfig,
    pool: Option<PgPool>,
}

impl AppState {
    #[must_use]
    pub fn new(gate: AuthenticationGate, sessions: Arc<dyn SessionStore>, config: HttpConfig) -> Self {
        Self {
            gate,
            sessions,
            config,
            pool: None,
        }
    }

    /// Attach the database pool so `/health` can ping it.
    #[must_use]
    pub fn with_pool(mut self, pool: PgPool) -> Self {
        self.pool = Some(pool);
        self
    }

    #[must_use]
    pub fn gate(&self) -> &AuthenticationGate {
        &self.gate
    }

    #[must_use]
    pub fn realm(&self) -> &Realm {
        self.gate.realm()
    }

    #[must_use]
    pub fn sessions(&self) -> &Arc<dyn SessionStore> {
        &self.sessions
    }

    #[must_use]
    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    #[must_use]
    pub fn pool(&self) -> Option<&PgPool> {
        self.pool.as_ref()
    }

    /// Guard for the session named by the request cookie, if any.
    #[must_use]
    pub fn existing_session(&self, headers: &HeaderMap) -> Option<SessionGuard> {
        session_from_headers(headers).map(|id| SessionGuard::new(self.sessions.clone(), id))
    }

    /// Guard for the request's session, starting a new one when there is none.
    ///
    /// # Errors
    /// Returns `StoreError` if a new session id cannot be generated.
    pub fn session_or_new(&self, headers: &HeaderMap) -> Result<SessionGuard, StoreError> {
        match self.existing_session(headers) {
            Some(guard) => Ok(guard),
            None => Ok(SessionGuard::new(self.sessions.clone(), SessionId::generate()?)),
        }
    }
}
