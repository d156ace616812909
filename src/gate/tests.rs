use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::*;
use crate::clock::ManualClock;
use crate::error::StoreError;
use crate::session::{MemorySessionStore, SessionId, SessionStore};
use crate::throttle::{AttemptRecord, LockState, MemoryAttemptTracker};

const ORIGIN: &str = "203.0.113.5";
const ALICE: &str = "alice@example.com";
const PASSWORD: &str = "correct horse battery staple";

/// Accepts one account and counts every call.
struct CountingCredentials {
    calls: AtomicUsize,
    scripted: Mutex<VecDeque<VerifyResult>>,
}

impl CountingCredentials {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            scripted: Mutex::new(VecDeque::new()),
        }
    }

    /// Results returned before falling back to the real check, one per call.
    fn with_script(results: impl IntoIterator<Item = VerifyResult>) -> Self {
        let credentials = Self::new();
        if let Ok(mut scripted) = credentials.scripted.lock() {
            scripted.extend(results);
        }
        credentials
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CredentialStore for CountingCredentials {
    async fn verify(&self, identifier: &str, secret: &SecretString) -> VerifyResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(result) = self.scripted.lock().ok().and_then(|mut s| s.pop_front()) {
            return result;
        }
        if identifier.trim().eq_ignore_ascii_case(ALICE) && secret.expose_secret() == PASSWORD {
            VerifyResult::Success(ALICE.to_string())
        } else {
            VerifyResult::Failure
        }
    }
}

/// Tracker whose every operation fails.
struct BrokenTracker;

#[async_trait]
impl AttemptTracker for BrokenTracker {
    async fn record_failure(&self, _key: &ThrottleKey) -> Result<AttemptRecord, StoreError> {
        Err(StoreError::Unavailable("down".to_string()))
    }

    async fn check(&self, _key: &ThrottleKey) -> Result<LockState, StoreError> {
        Err(StoreError::Unavailable("down".to_string()))
    }

    async fn clear(&self, _key: &ThrottleKey) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("down".to_string()))
    }

    async fn record(&self, _key: &ThrottleKey) -> Result<Option<AttemptRecord>, StoreError> {
        Err(StoreError::Unavailable("down".to_string()))
    }

    async fn prune(&self) -> Result<u64, StoreError> {
        Err(StoreError::Unavailable("down".to_string()))
    }
}

/// Session store that refuses to establish identities.
struct BrokenSessions;

#[async_trait]
impl SessionStore for BrokenSessions {
    async fn establish(&self, _: &SessionId, _: &str, _: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("down".to_string()))
    }

    async fn subject(&self, _: &SessionId, _: &str) -> Result<Option<String>, StoreError> {
        Ok(None)
    }

    async fn terminate(&self, _: &SessionId, _: &str) -> Result<(), StoreError> {
        Ok(())
    }

    async fn rotate(&self, session: &SessionId) -> Result<SessionId, StoreError> {
        Ok(session.clone())
    }

    async fn prune(&self) -> Result<u64, StoreError> {
        Ok(0)
    }
}

struct Harness {
    gate: AuthenticationGate,
    tracker: Arc<MemoryAttemptTracker>,
    credentials: Arc<CountingCredentials>,
    clock: ManualClock,
    session: SessionGuard,
}

impl Harness {
    fn new(credentials: CountingCredentials) -> Result<Self, StoreError> {
        let clock = ManualClock::at_unix(1_700_000_000);
        let policy = LockoutPolicy::new(3, 300).unwrap_or_default();
        let tracker = Arc::new(MemoryAttemptTracker::new(policy, Arc::new(clock.clone())));
        let credentials = Arc::new(credentials);
        let gate = AuthenticationGate::new(
            Realm::default(),
            policy,
            tracker.clone(),
            credentials.clone(),
        );
        let sessions = Arc::new(MemorySessionStore::new(
            Duration::from_secs(7200),
            Arc::new(clock.clone()),
        ));
        let session = SessionGuard::new(sessions, SessionId::generate()?);
        Ok(Self {
            gate,
            tracker,
            credentials,
            clock,
            session,
        })
    }

    async fn login(&self, password: &str) -> LoginOutcome {
        self.gate
            .attempt_login(&self.session, ALICE, &SecretString::from(password), ORIGIN)
            .await
    }

    async fn failure_count(&self) -> Result<u32, StoreError> {
        let key = ThrottleKey::derive(ALICE, ORIGIN);
        Ok(self
            .tracker
            .record(&key)
            .await?
            .map_or(0, |record| record.failure_count))
    }
}

#[tokio::test]
async fn three_failures_lock_then_window_expiry_unlocks() -> Result<(), StoreError> {
    let harness = Harness::new(CountingCredentials::new())?;

    for _ in 0..3 {
        assert_eq!(harness.login("wrong").await, LoginOutcome::InvalidCredentials);
    }
    assert_eq!(
        harness.login(PASSWORD).await,
        LoginOutcome::LockedOut {
            remaining_seconds: 300
        }
    );

    harness.clock.advance(Duration::from_secs(300));
    assert_eq!(
        harness.login(PASSWORD).await,
        LoginOutcome::Authenticated(ALICE.to_string())
    );
    assert!(harness.session.is_authenticated("backend").await?);
    Ok(())
}

#[tokio::test]
async fn locked_key_never_reaches_credential_store() -> Result<(), StoreError> {
    let harness = Harness::new(CountingCredentials::new())?;
    for _ in 0..3 {
        harness.login("wrong").await;
    }
    assert_eq!(harness.credentials.calls(), 3);

    for _ in 0..5 {
        assert!(matches!(
            harness.login(PASSWORD).await,
            LoginOutcome::LockedOut { .. }
        ));
    }
    assert_eq!(harness.credentials.calls(), 3);
    assert!(!harness.session.is_authenticated("backend").await?);
    Ok(())
}

#[tokio::test]
async fn first_try_success_leaves_no_record() -> Result<(), StoreError> {
    let harness = Harness::new(CountingCredentials::new())?;
    assert_eq!(
        harness.login(PASSWORD).await,
        LoginOutcome::Authenticated(ALICE.to_string())
    );
    assert_eq!(harness.tracker.record(&ThrottleKey::derive(ALICE, ORIGIN)).await?, None);
    assert_eq!(
        harness.session.subject("backend").await?.as_deref(),
        Some(ALICE)
    );
    Ok(())
}

#[tokio::test]
async fn success_resets_earlier_failures() -> Result<(), StoreError> {
    let harness = Harness::new(CountingCredentials::new())?;
    harness.login("wrong").await;
    harness.login("wrong").await;
    assert_eq!(harness.failure_count().await?, 2);

    assert!(matches!(
        harness.login(PASSWORD).await,
        LoginOutcome::Authenticated(_)
    ));
    assert_eq!(harness.failure_count().await?, 0);

    harness.login("wrong").await;
    assert_eq!(harness.failure_count().await?, 1);
    Ok(())
}

#[tokio::test]
async fn unavailable_store_is_not_counted() -> Result<(), StoreError> {
    let harness = Harness::new(CountingCredentials::with_script([
        VerifyResult::Failure,
        VerifyResult::StoreUnavailable,
    ]))?;

    assert_eq!(harness.login("wrong").await, LoginOutcome::InvalidCredentials);
    assert_eq!(harness.login(PASSWORD).await, LoginOutcome::TransientFailure);
    assert_eq!(harness.failure_count().await?, 1);
    Ok(())
}

#[tokio::test]
async fn blank_input_is_rejected_without_counting() -> Result<(), StoreError> {
    let harness = Harness::new(CountingCredentials::new())?;
    let outcome = harness
        .gate
        .attempt_login(&harness.session, "  ", &SecretString::from(""), ORIGIN)
        .await;

    let LoginOutcome::InvalidInput(errors) = outcome else {
        panic!("expected InvalidInput, got {outcome:?}");
    };
    assert_eq!(errors.fields().collect::<Vec<_>>(), ["email", "password"]);
    assert_eq!(harness.credentials.calls(), 0);
    assert!(harness.tracker.is_empty().await);
    Ok(())
}

#[tokio::test]
async fn identifier_case_shares_one_counter() -> Result<(), StoreError> {
    let harness = Harness::new(CountingCredentials::new())?;
    for identifier in ["alice@example.com", "ALICE@example.com", " Alice@Example.com "] {
        harness
            .gate
            .attempt_login(&harness.session, identifier, &SecretString::from("x"), ORIGIN)
            .await;
    }
    assert_eq!(
        harness.login(PASSWORD).await,
        LoginOutcome::LockedOut {
            remaining_seconds: 300
        }
    );
    Ok(())
}

#[tokio::test]
async fn other_origin_is_not_locked() -> Result<(), StoreError> {
    let harness = Harness::new(CountingCredentials::new())?;
    for _ in 0..3 {
        harness.login("wrong").await;
    }
    let outcome = harness
        .gate
        .attempt_login(
            &harness.session,
            ALICE,
            &SecretString::from(PASSWORD),
            "198.51.100.7",
        )
        .await;
    assert_eq!(outcome, LoginOutcome::Authenticated(ALICE.to_string()));
    Ok(())
}

#[tokio::test]
async fn unreadable_tracker_fails_closed() -> Result<(), StoreError> {
    let credentials = Arc::new(CountingCredentials::new());
    let gate = AuthenticationGate::new(
        Realm::default(),
        LockoutPolicy::default(),
        Arc::new(BrokenTracker),
        credentials.clone(),
    );
    let sessions = Arc::new(MemorySessionStore::new(
        Duration::from_secs(60),
        Arc::new(ManualClock::at_unix(0)),
    ));
    let session = SessionGuard::new(sessions, SessionId::generate()?);

    let outcome = gate
        .attempt_login(&session, ALICE, &SecretString::from(PASSWORD), ORIGIN)
        .await;
    assert_eq!(outcome, LoginOutcome::TransientFailure);
    assert_eq!(credentials.calls(), 0);
    Ok(())
}

#[tokio::test]
async fn session_failure_is_transient() -> Result<(), StoreError> {
    let harness = Harness::new(CountingCredentials::new())?;
    let broken = SessionGuard::new(Arc::new(BrokenSessions), SessionId::generate()?);

    let outcome = harness
        .gate
        .attempt_login(&broken, ALICE, &SecretString::from(PASSWORD), ORIGIN)
        .await;
    assert_eq!(outcome, LoginOutcome::TransientFailure);
    Ok(())
}

#[tokio::test]
async fn session_failure_keeps_earlier_failures() -> Result<(), StoreError> {
    let harness = Harness::new(CountingCredentials::new())?;
    harness.login("wrong").await;
    harness.login("wrong").await;

    let broken = SessionGuard::new(Arc::new(BrokenSessions), SessionId::generate()?);
    let outcome = harness
        .gate
        .attempt_login(&broken, ALICE, &SecretString::from(PASSWORD), ORIGIN)
        .await;
    assert_eq!(outcome, LoginOutcome::TransientFailure);
    assert_eq!(harness.failure_count().await?, 2);
    Ok(())
}

#[tokio::test]
async fn login_in_one_realm_leaves_other_realm_anonymous() -> Result<(), StoreError> {
    let harness = Harness::new(CountingCredentials::new())?;
    harness.login(PASSWORD).await;
    assert!(harness.session.is_authenticated("backend").await?);
    assert!(!harness.session.is_authenticated("web").await?);
    Ok(())
}
