//! Login attempt state machine.
//!
//! Flow Overview:
//! 1) Reject blank input without touching the tracker.
//! 2) Derive the throttle key and ask the tracker whether it is locked.
//! 3) Locked keys are rejected before the credential store is consulted.
//! 4) Verify credentials. Success establishes the realm session, then clears
//!    the key; failure counts against the key.
//!
//! Security boundary:
//! - The tracker is fail-closed: if its state cannot be read, no credential
//!   check runs.
//! - The identifier and secret never reach logs or span fields.

mod outcome;
mod realm;
pub mod validation;

#[cfg(test)]
mod tests;

pub use self::outcome::{throttle_message, FieldErrors, LoginOutcome, FAILED_MESSAGE};
pub use self::realm::{Realm, DEFAULT_REALM};

use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use tracing::{debug, error, instrument, warn};

use crate::credentials::{CredentialStore, VerifyResult};
use crate::session::SessionGuard;
use crate::throttle::{AttemptTracker, Decision, LockoutPolicy, ThrottleKey};

pub struct AuthenticationGate {
    realm: Realm,
    policy: LockoutPolicy,
    tracker: Arc<dyn AttemptTracker>,
    credentials: Arc<dyn CredentialStore>,
}

impl AuthenticationGate {
    #[must_use]
    pub fn new(
        realm: Realm,
        policy: LockoutPolicy,
        tracker: Arc<dyn AttemptTracker>,
        credentials: Arc<dyn CredentialStore>,
    ) -> Self {
        Self {
            realm,
            policy,
            tracker,
            credentials,
        }
    }

    #[must_use]
    pub fn realm(&self) -> &Realm {
        &self.realm
    }

    #[must_use]
    pub fn tracker(&self) -> &Arc<dyn AttemptTracker> {
        &self.tracker
    }

    /// Run one login attempt for `identifier` coming from `origin`.
    #[instrument(skip_all, fields(realm = %self.realm, origin = %origin))]
    pub async fn attempt_login(
        &self,
        session: &SessionGuard,
        identifier: &str,
        secret: &SecretString,
        origin: &str,
    ) -> LoginOutcome {
        if let Err(errors) =
            validation::require_fields(Some(identifier), Some(secret.expose_secret()))
        {
            return LoginOutcome::InvalidInput(errors);
        }

        let key = ThrottleKey::derive(identifier, origin);

        let state = match self.tracker.check(&key).await {
            Ok(state) => state,
            Err(err) => {
                error!("Failed to read login attempts: {err}");
                return LoginOutcome::TransientFailure;
            }
        };
        if let Decision::Reject { remaining_seconds } = self.policy.decide(state) {
            debug!(remaining_seconds, "Rejected attempt on locked key");
            return LoginOutcome::LockedOut { remaining_seconds };
        }

        match self.credentials.verify(identifier, secret).await {
            VerifyResult::Success(subject_id) => {
                if let Err(err) = session.establish(self.realm.as_str(), &subject_id).await {
                    error!("Failed to establish session: {err}");
                    return LoginOutcome::TransientFailure;
                }
                if let Err(err) = self.tracker.clear(&key).await {
                    error!("Failed to clear login attempts: {err}");
                }
                debug!("Login succeeded");
                LoginOutcome::Authenticated(subject_id)
            }
            VerifyResult::Failure => {
                match self.tracker.record_failure(&key).await {
                    Ok(record) => {
                        debug!(
                            failure_count = record.failure_count,
                            attempts_left = self.policy.attempts_left(record.failure_count),
                            "Login failed"
                        );
                        if record.failure_count == self.policy.max_attempts() {
                            warn!(
                                target: "bastion::lockout",
                                realm = %self.realm,
                                origin,
                                lockout_seconds = self.policy.decay_window().as_secs(),
                                "Too many failed logins, locking out"
                            );
                        }
                    }
                    Err(err) => error!("Failed to record login failure: {err}"),
                }
                LoginOutcome::InvalidCredentials
            }
            VerifyResult::StoreUnavailable => LoginOutcome::TransientFailure,
        }
    }
}
