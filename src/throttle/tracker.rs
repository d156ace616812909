//! Failed-attempt bookkeeping per throttle key.
//!
//! Flow Overview:
//! 1) A failed login calls `record_failure`, which bumps the key's counter and
//!    locks it once the policy threshold is reached.
//! 2) Every login calls `check` before verifying credentials.
//! 3) A successful login calls `clear`.
//!
//! Expiry is lazy: a record whose lockout has passed, or whose counting window
//! ended without a lockout, reads as absent and is replaced by the next failure.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::SystemTime;
use tokio::sync::Mutex;

use super::{LockState, LockoutPolicy, ThrottleKey};
use crate::clock::{Clock, seconds_until};
use crate::error::StoreError;

/// Attempt state stored for one key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttemptRecord {
    pub key: ThrottleKey,
    pub failure_count: u32,
    pub window_started_at: SystemTime,
    pub locked_until: Option<SystemTime>,
}

impl AttemptRecord {
    fn first_failure(key: ThrottleKey, now: SystemTime) -> Self {
        Self {
            key,
            failure_count: 0,
            window_started_at: now,
            locked_until: None,
        }
    }

    /// Whether the record no longer carries any weight at `now`.
    #[must_use]
    pub fn is_expired(&self, policy: &LockoutPolicy, now: SystemTime) -> bool {
        match self.locked_until {
            Some(until) => until <= now,
            None => self.window_started_at + policy.decay_window() <= now,
        }
    }

    #[must_use]
    pub fn lock_state(&self, now: SystemTime) -> LockState {
        match self.locked_until {
            Some(until) if until > now => LockState::Locked {
                remaining_seconds: seconds_until(now, until),
            },
            _ => LockState::Unlocked,
        }
    }
}

#[async_trait]
pub trait AttemptTracker: Send + Sync {
    /// Count one failure for `key` and return the updated record.
    async fn record_failure(&self, key: &ThrottleKey) -> Result<AttemptRecord, StoreError>;

    async fn check(&self, key: &ThrottleKey) -> Result<LockState, StoreError>;

    /// Forget `key`. Clearing an absent key is not an error.
    async fn clear(&self, key: &ThrottleKey) -> Result<(), StoreError>;

    /// Live record for `key`, `None` when absent or expired.
    async fn record(&self, key: &ThrottleKey) -> Result<Option<AttemptRecord>, StoreError>;

    /// Drop expired records, returning how many were removed.
    async fn prune(&self) -> Result<u64, StoreError>;
}

/// Process-local tracker. One mutex guards the map so every operation on a
/// key is a single critical section.
pub struct MemoryAttemptTracker {
    policy: LockoutPolicy,
    clock: Arc<dyn Clock>,
    records: Mutex<HashMap<ThrottleKey, AttemptRecord>>,
}

impl MemoryAttemptTracker {
    #[must_use]
    pub fn new(policy: LockoutPolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            policy,
            clock,
            records: Mutex::new(HashMap::new()),
        }
    }

    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }
}

#[async_trait]
impl AttemptTracker for MemoryAttemptTracker {
    async fn record_failure(&self, key: &ThrottleKey) -> Result<AttemptRecord, StoreError> {
        let now = self.clock.now();
        let mut records = self.records.lock().await;
        let record = records
            .entry(key.clone())
            .or_insert_with(|| AttemptRecord::first_failure(key.clone(), now));
        if record.is_expired(&self.policy, now) {
            *record = AttemptRecord::first_failure(key.clone(), now);
        }

        record.failure_count = record.failure_count.saturating_add(1);
        if self.policy.locks_at(record.failure_count) {
            record.locked_until = Some(self.policy.lock_deadline(now));
        }

        Ok(record.clone())
    }

    async fn check(&self, key: &ThrottleKey) -> Result<LockState, StoreError> {
        let now = self.clock.now();
        let records = self.records.lock().await;
        Ok(records
            .get(key)
            .map_or(LockState::Unlocked, |record| record.lock_state(now)))
    }

    async fn clear(&self, key: &ThrottleKey) -> Result<(), StoreError> {
        self.records.lock().await.remove(key);
        Ok(())
    }

    async fn record(&self, key: &ThrottleKey) -> Result<Option<AttemptRecord>, StoreError> {
        let now = self.clock.now();
        let records = self.records.lock().await;
        Ok(records
            .get(key)
            .filter(|record| !record.is_expired(&self.policy, now))
            .cloned())
    }

    async fn prune(&self) -> Result<u64, StoreError> {
        let now = self.clock.now();
        let mut records = self.records.lock().await;
        let before = records.len();
        records.retain(|_, record| !record.is_expired(&self.policy, now));
        Ok(u64::try_from(before - records.len()).unwrap_or(u64::MAX))
    }
}
