//! Attempt tracker backed by the `login_attempts` table.
//!
//! Every node behind a load balancer sees the same counters. A failure is a
//! single upsert, so concurrent failures on one key serialize on the row lock.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

use super::{AttemptRecord, AttemptTracker, LockState, LockoutPolicy, ThrottleKey};
use crate::clock::{from_unix_seconds, unix_seconds, Clock};
use crate::error::StoreError;

type Row = (i32, i64, Option<i64>);

// $1 key, $2 now, $3 max attempts, $4 decay window seconds.
// Inside DO UPDATE, `login_attempts.*` is the row before the update.
const RECORD_FAILURE: &str = r"
    INSERT INTO login_attempts AS la (throttle_key, failure_count, window_started_at, locked_until)
    VALUES ($1, 1, $2, CASE WHEN 1 >= $3 THEN $2 + $4 ELSE NULL END)
    ON CONFLICT (throttle_key) DO UPDATE SET
        failure_count = CASE
            WHEN (la.locked_until IS NOT NULL AND la.locked_until <= $2)
              OR (la.locked_until IS NULL AND la.window_started_at + $4 <= $2) THEN 1
            ELSE la.failure_count + 1
        END,
        window_started_at = CASE
            WHEN (la.locked_until IS NOT NULL AND la.locked_until <= $2)
              OR (la.locked_until IS NULL AND la.window_started_at + $4 <= $2) THEN $2
            ELSE la.window_started_at
        END,
        locked_until = CASE
            WHEN (la.locked_until IS NOT NULL AND la.locked_until <= $2)
              OR (la.locked_until IS NULL AND la.window_started_at + $4 <= $2)
                THEN CASE WHEN 1 >= $3 THEN $2 + $4 ELSE NULL END
            WHEN la.failure_count + 1 >= $3 THEN $2 + $4
            ELSE la.locked_until
        END
    RETURNING failure_count, window_started_at, locked_until
";

const SELECT_RECORD: &str = r"
    SELECT failure_count, window_started_at, locked_until
    FROM login_attempts
    WHERE throttle_key = $1
";

// $1 now, $2 decay window seconds.
const PRUNE_EXPIRED: &str = r"
    DELETE FROM login_attempts
    WHERE (locked_until IS NOT NULL AND locked_until <= $1)
       OR (locked_until IS NULL AND window_started_at + $2 <= $1)
";

pub struct PgAttemptTracker {
    pool: PgPool,
    policy: LockoutPolicy,
    clock: Arc<dyn Clock>,
}

impl PgAttemptTracker {
    #[must_use]
    pub fn new(pool: PgPool, policy: LockoutPolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            pool,
            policy,
            clock,
        }
    }

    fn max_attempts(&self) -> i32 {
        i32::try_from(self.policy.max_attempts()).unwrap_or(i32::MAX)
    }

    fn decay_seconds(&self) -> i64 {
        i64::try_from(self.policy.decay_window().as_secs()).unwrap_or(i64::MAX)
    }

    async fn fetch(&self, key: &ThrottleKey) -> Result<Option<AttemptRecord>, StoreError> {
        let row: Option<Row> = sqlx::query_as(SELECT_RECORD)
            .bind(key.as_str())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|row| to_record(key, row)))
    }
}

fn to_record(key: &ThrottleKey, (failure_count, window_started_at, locked_until): Row) -> AttemptRecord {
    AttemptRecord {
        key: key.clone(),
        failure_count: u32::try_from(failure_count).unwrap_or(0),
        window_started_at: from_unix_seconds(window_started_at),
        locked_until: locked_until.map(from_unix_seconds),
    }
}

#[async_trait]
impl AttemptTracker for PgAttemptTracker {
    async fn record_failure(&self, key: &ThrottleKey) -> Result<AttemptRecord, StoreError> {
        let now = unix_seconds(self.clock.now());
        let row: Row = sqlx::query_as(RECORD_FAILURE)
            .bind(key.as_str())
            .bind(now)
            .bind(self.max_attempts())
            .bind(self.decay_seconds())
            .fetch_one(&self.pool)
            .await?;
        Ok(to_record(key, row))
    }

    async fn check(&self, key: &ThrottleKey) -> Result<LockState, StoreError> {
        let now = self.clock.now();
        Ok(self
            .fetch(key)
            .await?
            .map_or(LockState::Unlocked, |record| record.lock_state(now)))
    }

    async fn clear(&self, key: &ThrottleKey) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM login_attempts WHERE throttle_key = $1")
            .bind(key.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn record(&self, key: &ThrottleKey) -> Result<Option<AttemptRecord>, StoreError> {
        let now = self.clock.now();
        Ok(self
            .fetch(key)
            .await?
            .filter(|record| !record.is_expired(&self.policy, now)))
    }

    async fn prune(&self) -> Result<u64, StoreError> {
        let now = unix_seconds(self.clock.now());
        let result = sqlx::query(PRUNE_EXPIRED)
            .bind(now)
            .bind(self.decay_seconds())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
