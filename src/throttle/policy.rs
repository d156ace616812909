//! Lockout decisions.
//!
//! The tracker asks the policy when to lock; the gate asks it whether an
//! attempt may proceed.

use std::time::{Duration, SystemTime};

use crate::error::ConfigError;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_DECAY_WINDOW_SECONDS: u64 = 5 * 60;

/// Lock status of a throttle key at a point in time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LockState {
    Unlocked,
    Locked { remaining_seconds: u64 },
}

/// What the gate should do with an attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    Proceed,
    Reject { remaining_seconds: u64 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LockoutPolicy {
    max_attempts: u32,
    decay_window: Duration,
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            decay_window: Duration::from_secs(DEFAULT_DECAY_WINDOW_SECONDS),
        }
    }
}

impl LockoutPolicy {
    /// Build a policy.
    ///
    /// # Errors
    /// Returns `ConfigError` if either value is zero.
    pub fn new(max_attempts: u32, decay_window_seconds: u64) -> Result<Self, ConfigError> {
        if max_attempts == 0 {
            return Err(ConfigError::ZeroMaxAttempts);
        }
        if decay_window_seconds == 0 {
            return Err(ConfigError::ZeroDecayWindow);
        }
        Ok(Self {
            max_attempts,
            decay_window: Duration::from_secs(decay_window_seconds),
        })
    }

    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    #[must_use]
    pub fn decay_window(&self) -> Duration {
        self.decay_window
    }

    /// Reject while a lockout has time left; proceed otherwise.
    #[must_use]
    pub fn decide(&self, state: LockState) -> Decision {
        match state {
            LockState::Locked { remaining_seconds } if remaining_seconds > 0 => {
                Decision::Reject { remaining_seconds }
            }
            _ => Decision::Proceed,
        }
    }

    /// The `max_attempts`-th failure locks, not the one after it.
    #[must_use]
    pub fn locks_at(&self, failure_count: u32) -> bool {
        failure_count >= self.max_attempts
    }

    #[must_use]
    pub fn lock_deadline(&self, now: SystemTime) -> SystemTime {
        now + self.decay_window
    }

    /// Failures remaining before the key locks.
    #[must_use]
    pub fn attempts_left(&self, failure_count: u32) -> u32 {
        self.max_attempts.saturating_sub(failure_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::UNIX_EPOCH;

    #[test]
    fn defaults_match_three_attempts_five_minutes() {
        let policy = LockoutPolicy::default();
        assert_eq!(policy.max_attempts(), 3);
        assert_eq!(policy.decay_window(), Duration::from_secs(300));
    }

    #[test]
    fn new_rejects_zero_values() {
        assert_eq!(LockoutPolicy::new(0, 300), Err(ConfigError::ZeroMaxAttempts));
        assert_eq!(LockoutPolicy::new(3, 0), Err(ConfigError::ZeroDecayWindow));
        assert!(LockoutPolicy::new(1, 1).is_ok());
    }

    #[test]
    fn locks_exactly_at_threshold() {
        let policy = LockoutPolicy::default();
        assert!(!policy.locks_at(0));
        assert!(!policy.locks_at(2));
        assert!(policy.locks_at(3));
        assert!(policy.locks_at(10));
    }

    #[test]
    fn decide_rejects_only_live_lockouts() {
        let policy = LockoutPolicy::default();
        assert_eq!(policy.decide(LockState::Unlocked), Decision::Proceed);
        assert_eq!(
            policy.decide(LockState::Locked {
                remaining_seconds: 0
            }),
            Decision::Proceed
        );
        assert_eq!(
            policy.decide(LockState::Locked {
                remaining_seconds: 42
            }),
            Decision::Reject {
                remaining_seconds: 42
            }
        );
    }

    #[test]
    fn lock_deadline_adds_decay_window() {
        let policy = LockoutPolicy::new(3, 90).unwrap_or_default();
        let now = UNIX_EPOCH + Duration::from_secs(1_000);
        assert_eq!(
            policy.lock_deadline(now),
            UNIX_EPOCH + Duration::from_secs(1_090)
        );
    }

    #[test]
    fn attempts_left_saturates() {
        let policy = LockoutPolicy::default();
        assert_eq!(policy.attempts_left(1), 2);
        assert_eq!(policy.attempts_left(7), 0);
    }
}
