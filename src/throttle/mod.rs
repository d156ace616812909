//! Brute-force throttling: key derivation, lockout policy and attempt trackers.

mod key;
mod policy;
mod postgres;
mod tracker;

pub use self::key::ThrottleKey;
pub use self::policy::{
    Decision, LockState, LockoutPolicy, DEFAULT_DECAY_WINDOW_SECONDS, DEFAULT_MAX_ATTEMPTS,
};
pub use self::postgres::PgAttemptTracker;
pub use self::tracker::{AttemptRecord, AttemptTracker, MemoryAttemptTracker};
