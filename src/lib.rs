//! # Bastion (Throttled Admin Login Gate)
//!
//! `bastion` authenticates privileged users for a single administrative realm
//! (for example `backend`) and keeps that realm's session apart from any other
//! realm served by the same application.
//!
//! ## Brute-force Throttling
//!
//! Failed logins are counted per **throttle key**, which is the normalized
//! identifier joined with the caller origin (`alice@example.com|203.0.113.5`).
//!
//! - **Attempt Limit:** the `max_attempts`-th failure inside the decay window locks the key.
//! - **Lockout:** a locked key is rejected for `decay_window` seconds without
//!   touching the credential store.
//! - **Reset:** a successful login deletes the record for its key.
//!
//! ## Composition
//!
//! [`gate::AuthenticationGate`] is built from an [`throttle::AttemptTracker`], a
//! [`throttle::LockoutPolicy`] and a [`credentials::CredentialStore`]. Sessions go
//! through a [`session::SessionGuard`], which takes the realm as an explicit
//! argument on every call. Every attempt ends in a [`gate::LoginOutcome`] value.
//! The HTTP layer in [`api`] maps that value to a response.

pub mod api;
pub mod cli;
pub mod clock;
pub mod credentials;
pub mod db;
pub mod error;
pub mod gate;
pub mod session;
pub mod throttle;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
    }

    #[test]
    fn test_app_user_agent_format() {
        assert!(APP_USER_AGENT.starts_with(env!("CARGO_PKG_NAME")));
        assert!(APP_USER_AGENT.contains(env!("CARGO_PKG_VERSION")));
    }
}
