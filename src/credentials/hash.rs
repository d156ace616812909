//! Argon2 password hashing.

use argon2::{
    password_hash::{rand_core::OsRng, SaltString},
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};
use once_cell::sync::Lazy;
use secrecy::{ExposeSecret, SecretString};
use tokio::task::JoinError;
use tracing::error;

// Verified against when the identifier is unknown, so a miss costs as much as a
// wrong password.
static DUMMY_HASH: Lazy<Option<String>> =
    Lazy::new(|| hash_password("bastion-dummy-password").ok());

/// Hash `password` into an Argon2id PHC string with a random salt.
///
/// # Errors
/// Returns an error if hashing fails.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

/// Check `secret` against a stored PHC string on the blocking pool.
///
/// `None` runs a verification against a dummy hash and returns `false`. A
/// malformed stored hash is logged and treated as a mismatch.
///
/// # Errors
/// Returns `JoinError` if the blocking task panics or is cancelled.
pub async fn verify_password(
    secret: SecretString,
    stored: Option<String>,
) -> Result<bool, JoinError> {
    tokio::task::spawn_blocking(move || {
        let known = stored.is_some();
        let Some(phc) = stored.or_else(|| DUMMY_HASH.clone()) else {
            return false;
        };
        let parsed = match PasswordHash::new(&phc) {
            Ok(parsed) => parsed,
            Err(err) => {
                error!("Stored password hash is not a valid PHC string: {err}");
                return false;
            }
        };
        let matches = Argon2::default()
            .verify_password(secret.expose_secret().as_bytes(), &parsed)
            .is_ok();
        known && matches
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn verifies_matching_password_only() -> Result<(), Box<dyn std::error::Error>> {
        let phc = hash_password("correct horse")?;
        assert!(phc.starts_with("$argon2id$"));
        assert!(verify_password(SecretString::from("correct horse"), Some(phc.clone())).await?);
        assert!(!verify_password(SecretString::from("wrong"), Some(phc)).await?);
        Ok(())
    }

    #[tokio::test]
    async fn unknown_account_never_matches() -> Result<(), Box<dyn std::error::Error>> {
        assert!(!verify_password(SecretString::from("bastion-dummy-password"), None).await?);
        Ok(())
    }

    #[tokio::test]
    async fn malformed_hash_is_a_mismatch() -> Result<(), Box<dyn std::error::Error>> {
        assert!(!verify_password(SecretString::from("x"), Some("plaintext".to_string())).await?);
        Ok(())
    }
}
