use async_trait::async_trait;
use secrecy::SecretString;
use sqlx::PgPool;
use tracing::error;

use super::{hash::verify_password, normalize_identifier, CredentialStore, VerifyResult};

/// Admin accounts in the `admins` table.
#[derive(Clone, Debug)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn verify(&self, identifier: &str, secret: &SecretString) -> VerifyResult {
        let subject = normalize_identifier(identifier);
        let stored: Option<String> =
            match sqlx::query_scalar("SELECT password_hash FROM admins WHERE email = $1")
                .bind(&subject)
                .fetch_optional(&self.pool)
                .await
            {
                Ok(stored) => stored,
                Err(err) => {
                    error!("Failed to look up admin: {err}");
                    return VerifyResult::StoreUnavailable;
                }
            };

        match verify_password(secret.clone(), stored).await {
            Ok(true) => VerifyResult::Success(subject),
            Ok(false) => VerifyResult::Failure,
            Err(err) => {
                error!("Password verification task failed: {err}");
                VerifyResult::StoreUnavailable
            }
        }
    }
}
