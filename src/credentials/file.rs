use anyhow::{Context, Result};
use async_trait::async_trait;
use secrecy::SecretString;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, error};

use super::{hash::verify_password, normalize_identifier, CredentialStore, VerifyResult};

#[derive(Debug, Deserialize)]
struct CredentialsFile {
    admins: Vec<AdminEntry>,
}

#[derive(Debug, Deserialize)]
struct AdminEntry {
    email: String,
    password_hash: String,
}

/// Admin accounts read from a JSON file:
///
/// ```json
/// {"admins": [{"email": "alice@example.com", "password_hash": "$argon2id$..."}]}
/// ```
///
/// The file is read on every verification, so edits apply to the next login.
#[derive(Clone, Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    /// Open the store, checking once that the file parses.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or is not valid JSON.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let store = Self { path: path.into() };
        let admins = load(&store.path).await?;
        debug!(
            "Loaded {} admin account(s) from {}",
            admins.admins.len(),
            store.path.display()
        );
        Ok(store)
    }
}

async fn load(path: &Path) -> Result<CredentialsFile> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read credentials file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse credentials file {}", path.display()))
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn verify(&self, identifier: &str, secret: &SecretString) -> VerifyResult {
        let file = match load(&self.path).await {
            Ok(file) => file,
            Err(err) => {
                error!("Credential store unavailable: {err:#}");
                return VerifyResult::StoreUnavailable;
            }
        };

        let subject = normalize_identifier(identifier);
        let stored = file
            .admins
            .into_iter()
            .find(|admin| normalize_identifier(&admin.email) == subject)
            .map(|admin| admin.password_hash);

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
