//! Credential storage using the OS keychain.
//!
//! GitLab tokens live in the system's native credential storage (Keychain
//! on macOS, Credential Manager on Windows, Secret Service on Linux),
//! keyed by instance URL. The `GITLAB_TOKEN` environment variable takes
//! precedence so CI and scripts can skip the keychain entirely.

use crate::error::AppError;
use keyring::Entry;

/// Service name used in the keychain.
const SERVICE_NAME: &str = "git-happens";

/// Environment variable consulted before the keychain.
const TOKEN_ENV: &str = "GITLAB_TOKEN";

/// Credential storage operations.
pub struct CredentialService;

impl CredentialService {
    fn get_entry(instance_url: &str) -> Result<Entry, AppError> {
        Entry::new(SERVICE_NAME, instance_url)
            .map_err(|e| AppError::credential_storage(format!("Failed to access keychain: {}", e)))
    }

    /// Store a token for a GitLab instance.
    pub fn store_token(instance_url: &str, token: &str) -> Result<(), AppError> {
        let entry = Self::get_entry(instance_url)?;
        entry
            .set_password(token)
            .map_err(|e| AppError::credential_storage(format!("Failed to store token: {}", e)))
    }

    /// Retrieve the token for a GitLab instance.
    ///
    /// Checks `GITLAB_TOKEN` first, then the keychain.
    pub fn get_token(instance_url: &str) -> Result<String, AppError> {
        if let Ok(token) = std::env::var(TOKEN_ENV) {
            if !token.is_empty() {
                return Ok(token);
            }
        }

        let entry = Self::get_entry(instance_url)?;
        entry.get_password().map_err(|e| match e {
            keyring::Error::NoEntry => AppError::authentication(format!(
                "no token for {}; set {} or run `git-happens auth <token>`",
                instance_url, TOKEN_ENV
            )),
            _ => AppError::credential_storage(format!("Failed to retrieve token: {}", e)),
        })
    }

    /// Delete the token for a GitLab instance.
    ///
    /// Idempotent: deleting a missing token is not an error.
    pub fn delete_token(instance_url: &str) -> Result<(), AppError> {
        let entry = Self::get_entry(instance_url)?;
        match entry.delete_credential() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(AppError::credential_storage(format!(
                "Failed to delete token: {}",
                e
            ))),
        }
    }
}
