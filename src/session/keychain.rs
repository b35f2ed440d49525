//! OS keychain backend for the token pair.
//!
//! Uses the `keyring` crate. Each token is its own entry under a fixed
//! service name, so a logout in another process is seen on the next read.

use keyring::Entry;
use thiserror::Error;

use super::{SessionStore, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};

/// Keychain service name shared by both entries.
pub const SERVICE_NAME: &str = "com.blueming.client";

#[derive(Debug, Error)]
enum KeychainError {
    #[error("Keychain operation failed: {0}")]
    OperationFailed(String),
}

impl From<keyring::Error> for KeychainError {
    fn from(err: keyring::Error) -> Self {
        KeychainError::OperationFailed(err.to_string())
    }
}

/// Session store backed by the platform keychain.
#[derive(Debug, Clone)]
pub struct KeychainSessionStore {
    service: String,
}

impl Default for KeychainSessionStore {
    fn default() -> Self {
        Self::new(SERVICE_NAME)
    }
}

impl KeychainSessionStore {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn store(&self, key: &str, value: &str) -> Result<(), KeychainError> {
        let entry = Entry::new(&self.service, key)?;
        entry.set_password(value)?;
        Ok(())
    }

    /// Returns `None` if no entry exists.
    fn load(&self, key: &str) -> Result<Option<String>, KeychainError> {
        let entry = Entry::new(&self.service, key)?;
        match entry.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(KeychainError::from(e)),
        }
    }

    /// Idempotent: a missing entry is not an error.
    fn delete(&self, key: &str) -> Result<(), KeychainError> {
        let entry = Entry::new(&self.service, key)?;
        match entry.delete_credential() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(KeychainError::from(e)),
        }
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.load(key) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("Failed to read {} from keychain: {}", key, e);
                None
            }
        }
    }
}

impl SessionStore for KeychainSessionStore {
    fn set_tokens(&self, access_token: &str, refresh_token: &str) {
        if let Err(e) = self.store(ACCESS_TOKEN_KEY, access_token) {
            log::warn!("Failed to store access token in keychain: {}", e);
        }
        if let Err(e) = self.store(REFRESH_TOKEN_KEY, refresh_token) {
            log::warn!("Failed to store refresh token in keychain: {}", e);
        }
    }

    fn access_token(&self) -> Option<String> {
        self.read(ACCESS_TOKEN_KEY)
    }

    fn refresh_token(&self) -> Option<String> {
        self.read(REFRESH_TOKEN_KEY)
    }

    fn clear_tokens(&self) {
        for key in [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY] {
            if let Err(e) = self.delete(key) {
                log::warn!("Failed to delete {} from keychain: {}", key, e);
            }
        }
    }

    fn name(&self) -> &'static str {
        "keychain"
    }
}
