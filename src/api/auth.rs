//! Persistent storage for the session token.
//!
//! The token lives under a single well-known key. The production store is
//! the OS keychain via the `keyring` crate; an in-memory store backs tests
//! and `--ephemeral` CLI runs.

use std::sync::Mutex;

use keyring::Entry;
use thiserror::Error;

/// Default keychain service name.
pub const DEFAULT_SERVICE_NAME: &str = "filerepo-client";

/// Well-known key the token is stored under.
pub const TOKEN_KEY: &str = "token";

#[derive(Debug, Error)]
pub enum TokenStoreError {
    #[error("Keychain operation failed: {0}")]
    OperationFailed(String),
}

impl From<keyring::Error> for TokenStoreError {
    fn from(err: keyring::Error) -> Self {
        TokenStoreError::OperationFailed(err.to_string())
    }
}

/// External persistence for the bearer token.
///
/// Absence of a value means unauthenticated.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Result<Option<String>, TokenStoreError>;
    fn store(&self, token: &str) -> Result<(), TokenStoreError>;
    /// Remove the persisted value entirely. Idempotent.
    fn clear(&self) -> Result<(), TokenStoreError>;
}

/// Token store backed by the system keychain.
pub struct KeychainTokenStore {
    service: String,
}

impl KeychainTokenStore {
    pub fn new(service: &str) -> Self {
        Self {
            service: service.to_string(),
        }
    }

    fn entry(&self) -> Result<Entry, TokenStoreError> {
        Ok(Entry::new(&self.service, TOKEN_KEY)?)
    }
}

impl TokenStore for KeychainTokenStore {
    fn load(&self) -> Result<Option<String>, TokenStoreError> {
        match self.entry()?.get_password() {
            Ok(token) => Ok(Some(token)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(TokenStoreError::from(e)),
        }
    }

    fn store(&self, token: &str) -> Result<(), TokenStoreError> {
        self.entry()?.set_password(token)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), TokenStoreError> {
        match self.entry()?.delete_credential() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Ok(()), // never stored
            Err(e) => Err(TokenStoreError::from(e)),
        }
    }
}

/// Process-local token store.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn with_token(token: &str) -> Self {
        Self {
            token: Mutex::new(Some(token.to_string())),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Option<String>>, TokenStoreError> {
        self.token
            .lock()
            .map_err(|_| TokenStoreError::OperationFailed("token lock poisoned".to_string()))
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<String>, TokenStoreError> {
        Ok(self.lock()?.clone())
    }

    fn store(&self, token: &str) -> Result<(), TokenStoreError> {
        *self.lock()? = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), TokenStoreError> {
        *self.lock()? = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryTokenStore::new();
        assert_eq!(store.load().unwrap(), None);

        store.store("abc").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("abc"));

        store.store("def").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("def"));

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
        // idempotent
        store.clear().unwrap();
    }

    #[test]
    fn test_memory_store_with_token() {
        let store = MemoryTokenStore::with_token("seeded");
        assert_eq!(store.load().unwrap().as_deref(), Some("seeded"));
    }
}
