//! Credential vault: durable key-value storage for session secrets.
//!
//! `KeyringVault` stores entries in the OS keychain; `MemoryVault` keeps
//! them in a map for tests and throwaway runs. Each key is independent;
//! there is no cross-key transaction.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use keyring::Entry;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum VaultError {
    #[error("Keychain error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("Vault unavailable: {0}")]
    Unavailable(String),

    /// Some entries could not be removed and may still be restored later.
    #[error("Failed to remove vault entries: {}", .0.join(", "))]
    Incomplete(Vec<&'static str>),
}

/// Secure, persistent storage addressed by logical key.
pub trait CredentialVault: Send + Sync {
    /// Read an entry; `Ok(None)` when it does not exist
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, VaultError>;

    fn set(&self, key: &str, value: &[u8]) -> Result<(), VaultError>;

    /// Remove an entry. Removing a missing entry is not an error.
    fn delete(&self, key: &str) -> Result<(), VaultError>;
}

/// OS keychain vault. Entries live under one service name per installation.
pub struct KeyringVault {
    service: String,
}

impl KeyringVault {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self, key: &str) -> Result<Entry, VaultError> {
        Ok(Entry::new(&self.service, key)?)
    }
}

impl CredentialVault for KeyringVault {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, VaultError> {
        match self.entry(key)?.get_secret() {
            Ok(secret) => Ok(Some(secret)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), VaultError> {
        self.entry(key)?.set_secret(value)?;
        debug!(service = %self.service, key = key, "Stored keychain entry");
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), VaultError> {
        match self.entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory vault. Contents vanish with the value, so share it behind an
/// `Arc` to simulate a restart.
#[derive(Default)]
pub struct MemoryVault {
    entries: Mutex<HashMap<String, Vec<u8>>>,
    failing: Mutex<HashSet<String>>,
}

impl MemoryVault {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `set` and `delete` of `key` fail
    pub fn fail_writes_for(&self, key: &str) {
        self.failing
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string());
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_writable(&self, key: &str) -> Result<(), VaultError> {
        if self
            .failing
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(key)
        {
            return Err(VaultError::Unavailable(format!("writes to {} are disabled", key)));
        }
        Ok(())
    }
}

impl CredentialVault for MemoryVault {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, VaultError> {
        Ok(self
            .entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), VaultError> {
        self.check_writable(key)?;
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), VaultError> {
        self.check_writable(key)?;
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(key);
        Ok(())
    }
}
