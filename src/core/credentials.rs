//! Gemini API key storage.
//!
//! The terminal app keeps the key in the system keychain; the proxy server
//! seeds an in-memory store from its own configuration. Both sit behind
//! [`CredentialStore`] so the generation backend does not care which one it
//! was handed.

use std::sync::RwLock;

use keyring::Entry;
use thiserror::Error;

const SERVICE_NAME: &str = "sticker-studio";
const ACCOUNT_NAME: &str = "gemini-api-key";

#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("Keyring error: {0}")]
    KeyringError(#[from] keyring::Error),

    #[error("API key must not be empty")]
    Empty,

    #[error("Credential store is unavailable")]
    Poisoned,
}

pub type Result<T> = std::result::Result<T, CredentialError>;

/// Holds at most one Gemini API key.
///
/// `get` returns `Ok(None)` when nothing is stored; a backend failure is an
/// error rather than an absent key.
pub trait CredentialStore: Send + Sync {
    fn get(&self) -> Result<Option<String>>;

    /// Store `key` after trimming. Empty keys are rejected and leave the
    /// stored value untouched.
    fn set(&self, key: &str) -> Result<()>;

    /// Remove the stored key. Clearing an empty store is not an error.
    fn clear(&self) -> Result<()>;

    fn has_key(&self) -> bool {
        matches!(self.get(), Ok(Some(_)))
    }
}

fn normalize(key: &str) -> Result<String> {
    let key = key.trim();
    if key.is_empty() {
        return Err(CredentialError::Empty);
    }
    Ok(key.to_string())
}

// ============================================================================
// Keychain
// ============================================================================

pub struct KeyringCredentialStore {
    service: String,
    account: String,
}

impl Default for KeyringCredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyringCredentialStore {
    pub fn new() -> Self {
        Self {
            service: SERVICE_NAME.to_string(),
            account: ACCOUNT_NAME.to_string(),
        }
    }

    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            account: ACCOUNT_NAME.to_string(),
        }
    }

    fn entry(&self) -> Result<Entry> {
        Ok(Entry::new(&self.service, &self.account)?)
    }
}

impl CredentialStore for KeyringCredentialStore {
    fn get(&self) -> Result<Option<String>> {
        match self.entry()?.get_password() {
            Ok(value) if value.trim().is_empty() => Ok(None),
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(CredentialError::KeyringError(e)),
        }
    }

    fn set(&self, key: &str) -> Result<()> {
        let key = normalize(key)?;
        self.entry()?.set_password(&key)?;
        log::info!("Stored Gemini API key in keychain ({})", mask_api_key(&key));
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match self.entry()?.delete_password() {
            Ok(()) => {
                log::info!("Removed Gemini API key from keychain");
                Ok(())
            }
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(CredentialError::KeyringError(e)),
        }
    }
}

// ============================================================================
// In-memory
// ============================================================================

/// Process-local store. Used by the proxy server and by tests.
#[derive(Default)]
pub struct MemoryCredentialStore {
    key: RwLock<Option<String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with `key` if it is non-blank.
    pub fn with_key(key: Option<&str>) -> Self {
        let key = key.and_then(|k| normalize(k).ok());
        Self {
            key: RwLock::new(key),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self) -> Result<Option<String>> {
        self.key
            .read()
            .map(|k| k.clone())
            .map_err(|_| CredentialError::Poisoned)
    }

    fn set(&self, key: &str) -> Result<()> {
        let key = normalize(key)?;
        *self.key.write().map_err(|_| CredentialError::Poisoned)? = Some(key);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.key.write().map_err(|_| CredentialError::Poisoned)? = None;
        Ok(())
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Mask an API key for display (show first 4 and last 4 chars)
pub fn mask_api_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "********".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

/// Loose shape check for Google API keys, used only to warn in the UI.
pub fn looks_like_gemini_key(key: &str) -> bool {
    key.trim().starts_with("AIza")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_api_key() {
        assert_eq!(mask_api_key("AIzaSyAbcdefghijklmnop"), "AIza...mnop");
        assert_eq!(mask_api_key("short"), "********");
        assert_eq!(mask_api_key("ключ-ключ-ключ"), "ключ...ключ");
    }

    #[test]
    fn test_looks_like_gemini_key() {
        assert!(looks_like_gemini_key("AIzaSyTest123"));
        assert!(looks_like_gemini_key("  AIzaSyTest123 "));
        assert!(!looks_like_gemini_key("sk-ant-123"));
    }

    #[test]
    fn test_memory_store_set_get_clear() {
        let store = MemoryCredentialStore::new();
        assert_eq!(store.get().unwrap(), None);
        assert!(!store.has_key());

        store.set("  AIzaKey  ").unwrap();
        assert_eq!(store.get().unwrap().as_deref(), Some("AIzaKey"));
        assert!(store.has_key());

        store.clear().unwrap();
        assert_eq!(store.get().unwrap(), None);
        // Clearing twice is fine
        store.clear().unwrap();
    }

    #[test]
    fn test_memory_store_rejects_blank_key() {
        let store = MemoryCredentialStore::with_key(Some("AIzaOld"));
        assert!(matches!(store.set("   "), Err(CredentialError::Empty)));
        assert_eq!(store.get().unwrap().as_deref(), Some("AIzaOld"));
    }

    #[test]
    fn test_memory_store_seed_ignores_blank() {
        assert!(!MemoryCredentialStore::with_key(Some("  ")).has_key());
        assert!(!MemoryCredentialStore::with_key(None).has_key());
    }
}
