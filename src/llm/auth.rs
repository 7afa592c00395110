//! API key management using the system keyring

use keyring::Entry;
use thiserror::Error;

/// Service name for keyring storage
const SERVICE_NAME: &str = "skazka";
/// Entry name for the API key
const API_KEY_ENTRY: &str = "azure-openai-api-key";

/// Environment variable checked before the keyring
pub const API_KEY_ENV: &str = "AZURE_OPENAI_API_KEY";

/// Errors from credential storage
#[derive(Debug, Error)]
pub enum CredentialError {
    /// No key in the environment or keyring
    #[error("API key not configured. Set AZURE_OPENAI_API_KEY or run `skazka key set <key>`")]
    NotFound,

    /// Failed to access system keyring
    #[error("Failed to access keyring: {0}")]
    Keyring(String),

    /// Key contains whitespace or is too short to be real
    #[error("Invalid API key format")]
    InvalidFormat,
}

/// Manages API key storage in the system keyring
pub struct ApiKeyManager;

impl ApiKeyManager {
    /// Resolve the key: environment value first, then the keyring
    pub fn resolve(env_value: Option<String>) -> Result<String, CredentialError> {
        match env_value.map(|k| k.trim().to_string()).filter(|k| !k.is_empty()) {
            Some(key) => Ok(key),
            None => Self::get_api_key(),
        }
    }

    /// Get the API key from system keyring
    pub fn get_api_key() -> Result<String, CredentialError> {
        let entry = Entry::new(SERVICE_NAME, API_KEY_ENTRY)
            .map_err(|e| CredentialError::Keyring(e.to_string()))?;

        entry.get_password().map_err(|e| match e {
            keyring::Error::NoEntry => CredentialError::NotFound,
            _ => CredentialError::Keyring(e.to_string()),
        })
    }

    /// Store the API key in system keyring
    pub fn set_api_key(key: &str) -> Result<(), CredentialError> {
        let key = key.trim();
        if !Self::validate_key_format(key) {
            return Err(CredentialError::InvalidFormat);
        }

        let entry = Entry::new(SERVICE_NAME, API_KEY_ENTRY)
            .map_err(|e| CredentialError::Keyring(e.to_string()))?;

        entry.set_password(key).map_err(|e| CredentialError::Keyring(e.to_string()))
    }

    /// Delete the stored API key
    pub fn delete_api_key() -> Result<(), CredentialError> {
        let entry = Entry::new(SERVICE_NAME, API_KEY_ENTRY)
            .map_err(|e| CredentialError::Keyring(e.to_string()))?;

        entry.delete_credential().map_err(|e| match e {
            keyring::Error::NoEntry => CredentialError::NotFound,
            _ => CredentialError::Keyring(e.to_string()),
        })
    }

    /// Azure keys are 32 hex chars (older) or 84 alphanumerics (newer)
    fn validate_key_format(key: &str) -> bool {
        key.len() >= 32 && key.chars().all(|c| c.is_ascii_alphanumeric())
    }

    /// Mask an API key for display (show first and last 4 chars)
    pub fn mask_key(key: &str) -> String {
        if key.len() <= 12 || !key.is_ascii() {
            return "*".repeat(key.chars().count());
        }
        let prefix = &key[..4];
        let suffix = &key[key.len() - 4..];
        format!("{}...{}", prefix, suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_key_format() {
        assert!(ApiKeyManager::validate_key_format("0123456789abcdef0123456789abcdef"));
        assert!(!ApiKeyManager::validate_key_format("short"));
        assert!(!ApiKeyManager::validate_key_format("0123456789abcdef 0123456789abcdef"));
    }

    #[test]
    fn mask_key() {
        let masked = ApiKeyManager::mask_key("0123456789abcdef0123456789abcdef");
        assert_eq!(masked, "0123...cdef");
        assert_eq!(ApiKeyManager::mask_key("tiny"), "****");
    }

    #[test]
    fn resolve_prefers_environment() {
        let key = ApiKeyManager::resolve(Some("  from-env  ".into())).unwrap();
        assert_eq!(key, "from-env");
    }
}
