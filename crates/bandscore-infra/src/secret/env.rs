//! Environment variable secret provider.
//!
//! The highest-priority provider in the resolution chain: env vars override
//! `secrets.toml`.

use bandscore_core::repository::secret::SecretProvider;
use bandscore_types::error::SecretError;
use bandscore_types::secret::SecretBackend;

/// Environment variable secret provider. The key is the variable name.
pub struct EnvSecretProvider;

impl EnvSecretProvider {
    pub fn new() -> Self {
        Self
    }
}

impl Default for EnvSecretProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl SecretProvider for EnvSecretProvider {
    fn backend(&self) -> SecretBackend {
        SecretBackend::Environment
    }

    async fn get(&self, key: &str) -> Result<Option<String>, SecretError> {
        match std::env::var(key) {
            Ok(val) => Ok(Some(val)),
            Err(std::env::VarError::NotPresent) => Ok(None),
            // Secrets must be valid strings; treat as unset.
            Err(std::env::VarError::NotUnicode(_)) => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_env_provider_get_existing() {
        // SAFETY: the variable name is unique to this test.
        unsafe { std::env::set_var("BANDSCORE_TEST_SECRET_1", "test-value-123") };

        let provider = EnvSecretProvider::new();
        let result = provider.get("BANDSCORE_TEST_SECRET_1").await.unwrap();
        assert_eq!(result, Some("test-value-123".to_string()));

        // SAFETY: the var was just set above.
        unsafe { std::env::remove_var("BANDSCORE_TEST_SECRET_1") };
    }

    #[tokio::test]
    async fn test_env_provider_get_missing() {
        let provider = EnvSecretProvider::new();
        let result = provider.get("NONEXISTENT_VAR_XYZ_123").await.unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_backend() {
        assert_eq!(EnvSecretProvider::new().backend(), SecretBackend::Environment);
    }
}
