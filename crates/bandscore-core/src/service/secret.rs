//! Secret resolution service.
//!
//! SecretService resolves secrets through a chain of providers in priority
//! order. Default precedence: environment variables > `secrets.toml`.
//!
//! This service depends only on `bandscore-types` and the
//! `DynSecretProvider` port, never on concrete infra implementations.

use bandscore_types::error::SecretError;
use bandscore_types::secret::SecretBackend;

use crate::repository::secret::DynSecretProvider;

/// Service for reading secrets across multiple storage backends.
///
/// Providers are ordered by precedence (first non-empty match wins). An
/// empty or whitespace-only value counts as unset, so a blank environment
/// variable does not shadow the secrets file.
pub struct SecretService {
    providers: Vec<DynSecretProvider>,
}

impl SecretService {
    /// Create a new SecretService with the given provider chain.
    ///
    /// Providers should be ordered by precedence (highest priority first).
    pub fn new(providers: Vec<DynSecretProvider>) -> Self {
        Self { providers }
    }

    /// Resolve a secret value by iterating through providers in priority order.
    pub async fn get_secret(&self, key: &str) -> Result<Option<String>, SecretError> {
        Ok(self
            .resolve_with_backend(key)
            .await?
            .map(|(value, _)| value))
    }

    /// Resolve a secret and report which backend supplied it.
    pub async fn resolve_with_backend(
        &self,
        key: &str,
    ) -> Result<Option<(String, SecretBackend)>, SecretError> {
        for provider in &self.providers {
            if let Some(value) = provider.get_boxed(key).await? {
                if !value.trim().is_empty() {
                    return Ok(Some((value, provider.backend())));
                }
            }
        }
        Ok(None)
    }

    /// Backends in resolution order.
    pub fn backends(&self) -> Vec<SecretBackend> {
        self.providers.iter().map(|p| p.backend()).collect()
    }

    /// Mask a secret value, showing only the last 4 characters.
    ///
    /// - "AIzaSyabcdefghijklmnop" -> "****mnop"
    /// - "abc" -> "****" (too short to show any chars)
    pub fn mask_secret(value: &str) -> String {
        let chars: Vec<char> = value.chars().collect();
        if chars.len() <= 4 {
            "****".to_string()
        } else {
            let tail: String = chars[chars.len() - 4..].iter().collect();
            format!("****{tail}")
        }
    }
}
