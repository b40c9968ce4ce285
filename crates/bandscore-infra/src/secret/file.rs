//! `secrets.toml` secret provider.
//!
//! A flat table of `KEY = "value"` pairs. The file is read on every lookup,
//! so edits take effect without a restart. A missing file holds no secrets.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use bandscore_core::repository::secret::SecretProvider;
use bandscore_types::error::SecretError;
use bandscore_types::secret::SecretBackend;

/// Default file name inside the data directory.
pub const SECRETS_FILE: &str = "secrets.toml";

pub struct TomlSecretProvider {
    path: PathBuf,
}

impl TomlSecretProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Provider for `{data_dir}/secrets.toml`.
    pub fn in_data_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join(SECRETS_FILE))
    }

    async fn read_table(&self) -> Result<HashMap<String, String>, SecretError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(HashMap::new());
            }
            Err(err) => {
                return Err(SecretError::Read(format!("{}: {err}", self.path.display())));
            }
        };

        // Only the error location is reported; the message could echo values.
        toml::from_str::<HashMap<String, String>>(&content).map_err(|err| {
            let at = err
                .span()
                .map(|span| format!(" at byte {}", span.start))
                .unwrap_or_default();
            SecretError::Parse(format!("{}{at}", self.path.display()))
        })
    }
}

impl SecretProvider for TomlSecretProvider {
    fn backend(&self) -> SecretBackend {
        SecretBackend::File
    }

    async fn get(&self, key: &str) -> Result<Option<String>, SecretError> {
        Ok(self.read_table().await?.remove(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_reads_flat_table() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join(SECRETS_FILE),
            "GOOGLE_API_KEY = \"AIza-test\"\nPROMPT_TEMPLATE = \"\"\"\nQ: {question}\nA: {response}\n\"\"\"\n",
        )
        .unwrap();

        let provider = TomlSecretProvider::in_data_dir(tmp.path());
        assert_eq!(
            provider.get("GOOGLE_API_KEY").await.unwrap(),
            Some("AIza-test".to_string())
        );
        assert_eq!(
            provider.get("PROMPT_TEMPLATE").await.unwrap(),
            Some("Q: {question}\nA: {response}\n".to_string())
        );
        assert!(provider.get("CRITERIA_ENCRYPTION_KEY").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let tmp = TempDir::new().unwrap();
        let provider = TomlSecretProvider::in_data_dir(tmp.path());
        assert!(provider.get("GOOGLE_API_KEY").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_malformed_file_does_not_echo_values() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join(SECRETS_FILE), "GOOGLE_API_KEY = AIza-unquoted").unwrap();

        let provider = TomlSecretProvider::in_data_dir(tmp.path());
        let err = provider.get("GOOGLE_API_KEY").await.unwrap_err();
        assert!(matches!(err, SecretError::Parse(_)));
        assert!(!err.to_string().contains("AIza-unquoted"));
    }
}
