//! Filesystem-backed band-descriptor store.
//!
//! Looks for `<descriptor>.enc` first and falls back to the plaintext file,
//! so a deployment can ship only the encrypted copies.

use std::path::{Path, PathBuf};

use bandscore_core::repository::criteria::{CriteriaSource, CriteriaStore};
use bandscore_types::error::CriteriaError;
use bandscore_types::task::TaskVariant;

use crate::crypto::criteria_cipher::{CipherError, CriteriaCipher, encrypted_path};

pub struct FsCriteriaStore {
    dir: PathBuf,
    cipher: Option<CriteriaCipher>,
}

impl FsCriteriaStore {
    pub fn new(dir: impl Into<PathBuf>, cipher: Option<CriteriaCipher>) -> Self {
        Self {
            dir: dir.into(),
            cipher,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl CriteriaStore for FsCriteriaStore {
    fn locate(&self, variant: TaskVariant) -> Result<CriteriaSource, CriteriaError> {
        let plain = self.dir.join(variant.descriptor_file());
        let encrypted = encrypted_path(&plain);

        if encrypted.is_file() {
            Ok(CriteriaSource {
                path: encrypted,
                encrypted: true,
            })
        } else if plain.is_file() {
            Ok(CriteriaSource {
                path: plain,
                encrypted: false,
            })
        } else {
            Err(CriteriaError::NotFound(plain.display().to_string()))
        }
    }

    async fn load(&self, variant: TaskVariant) -> Result<String, CriteriaError> {
        let source = self.locate(variant)?;
        let shown = source.path.display().to_string();

        let content = tokio::fs::read_to_string(&source.path)
            .await
            .map_err(|e| CriteriaError::Io(format!("{shown}: {e}")))?;

        if !source.encrypted {
            tracing::debug!(task = %variant, file = %shown, "Loaded plaintext criteria");
            return Ok(content);
        }

        let cipher = self
            .cipher
            .as_ref()
            .ok_or_else(|| CriteriaError::KeyMissing(shown.clone()))?;

        let text = cipher
            .open_text(&content)
            .map_err(|e| match e {
                CipherError::LegacyFernet => CriteriaError::LegacyFormat(shown.clone()),
                other => CriteriaError::Decryption {
                    path: shown.clone(),
                    reason: other.to_string(),
                },
            })?;

        tracing::debug!(
            task = %variant,
            file = %shown,
            key = cipher.fingerprint(),
            "Decrypted criteria"
        );
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const KEY: [u8; 32] = [7u8; 32];

    fn write_plain(dir: &Path, variant: TaskVariant, text: &str) -> PathBuf {
        let path = dir.join(variant.descriptor_file());
        std::fs::write(&path, text).unwrap();
        path
    }

    fn write_sealed(dir: &Path, variant: TaskVariant, text: &str, key: &[u8; 32]) -> PathBuf {
        let path = encrypted_path(&dir.join(variant.descriptor_file()));
        let sealed = CriteriaCipher::new(key).seal_text(text).unwrap();
        std::fs::write(&path, sealed).unwrap();
        path
    }

    #[tokio::test]
    async fn test_loads_plaintext_per_variant() {
        let tmp = TempDir::new().unwrap();
        write_plain(tmp.path(), TaskVariant::Task1Academic, "academic");
        write_plain(tmp.path(), TaskVariant::Task1GeneralTraining, "general");
        write_plain(tmp.path(), TaskVariant::Task2, "{\"essay\": true}");

        let store = FsCriteriaStore::new(tmp.path(), None);
        assert_eq!(store.load(TaskVariant::Task1Academic).await.unwrap(), "academic");
        assert_eq!(
            store.load(TaskVariant::Task1GeneralTraining).await.unwrap(),
            "general"
        );
        assert_eq!(store.load(TaskVariant::Task2).await.unwrap(), "{\"essay\": true}");
    }

    #[tokio::test]
    async fn test_prefers_encrypted_file() {
        let tmp = TempDir::new().unwrap();
        write_plain(tmp.path(), TaskVariant::Task2, "stale plaintext");
        let sealed = write_sealed(tmp.path(), TaskVariant::Task2, "from enc", &KEY);

        let store = FsCriteriaStore::new(tmp.path(), Some(CriteriaCipher::new(&KEY)));
        let source = store.locate(TaskVariant::Task2).unwrap();
        assert!(source.encrypted);
        assert_eq!(source.path, sealed);
        assert_eq!(store.load(TaskVariant::Task2).await.unwrap(), "from enc");
    }

    #[tokio::test]
    async fn test_encrypted_without_key() {
        let tmp = TempDir::new().unwrap();
        write_sealed(tmp.path(), TaskVariant::Task2, "secret", &KEY);

        let store = FsCriteriaStore::new(tmp.path(), None);
        assert!(matches!(
            store.load(TaskVariant::Task2).await,
            Err(CriteriaError::KeyMissing(_))
        ));
    }

    #[tokio::test]
    async fn test_encrypted_with_wrong_key() {
        let tmp = TempDir::new().unwrap();
        write_sealed(tmp.path(), TaskVariant::Task1Academic, "secret", &KEY);

        let store = FsCriteriaStore::new(tmp.path(), Some(CriteriaCipher::new(&[9u8; 32])));
        let err = store.load(TaskVariant::Task1Academic).await.unwrap_err();
        assert!(matches!(err, CriteriaError::Decryption { .. }));
        assert!(!err.to_string().contains("secret"));
    }

    #[tokio::test]
    async fn test_fernet_file_reports_legacy_format() {
        let tmp = TempDir::new().unwrap();
        let key: [u8; 32] = std::array::from_fn(|i| i as u8);
        // Fernet token for `key`, as written by the older encryption script.
        let token = "gAAAAABlU_EAAAECAwQFBgcICQoLDA0OD92YDX0Pgx52gg2RitFIjxi_LPQHvh3UZNvh263a7DLCvC0f12F7fvY49zHxEI-NCro_bkbNrvL3YjW3Wz7sBr4=";
        std::fs::write(
            encrypted_path(&tmp.path().join(TaskVariant::Task2.descriptor_file())),
            token,
        )
        .unwrap();

        let store = FsCriteriaStore::new(tmp.path(), Some(CriteriaCipher::new(&key)));
        let err = store.load(TaskVariant::Task2).await.unwrap_err();
        assert!(matches!(err, CriteriaError::LegacyFormat(_)));
        assert!(err.to_string().contains("bandscore encrypt"));
    }

    #[tokio::test]
    async fn test_missing_file() {
        let tmp = TempDir::new().unwrap();
        let store = FsCriteriaStore::new(tmp.path(), None);
        let err = store.load(TaskVariant::Task2).await.unwrap_err();
        match err {
            CriteriaError::NotFound(path) => {
                assert!(path.ends_with(TaskVariant::Task2.descriptor_file()))
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
    }
}
