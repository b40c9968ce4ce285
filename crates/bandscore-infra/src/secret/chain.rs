//! Secret chain builder: wires concrete providers in priority order.
//!
//! The resulting chain is passed to `SecretService` in `bandscore-core` via
//! the `DynSecretProvider` abstraction.

use std::path::Path;
use std::sync::Arc;

use bandscore_core::repository::secret::DynSecretProvider;

use crate::secret::env::EnvSecretProvider;
use crate::secret::file::TomlSecretProvider;

/// Build the default secret resolution chain (first match wins):
/// 1. Environment variables (if `include_env` is true)
/// 2. `{data_dir}/secrets.toml`
pub fn build_secret_chain(data_dir: &Path, include_env: bool) -> Vec<DynSecretProvider> {
    let mut chain: Vec<DynSecretProvider> = Vec::new();

    if include_env {
        chain.push(Arc::new(EnvSecretProvider::new()));
    }
    chain.push(Arc::new(TomlSecretProvider::in_data_dir(data_dir)));

    chain
}

#[cfg(test)]
mod tests {
    use super::*;
    use bandscore_core::service::secret::SecretService;
    use bandscore_types::secret::SecretBackend;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_env_shadows_file() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join("secrets.toml"),
            "BANDSCORE_CHAIN_TEST_KEY = \"from-file\"\nBANDSCORE_CHAIN_FILE_ONLY = \"file-only\"\n",
        )
        .unwrap();
        // SAFETY: the variable name is unique to this test.
        unsafe { std::env::set_var("BANDSCORE_CHAIN_TEST_KEY", "from-env") };

        let service = SecretService::new(build_secret_chain(tmp.path(), true));
        let (value, backend) = service
            .resolve_with_backend("BANDSCORE_CHAIN_TEST_KEY")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(value, "from-env");
        assert_eq!(backend, SecretBackend::Environment);

        let (value, backend) = service
            .resolve_with_backend("BANDSCORE_CHAIN_FILE_ONLY")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(value, "file-only");
        assert_eq!(backend, SecretBackend::File);

        // SAFETY: the var was just set above.
        unsafe { std::env::remove_var("BANDSCORE_CHAIN_TEST_KEY") };
    }

    #[test]
    fn test_chain_without_env() {
        let tmp = TempDir::new().unwrap();
        let chain = build_secret_chain(tmp.path(), false);
        assert_eq!(chain.len(), 1);
        assert_eq!(chain[0].backend(), SecretBackend::File);
    }
}
