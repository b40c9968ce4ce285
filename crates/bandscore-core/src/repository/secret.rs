//! Secret provider trait definition.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use bandscore_types::error::SecretError;
use bandscore_types::secret::SecretBackend;

/// Trait for secret storage backends (environment, secrets file).
///
/// Each provider answers lookups by key; `SecretService` chains providers in
/// priority order.
pub trait SecretProvider: Send + Sync {
    /// Which backend this provider reads from.
    fn backend(&self) -> SecretBackend;

    /// Retrieve a secret value by key.
    /// Returns None if the secret does not exist in this provider.
    fn get(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Option<String>, SecretError>> + Send;
}

/// Object-safe version of [`SecretProvider`] with boxed futures.
pub trait SecretProviderDyn: Send + Sync {
    fn backend(&self) -> SecretBackend;

    fn get_boxed<'a>(
        &'a self,
        key: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Option<String>, SecretError>> + Send + 'a>>;
}

impl<T: SecretProvider> SecretProviderDyn for T {
    fn backend(&self) -> SecretBackend {
        SecretProvider::backend(self)
    }

    fn get_boxed<'a>(
        &'a self,
        key: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Option<String>, SecretError>> + Send + 'a>> {
        Box::pin(self.get(key))
    }
}

/// Shared, type-erased secret provider used in resolution chains.
pub type DynSecretProvider = Arc<dyn SecretProviderDyn>;
