//! LlmProvider and ProviderFactory trait definitions.
//!
//! `LlmProvider` uses RPITIT for `complete`; implementations live in
//! bandscore-infra (e.g. `GeminiProvider`).

use bandscore_types::llm::{CompletionRequest, CompletionResponse, LlmError};

use super::box_provider::BoxLlmProvider;

/// Trait for hosted text-generation backends.
pub trait LlmProvider: Send + Sync {
    /// Human-readable provider name (e.g., "gemini").
    fn name(&self) -> &str;

    /// Model used when the request leaves `model` empty.
    fn default_model(&self) -> &str;

    /// Send a completion request and receive the full response.
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl std::future::Future<Output = Result<CompletionResponse, LlmError>> + Send;
}

/// Builds a provider client from a resolved API key.
///
/// The evaluation service calls this once per request, so a credential
/// rotated in the secret store takes effect on the next evaluation.
pub trait ProviderFactory: Send + Sync {
    fn create(&self, api_key: &str) -> Result<BoxLlmProvider, LlmError>;
}
