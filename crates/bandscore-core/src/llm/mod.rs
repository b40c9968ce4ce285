//! LLM provider abstractions for Bandscore.
//!
//! - `LlmProvider`: RPITIT trait for concrete provider implementations
//! - `BoxLlmProvider`: object-safe wrapper for dynamic dispatch
//! - `ProviderFactory`: builds one provider per evaluation from a credential

pub mod box_provider;
pub mod provider;
