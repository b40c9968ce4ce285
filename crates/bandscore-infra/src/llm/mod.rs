//! LLM provider implementations.
//!
//! Concrete implementations of the
//! [`LlmProvider`](bandscore_core::llm::provider::LlmProvider) trait defined
//! in `bandscore-core`.

pub mod gemini;
