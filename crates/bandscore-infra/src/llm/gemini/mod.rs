//! Google Gemini LLM provider implementation.
//!
//! [`GeminiProvider`] implements the
//! [`LlmProvider`](bandscore_core::llm::provider::LlmProvider) trait for the
//! Generative Language `generateContent` endpoint.

pub mod client;
pub mod types;

pub use client::{GeminiProvider, GeminiProviderFactory};
