//! Core logic for Bandscore.
//!
//! Word counting, the wizard state machine, the examiner prompt, the
//! evaluation service and report formatting, plus the port traits
//! (`LlmProvider`, `CriteriaStore`, `SecretProvider`) implemented in
//! bandscore-infra.

pub mod document;
pub mod evaluation;
pub mod llm;
pub mod prompt;
pub mod repository;
pub mod service;
pub mod wizard;
pub mod word_count;
