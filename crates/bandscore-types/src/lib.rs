//! Shared domain types for Bandscore.
//!
//! Task variants, the wizard session record, configuration, LLM request
//! shapes and the error enums used across the workspace.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod config;
pub mod error;
pub mod llm;
pub mod secret;
pub mod session;
pub mod task;
