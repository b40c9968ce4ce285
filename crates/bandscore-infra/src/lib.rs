//! Infrastructure layer for Bandscore.
//!
//! Implements the ports defined in `bandscore-core`: the filesystem criteria
//! store (with AES-256-GCM decryption), the Gemini HTTP provider and the
//! secret providers. Also loads configuration and resolves the data directory.

pub mod config;
pub mod criteria;
pub mod crypto;
pub mod data_dir;
pub mod llm;
pub mod secret;
