//! Secret provider implementations.
//!
//! - `env`: Environment variable provider (read-only, highest priority)
//! - `file`: `secrets.toml` in the data directory
//! - `chain`: Secret chain builder wiring the providers together

pub mod chain;
pub mod env;
pub mod file;
