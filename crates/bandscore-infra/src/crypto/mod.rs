//! Cryptographic operations for Bandscore.
//!
//! - `criteria_cipher`: AES-256-GCM encryption of band-descriptor files at rest

pub mod criteria_cipher;
