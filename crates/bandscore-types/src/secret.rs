use serde::{Deserialize, Serialize};

use std::fmt;

/// Hosted-model API credential.
pub const GOOGLE_API_KEY: &str = "GOOGLE_API_KEY";
/// URL-safe base64 key for the `.enc` descriptor files.
pub const CRITERIA_ENCRYPTION_KEY: &str = "CRITERIA_ENCRYPTION_KEY";
/// Optional replacement for the built-in examiner instruction.
pub const PROMPT_TEMPLATE: &str = "PROMPT_TEMPLATE";

/// Every secret name the application reads, in display order.
pub const KNOWN_SECRETS: [&str; 3] = [GOOGLE_API_KEY, CRITERIA_ENCRYPTION_KEY, PROMPT_TEMPLATE];

/// Storage backend a secret was resolved from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecretBackend {
    /// Process environment variable.
    Environment,
    /// `secrets.toml` in the data directory.
    File,
}

impl fmt::Display for SecretBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecretBackend::Environment => write!(f, "environment"),
            SecretBackend::File => write!(f, "file"),
        }
    }
}
