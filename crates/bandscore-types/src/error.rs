use thiserror::Error;

use crate::session::WizardStep;

/// Errors from wizard transitions and input validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WizardError {
    #[error("cannot {action} from step {from}")]
    InvalidTransition { from: WizardStep, action: &'static str },

    #[error("no task selected")]
    NoTaskSelected,

    #[error("please enter both the question and your response")]
    EmptyInput,

    #[error("response has {count} words; at least {minimum} are required")]
    BelowMinimumWords { count: usize, minimum: usize },
}

/// Errors from locating, reading, or decrypting a descriptor file.
///
/// Messages never include descriptor plaintext or key material.
#[derive(Debug, Error)]
pub enum CriteriaError {
    #[error("criteria file not found: {0}")]
    NotFound(String),

    #[error("criteria file {0} is encrypted but no encryption key is configured")]
    KeyMissing(String),

    #[error("criteria file {0} uses the legacy Fernet format; re-encrypt the descriptors with `bandscore encrypt`")]
    LegacyFormat(String),

    #[error("failed to decrypt criteria file {path}: {reason}")]
    Decryption { path: String, reason: String },

    #[error("failed to read criteria file: {0}")]
    Io(String),
}

/// Errors from secret providers.
#[derive(Debug, Error)]
pub enum SecretError {
    #[error("failed to read secret store: {0}")]
    Read(String),

    #[error("malformed secret store: {0}")]
    Parse(String),
}

/// Errors surfaced to the user when an evaluation cannot be produced.
#[derive(Debug, Error)]
pub enum EvaluationError {
    #[error("please enter both the question and your response for evaluation")]
    MissingInput,

    #[error("{0} is not configured; add it to the environment or secrets.toml")]
    MissingCredential(&'static str),

    #[error("invalid prompt template: {0}")]
    InvalidTemplate(String),

    #[error(transparent)]
    Criteria(#[from] CriteriaError),

    #[error("model request failed: {0}")]
    Llm(#[from] crate::llm::LlmError),

    #[error(transparent)]
    Secret(#[from] SecretError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wizard_error_display() {
        let err = WizardError::InvalidTransition {
            from: WizardStep::SelectTask,
            action: "evaluate",
        };
        assert_eq!(err.to_string(), "cannot evaluate from step select-task");

        let err = WizardError::BelowMinimumWords {
            count: 120,
            minimum: 150,
        };
        assert!(err.to_string().contains("120"));
        assert!(err.to_string().contains("150"));
    }

    #[test]
    fn test_missing_credential_names_key() {
        let err = EvaluationError::MissingCredential("GOOGLE_API_KEY");
        assert!(err.to_string().starts_with("GOOGLE_API_KEY is not configured"));
    }

    #[test]
    fn test_criteria_error_display() {
        let err = CriteriaError::KeyMissing("tasks/x.json.enc".to_string());
        assert!(err.to_string().contains("tasks/x.json.enc"));
        assert!(err.to_string().contains("no encryption key"));
    }
}
