//! Application error type mapping to HTTP status codes and envelope format.

use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use bandscore_types::error::{EvaluationError, WizardError};

use crate::http::response::{ApiResponse, status_for_code};

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Rejected wizard action or invalid draft.
    Wizard(WizardError),
    /// Failure while producing an evaluation.
    Evaluation(EvaluationError),
    SessionNotFound(String),
    /// The session moved on while an evaluation was in flight.
    Conflict(String),
    Validation(String),
}

impl From<WizardError> for AppError {
    fn from(e: WizardError) -> Self {
        AppError::Wizard(e)
    }
}

impl From<EvaluationError> for AppError {
    fn from(e: EvaluationError) -> Self {
        AppError::Evaluation(e)
    }
}

impl AppError {
    /// Machine-readable code; the HTTP status is derived from it.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Wizard(WizardError::EmptyInput | WizardError::BelowMinimumWords { .. }) => {
                "VALIDATION_ERROR"
            }
            AppError::Wizard(_) | AppError::Conflict(_) => "INVALID_TRANSITION",
            AppError::Evaluation(EvaluationError::MissingInput) => "VALIDATION_ERROR",
            AppError::Evaluation(EvaluationError::MissingCredential(_)) => "MISSING_CREDENTIAL",
            AppError::Evaluation(EvaluationError::Criteria(_)) => "CRITERIA_ERROR",
            AppError::Evaluation(EvaluationError::Llm(_)) => "LLM_ERROR",
            AppError::Evaluation(EvaluationError::InvalidTemplate(_)) => "CONFIGURATION_ERROR",
            AppError::Evaluation(EvaluationError::Secret(_)) => "SECRET_ERROR",
            AppError::SessionNotFound(_) => "SESSION_NOT_FOUND",
            AppError::Validation(_) => "VALIDATION_ERROR",
        }
    }

    pub fn message(&self) -> String {
        match self {
            AppError::Wizard(e) => e.to_string(),
            AppError::Evaluation(e) => e.to_string(),
            AppError::SessionNotFound(id) => format!("Session '{id}' not found"),
            AppError::Conflict(msg) | AppError::Validation(msg) => msg.clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.code();
        let message = self.message();

        if status_for_code(code).is_server_error() {
            tracing::warn!(code, "{message}");
        }

        ApiResponse::error(code, &message, Uuid::now_v7().to_string(), 0).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    use bandscore_types::error::CriteriaError;
    use bandscore_types::llm::LlmError;
    use bandscore_types::session::WizardStep;

    fn status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_wizard_errors() {
        assert_eq!(status(WizardError::EmptyInput.into()), StatusCode::BAD_REQUEST);
        assert_eq!(
            status(
                WizardError::BelowMinimumWords {
                    count: 10,
                    minimum: 250
                }
                .into()
            ),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status(
                WizardError::InvalidTransition {
                    from: WizardStep::SelectTask,
                    action: "evaluate"
                }
                .into()
            ),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_evaluation_errors() {
        assert_eq!(
            status(EvaluationError::MissingCredential("GOOGLE_API_KEY").into()),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status(EvaluationError::Criteria(CriteriaError::KeyMissing("x.enc".into())).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status(EvaluationError::Llm(LlmError::AuthenticationFailed).into()),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(status(EvaluationError::MissingInput.into()), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_missing_credential_message_names_key() {
        let err = AppError::from(EvaluationError::MissingCredential("GOOGLE_API_KEY"));
        assert_eq!(err.code(), "MISSING_CREDENTIAL");
        assert!(err.message().contains("GOOGLE_API_KEY"));
    }
}
