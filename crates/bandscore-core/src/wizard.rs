//! Wizard state transitions for `EvaluationSession`.
//!
//! The session record lives in `bandscore-types`; this module provides the
//! extension trait `WizardExt` with the only operations allowed to move a
//! session between steps:
//!
//! ```text
//! SelectTask --select_task--> Compose --complete_evaluation--> Results
//!      ^                        |  ^                              |
//!      +----------back----------+  +------------back--------------+
//! any step --restart--> SelectTask
//! ```
//!
//! Extension-trait pattern because inherent impls are not allowed on a type
//! defined in another crate.

use chrono::Utc;

use bandscore_types::error::WizardError;
use bandscore_types::session::{EvaluationInput, EvaluationSession, SessionId, WizardStep};
use bandscore_types::task::{TaskVariant, WordCountPolicy};

use crate::evaluation::extract_band_score;
use crate::word_count::{WordCountGate, check_word_count, count_words};

/// Create a fresh session at step 1.
pub fn new_session() -> EvaluationSession {
    let now = Utc::now();
    EvaluationSession {
        id: SessionId::new(),
        variant: None,
        question: String::new(),
        response: String::new(),
        step: WizardStep::SelectTask,
        word_count: 0,
        feedback: None,
        band_score: None,
        created_at: now,
        updated_at: now,
    }
}

/// Lifecycle operations for a wizard session.
pub trait WizardExt {
    /// Choose the task variant and move to the compose step.
    ///
    /// Allowed from `SelectTask`, and from `Compose` to switch task mid-draft.
    fn select_task(&mut self, variant: TaskVariant) -> Result<(), WizardError>;

    /// Store the question and response text. Only valid while composing.
    ///
    /// Changing either text drops the previous feedback, which no longer
    /// describes the draft.
    fn update_draft(&mut self, question: String, response: String) -> Result<(), WizardError>;

    /// Validate the draft for evaluation without changing step.
    fn begin_evaluation(&self, policy: WordCountPolicy) -> Result<EvaluationInput, WizardError>;

    /// Record the model output and move to the results step.
    fn complete_evaluation(&mut self, feedback: String) -> Result<(), WizardError>;

    /// Step back one stage, keeping the entered text.
    fn back(&mut self) -> Result<WizardStep, WizardError>;

    /// Return to step 1 and clear everything except identity.
    fn restart(&mut self);
}

impl WizardExt for EvaluationSession {
    fn select_task(&mut self, variant: TaskVariant) -> Result<(), WizardError> {
        match self.step {
            WizardStep::SelectTask | WizardStep::Compose => {
                if self.variant != Some(variant) {
                    self.feedback = None;
                    self.band_score = None;
                }
                self.variant = Some(variant);
                self.step = WizardStep::Compose;
                touch(self);
                Ok(())
            }
            from => Err(WizardError::InvalidTransition {
                from,
                action: "select a task",
            }),
        }
    }

    fn update_draft(&mut self, question: String, response: String) -> Result<(), WizardError> {
        if self.step != WizardStep::Compose {
            return Err(WizardError::InvalidTransition {
                from: self.step,
                action: "edit the draft",
            });
        }
        if question != self.question || response != self.response {
            self.feedback = None;
            self.band_score = None;
        }
        self.word_count = count_words(&response);
        self.question = question;
        self.response = response;
        touch(self);
        Ok(())
    }

    fn begin_evaluation(&self, policy: WordCountPolicy) -> Result<EvaluationInput, WizardError> {
        if self.step != WizardStep::Compose {
            return Err(WizardError::InvalidTransition {
                from: self.step,
                action: "evaluate",
            });
        }
        let variant = self.variant.ok_or(WizardError::NoTaskSelected)?;
        if self.question.trim().is_empty() || self.response.trim().is_empty() {
            return Err(WizardError::EmptyInput);
        }

        let check = check_word_count(&self.response, variant);
        check.gate(policy)?;

        Ok(EvaluationInput {
            variant,
            question: self.question.clone(),
            response: self.response.clone(),
            word_count: check.count,
        })
    }

    fn complete_evaluation(&mut self, feedback: String) -> Result<(), WizardError> {
        if self.step != WizardStep::Compose {
            return Err(WizardError::InvalidTransition {
                from: self.step,
                action: "show results",
            });
        }
        self.band_score = extract_band_score(&feedback);
        self.feedback = Some(feedback);
        self.step = WizardStep::Results;
        touch(self);
        Ok(())
    }

    fn back(&mut self) -> Result<WizardStep, WizardError> {
        let previous = match self.step {
            WizardStep::Results => WizardStep::Compose,
            WizardStep::Compose => WizardStep::SelectTask,
            WizardStep::SelectTask => {
                return Err(WizardError::InvalidTransition {
                    from: WizardStep::SelectTask,
                    action: "go back",
                });
            }
        };
        self.step = previous;
        touch(self);
        Ok(previous)
    }

    fn restart(&mut self) {
        self.variant = None;
        self.question.clear();
        self.response.clear();
        self.word_count = 0;
        self.feedback = None;
        self.band_score = None;
        self.step = WizardStep::SelectTask;
        touch(self);
    }
}

fn touch(session: &mut EvaluationSession) {
    session.updated_at = Utc::now();
}
