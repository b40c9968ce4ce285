//! Wizard session record.
//!
//! One `EvaluationSession` per browser session, held in memory only. The
//! transition rules live in `bandscore-core::wizard`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

use crate::task::TaskVariant;

/// Unique identifier for a wizard session, wrapping a UUID v7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Stage of the linear select -> compose -> results flow.
///
/// Serialized as its step number (1-3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum WizardStep {
    SelectTask = 1,
    Compose = 2,
    Results = 3,
}

impl WizardStep {
    pub fn number(&self) -> u8 {
        *self as u8
    }
}

impl From<WizardStep> for u8 {
    fn from(step: WizardStep) -> Self {
        step.number()
    }
}

impl TryFrom<u8> for WizardStep {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(WizardStep::SelectTask),
            2 => Ok(WizardStep::Compose),
            3 => Ok(WizardStep::Results),
            other => Err(format!("invalid wizard step: {other}")),
        }
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WizardStep::SelectTask => write!(f, "select-task"),
            WizardStep::Compose => write!(f, "compose"),
            WizardStep::Results => write!(f, "results"),
        }
    }
}

/// Per-user wizard state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationSession {
    pub id: SessionId,
    /// Selected task; `None` until step 1 completes.
    pub variant: Option<TaskVariant>,
    pub question: String,
    pub response: String,
    pub step: WizardStep,
    /// Whitespace-token count of `response`, refreshed on every draft update.
    pub word_count: usize,
    /// Last model output, verbatim.
    pub feedback: Option<String>,
    /// Overall band parsed out of `feedback`, when the model stated one.
    pub band_score: Option<f32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated inputs handed from the wizard to the evaluation service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationInput {
    pub variant: TaskVariant,
    pub question: String,
    pub response: String,
    pub word_count: usize,
}

/// Result of one hosted-model evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evaluation {
    pub variant: TaskVariant,
    /// Model reply rendered as-is.
    pub feedback: String,
    pub band_score: Option<f32>,
    pub model: String,
    pub word_count: usize,
}
