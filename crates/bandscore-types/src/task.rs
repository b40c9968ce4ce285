//! IELTS writing task variants and the word-count policy.
//!
//! Each variant owns its descriptor file name and its minimum word count.
//! Descriptor contents are opaque prompt text; only the file name lives here.

use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

/// One of the fixed IELTS writing task categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskVariant {
    #[serde(rename = "task1-academic")]
    Task1Academic,
    #[serde(rename = "task1-general")]
    Task1GeneralTraining,
    #[serde(rename = "task2")]
    Task2,
}

impl TaskVariant {
    /// All variants in display order.
    pub const ALL: [TaskVariant; 3] = [
        TaskVariant::Task1Academic,
        TaskVariant::Task1GeneralTraining,
        TaskVariant::Task2,
    ];

    /// Stable machine tag used on the CLI and in the HTTP API.
    pub fn tag(&self) -> &'static str {
        match self {
            TaskVariant::Task1Academic => "task1-academic",
            TaskVariant::Task1GeneralTraining => "task1-general",
            TaskVariant::Task2 => "task2",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            TaskVariant::Task1Academic => "Task 1 Academic",
            TaskVariant::Task1GeneralTraining => "Task 1 General Training",
            TaskVariant::Task2 => "Task 2",
        }
    }

    /// Plaintext band-descriptor file name for this variant.
    ///
    /// The encrypted sibling is the same name with `.enc` appended.
    pub fn descriptor_file(&self) -> &'static str {
        match self {
            TaskVariant::Task1Academic => "Academic_IELTS_Writing_Task_1_Band_Descriptors.json",
            TaskVariant::Task1GeneralTraining => {
                "General_Training_IELTS_Writing_Task_1_Band_Descriptors.json"
            }
            TaskVariant::Task2 => "IELTS_Writing_Task_2_Band_Descriptors.json",
        }
    }

    /// Minimum number of words the exam expects for this task.
    pub fn minimum_words(&self) -> usize {
        match self {
            TaskVariant::Task1Academic | TaskVariant::Task1GeneralTraining => 150,
            TaskVariant::Task2 => 250,
        }
    }
}

impl fmt::Display for TaskVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

impl FromStr for TaskVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "task1-academic" | "task1" | "academic" => Ok(TaskVariant::Task1Academic),
            "task1-general" | "general" | "general-training" => {
                Ok(TaskVariant::Task1GeneralTraining)
            }
            "task2" => Ok(TaskVariant::Task2),
            other => Err(format!("unknown task variant: '{other}'")),
        }
    }
}

/// Whether the minimum word count blocks evaluation or is only displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WordCountPolicy {
    #[default]
    Advisory,
    Blocking,
}

impl fmt::Display for WordCountPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WordCountPolicy::Advisory => write!(f, "advisory"),
            WordCountPolicy::Blocking => write!(f, "blocking"),
        }
    }
}

/// Outcome of counting the words of a response against its task minimum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordCountCheck {
    pub count: usize,
    pub minimum: usize,
    pub meets_minimum: bool,
}
