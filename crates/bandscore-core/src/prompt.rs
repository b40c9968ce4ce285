//! Examiner instruction template.
//!
//! Placeholders are `{task}`, `{criteria}`, `{question}`, `{response}` and
//! `{word_count}`. Substitution is single-pass, so text inside the question or
//! response that happens to look like a placeholder is left alone.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use bandscore_types::task::TaskVariant;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{(task|criteria|question|response|word_count)\}")
        .expect("placeholder pattern is valid")
});

/// Built-in instruction sent with every evaluation.
pub const DEFAULT_TEMPLATE: &str = r#"You are an IELTS Writing examiner assessing a {task} response.
Evaluate the response in the context of the question it answers. Judge it
against each of the four criteria below using only the band descriptors
provided, and give every criterion a score from 1 to 9.

Keep the feedback for each criterion short and limited to what its
descriptors mention.

Criteria:
1. Task Response (Task Achievement)
2. Coherence & Cohesion
3. Lexical Resource
4. Grammatical Range & Accuracy

Answer in this format:
- **Task Response**: [feedback, score out of 9]
- **Coherence & Cohesion**: [feedback, score out of 9]
- **Lexical Resource**: [feedback, score out of 9]
- **Grammatical Range & Accuracy**: [feedback, score out of 9]

Finish with the average of the four scores as the **Final band score**.

Band descriptors:
{criteria}

Question:
{question}

Response ({word_count} words):
{response}

Do not introduce interpretations beyond the descriptors above."#;

/// Values substituted into a [`PromptTemplate`].
#[derive(Debug, Clone)]
pub struct PromptInput<'a> {
    pub variant: TaskVariant,
    pub criteria: &'a str,
    pub question: &'a str,
    pub response: &'a str,
    pub word_count: usize,
}

/// An instruction template with named placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    text: String,
}

impl PromptTemplate {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// A template must place both the question and the response.
    pub fn validate(&self) -> Result<(), String> {
        for required in ["{question}", "{response}"] {
            if !self.text.contains(required) {
                return Err(format!("template is missing the {required} placeholder"));
            }
        }
        Ok(())
    }

    pub fn render(&self, input: &PromptInput<'_>) -> String {
        PLACEHOLDER
            .replace_all(&self.text, |caps: &Captures<'_>| match &caps[1] {
                "task" => input.variant.label().to_string(),
                "criteria" => input.criteria.to_string(),
                "question" => input.question.to_string(),
                "response" => input.response.to_string(),
                "word_count" => input.word_count.to_string(),
                other => format!("{{{other}}}"),
            })
            .into_owned()
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::new(DEFAULT_TEMPLATE)
    }
}
