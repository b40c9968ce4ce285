//! Whitespace word counting and the per-task minimum check.

use bandscore_types::error::WizardError;
use bandscore_types::task::{TaskVariant, WordCountCheck, WordCountPolicy};

/// Count whitespace-separated tokens.
///
/// Hyphenated words count once and punctuation-only tokens count as words.
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Count the words of `text` and compare against the variant's minimum.
pub fn check_word_count(text: &str, variant: TaskVariant) -> WordCountCheck {
    let count = count_words(text);
    let minimum = variant.minimum_words();
    WordCountCheck {
        count,
        minimum,
        meets_minimum: count >= minimum,
    }
}

/// Apply a [`WordCountPolicy`] to a check result.
pub trait WordCountGate {
    /// `Blocking` rejects a response under the minimum; `Advisory` never does.
    fn gate(&self, policy: WordCountPolicy) -> Result<(), WizardError>;
}

impl WordCountGate for WordCountCheck {
    fn gate(&self, policy: WordCountPolicy) -> Result<(), WizardError> {
        match policy {
            WordCountPolicy::Blocking if !self.meets_minimum => {
                Err(WizardError::BelowMinimumWords {
                    count: self.count,
                    minimum: self.minimum,
                })
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(n: usize) -> String {
        vec!["word"; n].join(" ")
    }

    #[test]
    fn test_count_collapses_runs_of_whitespace() {
        assert_eq!(count_words("a b  c"), 3);
        assert_eq!(count_words("  leading and trailing  "), 3);
        assert_eq!(count_words("line one\nline\ttwo\r\n"), 4);
    }

    #[test]
    fn test_count_empty_and_blank() {
        assert_eq!(count_words(""), 0);
        assert_eq!(count_words(" \n\t "), 0);
    }

    #[test]
    fn test_count_has_no_token_rules() {
        assert_eq!(count_words("well-known fact , really"), 4);
        assert_eq!(count_words("-- ... !!"), 3);
    }

    #[test]
    fn test_check_against_task_minimum() {
        let check = check_word_count(&words(150), TaskVariant::Task1Academic);
        assert_eq!(check.count, 150);
        assert_eq!(check.minimum, 150);
        assert!(check.meets_minimum);

        let check = check_word_count(&words(249), TaskVariant::Task2);
        assert_eq!(check.minimum, 250);
        assert!(!check.meets_minimum);
    }

    #[test]
    fn test_advisory_never_blocks() {
        let check = check_word_count("too short", TaskVariant::Task2);
        assert!(check.gate(WordCountPolicy::Advisory).is_ok());
    }

    #[test]
    fn test_blocking_rejects_short_response() {
        let check = check_word_count("too short", TaskVariant::Task1GeneralTraining);
        assert_eq!(
            check.gate(WordCountPolicy::Blocking),
            Err(WizardError::BelowMinimumWords {
                count: 2,
                minimum: 150
            })
        );

        let check = check_word_count(&words(150), TaskVariant::Task1GeneralTraining);
        assert!(check.gate(WordCountPolicy::Blocking).is_ok());
    }
}
