//! A learnable word: the term the learner types, what is shown as the
//! prompt, and its review state.
use super::ReviewState;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub term: String,
    pub definition: String,
    #[serde(default)]
    pub example: Option<String>,
    #[serde(default)]
    pub review: ReviewState,
}

impl Word {
    pub fn new(term: impl Into<String>, definition: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            definition: definition.into(),
            example: None,
            review: ReviewState::default(),
        }
    }

    pub fn with_example(mut self, example: impl Into<String>) -> Self {
        self.example = Some(example.into());
        self
    }

    pub fn with_review(mut self, review: ReviewState) -> Self {
        self.review = review;
        self
    }

    /// Case-insensitive identity of the word.
    pub fn key(&self) -> String {
        normalize(&self.term)
    }

    /// Words without a usable term cannot be quizzed.
    pub fn is_malformed(&self) -> bool {
        self.term.trim().is_empty()
    }
}

/// Trim and lowercase, used for both terms and typed answers.
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_creation() {
        let word = Word::new("hello", "a greeting").with_example("Hello there!");

        assert_eq!(word.term, "hello");
        assert_eq!(word.definition, "a greeting");
        assert_eq!(word.example.as_deref(), Some("Hello there!"));
        assert_eq!(word.review.reps(), 0);
    }

    #[test]
    fn test_key_is_case_insensitive() {
        let a = Word::new("  Hello ", "x");
        let b = Word::new("hello", "y");
        assert_eq!(a.key(), b.key());
    }

    #[test]
    fn test_blank_term_is_malformed() {
        assert!(Word::new("   ", "orphan definition").is_malformed());
        assert!(!Word::new("ok", "").is_malformed());
    }
}
