use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Explanation text some content sources send when no real explanation exists.
pub const ANSWER_KEY_PLACEHOLDER: &str = "Answer Key Provided";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum McqError {
    #[error("question needs at least two options, got {count}")]
    TooFewOptions { count: usize },

    #[error("correct answer {correct} is outside {count} options")]
    CorrectAnswerOutOfRange { correct: usize, count: usize },
}

/// A multiple-choice question as supplied by the content source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McqQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl McqQuestion {
    pub fn new<I, S>(question: impl Into<String>, options: I, correct_answer: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            question: question.into(),
            options: options.into_iter().map(Into::into).collect(),
            correct_answer,
            explanation: None,
        }
    }

    #[must_use]
    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = Some(explanation.into());
        self
    }

    /// Checks the shape the quiz engine relies on.
    ///
    /// # Errors
    ///
    /// Returns `McqError::TooFewOptions` for fewer than two options and
    /// `McqError::CorrectAnswerOutOfRange` when the key points past the options.
    pub fn validate(&self) -> Result<(), McqError> {
        let count = self.options.len();
        if count < 2 {
            return Err(McqError::TooFewOptions { count });
        }
        if self.correct_answer >= count {
            return Err(McqError::CorrectAnswerOutOfRange {
                correct: self.correct_answer,
                count,
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn is_correct(&self, option: usize) -> bool {
        option == self.correct_answer
    }

    /// Explanation worth showing to the learner.
    ///
    /// Blank text and the answer-key placeholder count as "no explanation".
    #[must_use]
    pub fn displayable_explanation(&self) -> Option<&str> {
        let text = self.explanation.as_deref()?.trim();
        if text.is_empty() || text == ANSWER_KEY_PLACEHOLDER {
            return None;
        }
        Some(text)
    }
}
