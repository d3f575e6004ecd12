//! Quiz progress for one lesson session.
//!
//! Answers are write-once and submission is terminal. `QuizEngine::submit`
//! reports `Submission::Completed` exactly once per engine, which is what
//! callers key the completion event on.

use serde::Serialize;
use thiserror::Error;

use crate::model::{McqError, McqQuestion};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizError {
    #[error("quiz has no questions")]
    NoQuestions,

    #[error("question {index} is malformed: {source}")]
    InvalidQuestion {
        index: usize,
        #[source]
        source: McqError,
    },

    #[error("answer index out of range (question {question}, option {option})")]
    InvalidIndex { question: usize, option: usize },
}

//
// ─── STATE & PROJECTIONS ───────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizPhase {
    InProgress,
    Finished,
}

/// Selected option per question, dense over `[0, total)`.
///
/// A slot can be filled once; later writes are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct McqAnswerState {
    slots: Vec<Option<usize>>,
}

impl McqAnswerState {
    #[must_use]
    pub fn new(total: usize) -> Self {
        Self {
            slots: vec![None; total],
        }
    }

    #[must_use]
    pub fn get(&self, question: usize) -> Option<usize> {
        self.slots.get(question).copied().flatten()
    }

    #[must_use]
    pub fn is_answered(&self, question: usize) -> bool {
        self.get(question).is_some()
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Returns `false` if the slot was already taken or does not exist.
    fn record(&mut self, question: usize, option: usize) -> bool {
        match self.slots.get_mut(question) {
            Some(slot) if slot.is_none() => {
                *slot = Some(option);
                true
            }
            _ => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<usize>> + '_ {
        self.slots.iter().copied()
    }
}

/// Derived score snapshot; recomputed from the answer state on every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuizSessionResult {
    pub score: usize,
    pub total: usize,
    pub answered_count: usize,
    pub finished: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerOutcome {
    Recorded { correct: bool },
    /// The question already had an answer; nothing changed.
    AlreadyAnswered,
    /// The quiz was submitted; nothing changed.
    Locked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// First submit of this engine. Emit the completion event for this one only.
    Completed(QuizSessionResult),
    AlreadyFinished(QuizSessionResult),
}

impl Submission {
    #[must_use]
    pub fn result(&self) -> QuizSessionResult {
        match self {
            Submission::Completed(result) | Submission::AlreadyFinished(result) => *result,
        }
    }

    #[must_use]
    pub fn is_first(&self) -> bool {
        matches!(self, Submission::Completed(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionMark {
    Correct,
    SelectedWrong,
    Neutral,
}

/// Feedback for one question once it is answered or the quiz is over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionReview<'a> {
    pub question: &'a McqQuestion,
    pub selected: Option<usize>,
    pub marks: Vec<OptionMark>,
    pub explanation: Option<&'a str>,
}

/// Mark every option of `question` given the learner's selection.
#[must_use]
pub fn mark_options(question: &McqQuestion, selected: Option<usize>) -> Vec<OptionMark> {
    (0..question.options.len())
        .map(|option| {
            if question.is_correct(option) {
                OptionMark::Correct
            } else if selected == Some(option) {
                OptionMark::SelectedWrong
            } else {
                OptionMark::Neutral
            }
        })
        .collect()
}

//
// ─── ENGINE ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone)]
pub struct QuizEngine {
    questions: Vec<McqQuestion>,
    answers: McqAnswerState,
    phase: QuizPhase,
}

impl QuizEngine {
    /// Start a quiz over `questions`.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NoQuestions` for an empty list and
    /// `QuizError::InvalidQuestion` for the first malformed question.
    pub fn new(questions: Vec<McqQuestion>) -> Result<Self, QuizError> {
        if questions.is_empty() {
            return Err(QuizError::NoQuestions);
        }
        for (index, question) in questions.iter().enumerate() {
            question
                .validate()
                .map_err(|source| QuizError::InvalidQuestion { index, source })?;
        }

        Ok(Self {
            answers: McqAnswerState::new(questions.len()),
            questions,
            phase: QuizPhase::InProgress,
        })
    }

    #[must_use]
    pub fn questions(&self) -> &[McqQuestion] {
        &self.questions
    }

    #[must_use]
    pub fn answers(&self) -> &McqAnswerState {
        &self.answers
    }

    #[must_use]
    pub fn phase(&self) -> QuizPhase {
        self.phase
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.phase == QuizPhase::Finished
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.answers.answered_count()
    }

    #[must_use]
    pub fn selected(&self, question: usize) -> Option<usize> {
        self.answers.get(question)
    }

    /// Record the learner's choice for `question`.
    ///
    /// Repeated answers and answers after submission are no-ops.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidIndex` if either index is out of range. State is
    /// left untouched.
    pub fn answer(&mut self, question: usize, option: usize) -> Result<AnswerOutcome, QuizError> {
        let Some(q) = self.questions.get(question) else {
            return Err(QuizError::InvalidIndex { question, option });
        };
        if option >= q.options.len() {
            return Err(QuizError::InvalidIndex { question, option });
        }
        let correct = q.is_correct(option);

        if self.is_finished() {
            return Ok(AnswerOutcome::Locked);
        }
        if !self.answers.record(question, option) {
            return Ok(AnswerOutcome::AlreadyAnswered);
        }
        Ok(AnswerOutcome::Recorded { correct })
    }

    /// Number of answered questions whose selection matches the key.
    #[must_use]
    pub fn score(&self) -> usize {
        self.questions
            .iter()
            .zip(self.answers.iter())
            .filter(|(question, selected)| selected.is_some_and(|s| question.is_correct(s)))
            .count()
    }

    #[must_use]
    pub fn result(&self) -> QuizSessionResult {
        QuizSessionResult {
            score: self.score(),
            total: self.total(),
            answered_count: self.answered_count(),
            finished: self.is_finished(),
        }
    }

    /// Finish the quiz. Safe to call any number of times.
    pub fn submit(&mut self) -> Submission {
        if self.is_finished() {
            return Submission::AlreadyFinished(self.result());
        }
        self.phase = QuizPhase::Finished;
        Submission::Completed(self.result())
    }

    /// Feedback for `question`, once it has an answer or the quiz is finished.
    #[must_use]
    pub fn review(&self, question: usize) -> Option<QuestionReview<'_>> {
        let q = self.questions.get(question)?;
        let selected = self.answers.get(question);
        if selected.is_none() && !self.is_finished() {
            return None;
        }
        Some(QuestionReview {
            question: q,
            selected,
            marks: mark_options(q, selected),
            explanation: q.displayable_explanation(),
        })
    }
}
