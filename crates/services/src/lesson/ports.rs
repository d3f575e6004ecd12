//! Collaborators a `LessonSession` calls out to.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::mpsc;

use lesson_core::model::{ChapterId, QuizAttempt, QuizAttemptError};

/// Payload of the one completion event a quiz session emits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizCompletion {
    pub chapter_id: ChapterId,
    pub score: usize,
    pub answered: usize,
    pub total: usize,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

impl QuizCompletion {
    /// Convert into the record handed to persistence.
    ///
    /// # Errors
    ///
    /// Returns `QuizAttemptError` if the counters or timestamps are inconsistent.
    pub fn to_attempt(&self) -> Result<QuizAttempt, QuizAttemptError> {
        QuizAttempt::from_counts(
            self.chapter_id,
            self.started_at,
            self.completed_at,
            self.score,
            self.answered,
            self.total,
        )
    }
}

/// Receives the completion event. Called at most once per opened quiz.
pub trait CompletionSink {
    fn on_quiz_complete(&mut self, completion: &QuizCompletion);
}

impl<F> CompletionSink for F
where
    F: FnMut(&QuizCompletion),
{
    fn on_quiz_complete(&mut self, completion: &QuizCompletion) {
        self(completion);
    }
}

/// Forwards completion events into an mpsc channel, for hosts that persist
/// them asynchronously.
#[derive(Debug, Clone)]
pub struct ChannelSink(mpsc::Sender<QuizCompletion>);

impl ChannelSink {
    #[must_use]
    pub fn new(sender: mpsc::Sender<QuizCompletion>) -> Self {
        Self(sender)
    }
}

impl CompletionSink for ChannelSink {
    fn on_quiz_complete(&mut self, completion: &QuizCompletion) {
        if self.0.send(completion.clone()).is_err() {
            tracing::warn!(
                chapter_id = %completion.chapter_id,
                "completion receiver dropped, event lost"
            );
        }
    }
}

/// Receives the learner's request to leave the lesson.
pub trait Navigator {
    fn on_back(&mut self);
}

impl<F> Navigator for F
where
    F: FnMut(),
{
    fn on_back(&mut self) {
        self();
    }
}
