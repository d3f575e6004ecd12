use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::ChapterId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizAttemptError {
    #[error("completed_at is before started_at")]
    InvalidTimeRange,

    #[error("too many questions for a single attempt: {len}")]
    TooManyQuestions { len: usize },

    #[error("answered ({answered}) exceeds total questions ({total})")]
    AnsweredExceedsTotal { answered: u32, total: u32 },

    #[error("score ({score}) exceeds answered questions ({answered})")]
    ScoreExceedsAnswered { score: u32, answered: u32 },
}

/// Record of one submitted quiz, as handed to persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizAttempt {
    chapter_id: ChapterId,
    started_at: DateTime<Utc>,
    completed_at: DateTime<Utc>,
    score: u32,
    answered: u32,
    total: u32,
}

impl QuizAttempt {
    /// Rehydrate an attempt from stored counters.
    ///
    /// # Errors
    ///
    /// Returns `QuizAttemptError` when the time range or counters are inconsistent.
    pub fn from_persisted(
        chapter_id: ChapterId,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
        score: u32,
        answered: u32,
        total: u32,
    ) -> Result<Self, QuizAttemptError> {
        if completed_at < started_at {
            return Err(QuizAttemptError::InvalidTimeRange);
        }
        if answered > total {
            return Err(QuizAttemptError::AnsweredExceedsTotal { answered, total });
        }
        if score > answered {
            return Err(QuizAttemptError::ScoreExceedsAnswered { score, answered });
        }

        Ok(Self {
            chapter_id,
            started_at,
            completed_at,
            score,
            answered,
            total,
        })
    }

    /// Build an attempt from in-memory session counters.
    ///
    /// # Errors
    ///
    /// Returns `QuizAttemptError::TooManyQuestions` if a counter cannot fit in `u32`,
    /// plus everything `from_persisted` checks.
    pub fn from_counts(
        chapter_id: ChapterId,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
        score: usize,
        answered: usize,
        total: usize,
    ) -> Result<Self, QuizAttemptError> {
        let narrow = |len: usize| {
            u32::try_from(len).map_err(|_| QuizAttemptError::TooManyQuestions { len })
        };
        Self::from_persisted(
            chapter_id,
            started_at,
            completed_at,
            narrow(score)?,
            narrow(answered)?,
            narrow(total)?,
        )
    }

    #[must_use]
    pub fn chapter_id(&self) -> ChapterId {
        self.chapter_id
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn answered(&self) -> u32 {
        self.answered
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    /// Score as a whole percentage of all questions, rounded down.
    #[must_use]
    pub fn percent(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        self.score.saturating_mul(100) / self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;
    use chrono::Duration;

    #[test]
    fn attempt_keeps_counts() {
        let now = fixed_now();
        let attempt =
            QuizAttempt::from_counts(ChapterId::new(4), now, now + Duration::minutes(3), 2, 3, 3)
                .unwrap();

        assert_eq!(attempt.score(), 2);
        assert_eq!(attempt.answered(), 3);
        assert_eq!(attempt.total(), 3);
        assert_eq!(attempt.percent(), 66);
    }

    #[test]
    fn completed_before_started_is_rejected() {
        let now = fixed_now();
        let err = QuizAttempt::from_persisted(
            ChapterId::new(1),
            now,
            now - Duration::seconds(1),
            0,
            0,
            1,
        )
        .unwrap_err();
        assert_eq!(err, QuizAttemptError::InvalidTimeRange);
    }

    #[test]
    fn inconsistent_counters_are_rejected() {
        let now = fixed_now();
        assert_eq!(
            QuizAttempt::from_persisted(ChapterId::new(1), now, now, 0, 4, 3).unwrap_err(),
            QuizAttemptError::AnsweredExceedsTotal {
                answered: 4,
                total: 3
            }
        );
        assert_eq!(
            QuizAttempt::from_persisted(ChapterId::new(1), now, now, 3, 2, 3).unwrap_err(),
            QuizAttemptError::ScoreExceedsAnswered {
                score: 3,
                answered: 2
            }
        );
    }
}
