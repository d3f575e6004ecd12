use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

use lesson_core::model::{ChapterId, QuizAttempt};
use storage::repository::{InMemoryRepository, QuizAttemptRepository};

use crate::Clock;
use crate::error::AttemptServiceError;
use crate::lesson::QuizCompletion;

/// Storage identifier for a persisted attempt (`SQLite` row id).
pub type QuizAttemptId = i64;

/// Upper bound of rows scanned when looking for a best score.
const BEST_SCORE_SCAN_LIMIT: u32 = 500;

/// Presentation-agnostic list item for a finished quiz.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizAttemptListItem {
    pub id: QuizAttemptId,
    pub completed_at: DateTime<Utc>,
    pub score: u32,
    pub total: u32,
    pub percent: u32,
}

impl QuizAttemptListItem {
    #[must_use]
    pub fn from_attempt(id: QuizAttemptId, attempt: &QuizAttempt) -> Self {
        Self {
            id,
            completed_at: attempt.completed_at(),
            score: attempt.score(),
            total: attempt.total(),
            percent: attempt.percent(),
        }
    }
}

/// Records completion events and answers history queries.
///
/// This is the persistence collaborator behind a `CompletionSink`; the lesson
/// session itself never touches storage.
#[derive(Clone)]
pub struct QuizAttemptService {
    clock: Clock,
    attempts: Arc<dyn QuizAttemptRepository>,
}

impl QuizAttemptService {
    #[must_use]
    pub fn new(clock: Clock, attempts: Arc<dyn QuizAttemptRepository>) -> Self {
        Self { clock, attempts }
    }

    #[must_use]
    pub fn in_memory(clock: Clock) -> Self {
        Self::new(clock, Arc::new(InMemoryRepository::new()))
    }

    /// Persist one completion event.
    ///
    /// # Errors
    ///
    /// Returns `AttemptServiceError::Attempt` if the event's counters are
    /// inconsistent and `AttemptServiceError::Storage` on repository failures.
    pub async fn record(
        &self,
        completion: &QuizCompletion,
    ) -> Result<QuizAttemptId, AttemptServiceError> {
        let attempt = completion.to_attempt()?;
        let id = self.attempts.append_attempt(&attempt).await?;
        tracing::debug!(
            attempt_id = id,
            chapter_id = %completion.chapter_id,
            score = completion.score,
            "quiz attempt stored"
        );
        Ok(id)
    }

    /// Attempts for a chapter completed within the last `days`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `AttemptServiceError::Storage` on repository failures.
    pub async fn list_recent(
        &self,
        chapter_id: ChapterId,
        days: i64,
        limit: u32,
    ) -> Result<Vec<QuizAttemptListItem>, AttemptServiceError> {
        let cutoff = self.clock.now() - Duration::days(days.max(0));
        let rows = self.attempts.list_attempts(chapter_id, limit).await?;
        Ok(rows
            .iter()
            .filter(|row| row.attempt.completed_at() >= cutoff)
            .map(|row| QuizAttemptListItem::from_attempt(row.id, &row.attempt))
            .collect())
    }

    /// Highest-scoring attempt for a chapter; ties go to the most recent one.
    ///
    /// # Errors
    ///
    /// Returns `AttemptServiceError::Storage` on repository failures.
    pub async fn best_score(
        &self,
        chapter_id: ChapterId,
    ) -> Result<Option<QuizAttemptListItem>, AttemptServiceError> {
        let rows = self
            .attempts
            .list_attempts(chapter_id, BEST_SCORE_SCAN_LIMIT)
            .await?;
        // Rows are newest first; `max_by_key` keeps the last maximum, so reverse.
        Ok(rows
            .iter()
            .rev()
            .max_by_key(|row| (row.attempt.percent(), row.attempt.score()))
            .map(|row| QuizAttemptListItem::from_attempt(row.id, &row.attempt)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lesson_core::time::{fixed_clock, fixed_now};

    fn completion(chapter: u64, days_ago: i64, score: usize) -> QuizCompletion {
        let completed_at = fixed_now() - Duration::days(days_ago);
        QuizCompletion {
            chapter_id: ChapterId::new(chapter),
            score,
            answered: 4,
            total: 4,
            started_at: completed_at - Duration::minutes(5),
            completed_at,
        }
    }

    #[tokio::test]
    async fn record_stores_attempt() {
        let service = QuizAttemptService::in_memory(fixed_clock());
        let id = service.record(&completion(1, 0, 3)).await.unwrap();

        let items = service.list_recent(ChapterId::new(1), 1, 10).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, id);
        assert_eq!(items[0].score, 3);
        assert_eq!(items[0].percent, 75);
    }

    #[tokio::test]
    async fn inconsistent_completion_is_rejected() {
        let service = QuizAttemptService::in_memory(fixed_clock());
        let mut bad = completion(1, 0, 3);
        bad.answered = 2;
        let err = service.record(&bad).await.unwrap_err();
        assert!(matches!(err, AttemptServiceError::Attempt(_)));
    }

    #[tokio::test]
    async fn list_recent_drops_old_attempts() {
        let service = QuizAttemptService::in_memory(fixed_clock());
        service.record(&completion(1, 1, 1)).await.unwrap();
        service.record(&completion(1, 30, 4)).await.unwrap();

        let items = service.list_recent(ChapterId::new(1), 7, 10).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].score, 1);
    }

    #[tokio::test]
    async fn best_score_prefers_latest_on_tie() {
        let service = QuizAttemptService::in_memory(fixed_clock());
        service.record(&completion(2, 3, 2)).await.unwrap();
        let newer = service.record(&completion(2, 1, 2)).await.unwrap();
        service.record(&completion(2, 2, 1)).await.unwrap();

        let best = service.best_score(ChapterId::new(2)).await.unwrap().unwrap();
        assert_eq!(best.id, newer);

        assert!(service.best_score(ChapterId::new(9)).await.unwrap().is_none());
    }
}
