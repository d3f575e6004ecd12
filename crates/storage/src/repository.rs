use async_trait::async_trait;
use lesson_core::model::{ChapterId, QuizAttempt};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// A stored attempt together with its row id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizAttemptRow {
    pub id: i64,
    pub attempt: QuizAttempt,
}

impl QuizAttemptRow {
    #[must_use]
    pub fn new(id: i64, attempt: QuizAttempt) -> Self {
        Self { id, attempt }
    }
}

/// Repository contract for finished quiz attempts.
#[async_trait]
pub trait QuizAttemptRepository: Send + Sync {
    /// Persist an attempt and return its id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the attempt cannot be stored.
    async fn append_attempt(&self, attempt: &QuizAttempt) -> Result<i64, StorageError>;

    /// Fetch an attempt by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn get_attempt(&self, id: i64) -> Result<QuizAttempt, StorageError>;

    /// Attempts for a chapter, newest first, at most `limit` rows.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` for connection or mapping failures.
    async fn list_attempts(
        &self,
        chapter_id: ChapterId,
        limit: u32,
    ) -> Result<Vec<QuizAttemptRow>, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    attempts: Arc<Mutex<Vec<QuizAttemptRow>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QuizAttemptRepository for InMemoryRepository {
    async fn append_attempt(&self, attempt: &QuizAttempt) -> Result<i64, StorageError> {
        let mut guard = self
            .attempts
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let id = i64::try_from(guard.len())
            .map_err(|_| StorageError::Serialization("attempt id overflow".into()))?
            + 1;
        guard.push(QuizAttemptRow::new(id, attempt.clone()));
        Ok(id)
    }

    async fn get_attempt(&self, id: i64) -> Result<QuizAttempt, StorageError> {
        let guard = self
            .attempts
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard
            .iter()
            .find(|row| row.id == id)
            .map(|row| row.attempt.clone())
            .ok_or(StorageError::NotFound)
    }

    async fn list_attempts(
        &self,
        chapter_id: ChapterId,
        limit: u32,
    ) -> Result<Vec<QuizAttemptRow>, StorageError> {
        let guard = self
            .attempts
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let mut rows: Vec<_> = guard
            .iter()
            .filter(|row| row.attempt.chapter_id() == chapter_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            b.attempt
                .completed_at()
                .cmp(&a.attempt.completed_at())
                .then(b.id.cmp(&a.id))
        });
        rows.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(rows)
    }
}

/// Repositories behind trait objects so backends can be swapped.
#[derive(Clone)]
pub struct Storage {
    pub attempts: Arc<dyn QuizAttemptRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let attempts: Arc<dyn QuizAttemptRepository> = Arc::new(InMemoryRepository::new());
        Self { attempts }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use lesson_core::time::fixed_now;

    fn attempt(chapter: u64, minutes: i64, score: u32) -> QuizAttempt {
        let start = fixed_now();
        QuizAttempt::from_persisted(
            ChapterId::new(chapter),
            start,
            start + Duration::minutes(minutes),
            score,
            3,
            3,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn append_then_get_round_trips() {
        let repo = InMemoryRepository::new();
        let id = repo.append_attempt(&attempt(1, 2, 2)).await.unwrap();
        let fetched = repo.get_attempt(id).await.unwrap();
        assert_eq!(fetched.score(), 2);
        assert!(matches!(
            repo.get_attempt(id + 1).await,
            Err(StorageError::NotFound)
        ));
    }

    #[tokio::test]
    async fn list_is_newest_first_and_scoped_to_chapter() {
        let repo = InMemoryRepository::new();
        repo.append_attempt(&attempt(1, 1, 1)).await.unwrap();
        repo.append_attempt(&attempt(1, 5, 3)).await.unwrap();
        repo.append_attempt(&attempt(2, 9, 0)).await.unwrap();
        repo.append_attempt(&attempt(1, 3, 2)).await.unwrap();

        let rows = repo.list_attempts(ChapterId::new(1), 2).await.unwrap();
        let scores: Vec<_> = rows.iter().map(|row| row.attempt.score()).collect();
        assert_eq!(scores, vec![3, 2]);
    }
}
