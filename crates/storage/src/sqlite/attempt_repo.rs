use lesson_core::model::{ChapterId, QuizAttempt};
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{chapter_id_from_i64, chapter_id_to_i64, ser, u32_from_i64};
use crate::repository::{QuizAttemptRepository, QuizAttemptRow, StorageError};

fn map_attempt_row(row: &sqlx::sqlite::SqliteRow) -> Result<QuizAttempt, StorageError> {
    let chapter_id = chapter_id_from_i64(row.try_get::<i64, _>("chapter_id").map_err(ser)?)?;
    let started_at = row.try_get("started_at").map_err(ser)?;
    let completed_at = row.try_get("completed_at").map_err(ser)?;
    let score = u32_from_i64("score", row.try_get::<i64, _>("score").map_err(ser)?)?;
    let answered = u32_from_i64("answered", row.try_get::<i64, _>("answered").map_err(ser)?)?;
    let total = u32_from_i64("total", row.try_get::<i64, _>("total").map_err(ser)?)?;

    QuizAttempt::from_persisted(chapter_id, started_at, completed_at, score, answered, total)
        .map_err(ser)
}

#[async_trait::async_trait]
impl QuizAttemptRepository for SqliteRepository {
    async fn append_attempt(&self, attempt: &QuizAttempt) -> Result<i64, StorageError> {
        let res = sqlx::query(
            r"
                INSERT INTO quiz_attempts (
                    chapter_id, started_at, completed_at, score, answered, total
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ",
        )
        .bind(chapter_id_to_i64(attempt.chapter_id())?)
        .bind(attempt.started_at())
        .bind(attempt.completed_at())
        .bind(i64::from(attempt.score()))
        .bind(i64::from(attempt.answered()))
        .bind(i64::from(attempt.total()))
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(res.last_insert_rowid())
    }

    async fn get_attempt(&self, id: i64) -> Result<QuizAttempt, StorageError> {
        let row = sqlx::query(
            r"
                SELECT chapter_id, started_at, completed_at, score, answered, total
                FROM quiz_attempts
                WHERE id = ?1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?
        .ok_or(StorageError::NotFound)?;

        map_attempt_row(&row)
    }

    async fn list_attempts(
        &self,
        chapter_id: ChapterId,
        limit: u32,
    ) -> Result<Vec<QuizAttemptRow>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT id, chapter_id, started_at, completed_at, score, answered, total
                FROM quiz_attempts
                WHERE chapter_id = ?1
                ORDER BY completed_at DESC, id DESC
                LIMIT ?2
            ",
        )
        .bind(chapter_id_to_i64(chapter_id)?)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let id: i64 = row.try_get("id").map_err(ser)?;
            out.push(QuizAttemptRow::new(id, map_attempt_row(&row)?));
        }
        Ok(out)
    }
}
