use sqlx::SqlitePool;

/// Schema steps, applied in order. The database's `user_version` pragma
/// records how many have run.
const STEPS: &[&[&str]] = &[&[
    r"
        CREATE TABLE quiz_attempts (
            id INTEGER PRIMARY KEY,
            chapter_id INTEGER NOT NULL,
            started_at TEXT NOT NULL,
            completed_at TEXT NOT NULL,
            score INTEGER NOT NULL CHECK (score >= 0),
            answered INTEGER NOT NULL CHECK (answered >= score),
            total INTEGER NOT NULL CHECK (total >= answered)
        )
    ",
    r"
        CREATE INDEX idx_quiz_attempts_chapter_completed
            ON quiz_attempts (chapter_id, completed_at)
    ",
]];

/// Latest schema version this build knows.
pub(crate) const SCHEMA_VERSION: i64 = STEPS.len() as i64;

/// Run the steps the database has not seen yet and return the resulting version.
pub(crate) async fn upgrade(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
    let mut tx = pool.begin().await?;
    let current: i64 = sqlx::query_scalar("PRAGMA user_version")
        .fetch_one(&mut *tx)
        .await?;

    for (version, statements) in (1_i64..).zip(STEPS) {
        if version <= current {
            continue;
        }
        for statement in *statements {
            sqlx::query(statement).execute(&mut *tx).await?;
        }
        // PRAGMA does not take bound parameters.
        sqlx::query(&format!("PRAGMA user_version = {version}"))
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(current.max(SCHEMA_VERSION))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    #[tokio::test]
    async fn upgrade_runs_each_step_once() {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();

        assert_eq!(upgrade(&pool).await.unwrap(), SCHEMA_VERSION);
        // A second pass would fail on CREATE TABLE if it re-ran the steps.
        assert_eq!(upgrade(&pool).await.unwrap(), SCHEMA_VERSION);

        let version: i64 = sqlx::query_scalar("PRAGMA user_version")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(version, SCHEMA_VERSION);
    }
}
