use exam_core::model::{ScoreRecord, TaskId};

use super::SqliteRepository;
use super::mapping::{i64_from_u64, map_score_row};
use crate::repository::{ScoreRepository, StorageError};

#[async_trait::async_trait]
impl ScoreRepository for SqliteRepository {
    async fn append_score(&self, record: &ScoreRecord) -> Result<(), StorageError> {
        sqlx::query(
            r"
                INSERT INTO scores (
                    task_id, date, correct, total, pct, elapsed_seconds, question_file
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ",
        )
        .bind(record.task_id().as_str())
        .bind(record.date())
        .bind(i64::from(record.correct()))
        .bind(i64::from(record.total()))
        .bind(i64::from(record.pct()))
        .bind(i64_from_u64("elapsed_seconds", record.elapsed_seconds())?)
        .bind(record.question_file())
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(())
    }

    async fn list_scores(&self) -> Result<Vec<ScoreRecord>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT task_id, date, correct, total, pct, elapsed_seconds, question_file
                FROM scores
                ORDER BY id ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        rows.iter().map(map_score_row).collect()
    }

    async fn list_scores_for_task(&self, task: &TaskId) -> Result<Vec<ScoreRecord>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT task_id, date, correct, total, pct, elapsed_seconds, question_file
                FROM scores
                WHERE task_id = ?1
                ORDER BY id ASC
            ",
        )
        .bind(task.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        rows.iter().map(map_score_row).collect()
    }

    async fn clear_scores(&self) -> Result<(), StorageError> {
        let res = sqlx::query("DELETE FROM scores")
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        tracing::debug!(removed = res.rows_affected(), "cleared score history");
        Ok(())
    }
}
