use async_trait::async_trait;
use exam_core::model::{ScoreRecord, TaskId};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Score history contract.
///
/// Records come back in the order they were appended.
#[async_trait]
pub trait ScoreRepository: Send + Sync {
    /// Append one completed session.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be stored.
    async fn append_score(&self, record: &ScoreRecord) -> Result<(), StorageError>;

    /// Every stored record, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend or decoding failures.
    async fn list_scores(&self) -> Result<Vec<ScoreRecord>, StorageError>;

    /// Records for a single task, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend or decoding failures.
    async fn list_scores_for_task(&self, task: &TaskId) -> Result<Vec<ScoreRecord>, StorageError> {
        let all = self.list_scores().await?;
        Ok(all.into_iter().filter(|r| r.task_id() == task).collect())
    }

    /// Remove every record.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend rejects the delete.
    async fn clear_scores(&self) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    scores: Arc<Mutex<Vec<ScoreRecord>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self {
            scores: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl ScoreRepository for InMemoryRepository {
    async fn append_score(&self, record: &ScoreRecord) -> Result<(), StorageError> {
        let mut guard = self
            .scores
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.push(record.clone());
        Ok(())
    }

    async fn list_scores(&self) -> Result<Vec<ScoreRecord>, StorageError> {
        let guard = self
            .scores
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.clone())
    }

    async fn clear_scores(&self) -> Result<(), StorageError> {
        let mut guard = self
            .scores
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.clear();
        Ok(())
    }
}

/// Score history behind a trait object for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub scores: Arc<dyn ScoreRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let scores: Arc<dyn ScoreRepository> = Arc::new(InMemoryRepository::new());
        Self { scores }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exam_core::time::fixed_now;

    fn record(task: &str, correct: u32, total: u32) -> ScoreRecord {
        ScoreRecord::new(TaskId::new(task).unwrap(), fixed_now(), correct, total, 30).unwrap()
    }

    #[tokio::test]
    async fn keeps_insertion_order() {
        let repo = InMemoryRepository::new();
        repo.append_score(&record("toeic/part5", 3, 5)).await.unwrap();
        repo.append_score(&record("toeic/part6", 4, 5)).await.unwrap();
        repo.append_score(&record("toeic/part5", 5, 5)).await.unwrap();

        let all = repo.list_scores().await.unwrap();
        let pcts: Vec<u32> = all.iter().map(ScoreRecord::pct).collect();
        assert_eq!(pcts, vec![60, 80, 100]);
    }

    #[tokio::test]
    async fn filters_by_task_and_clears() {
        let repo = InMemoryRepository::new();
        repo.append_score(&record("toeic/part5", 3, 5)).await.unwrap();
        repo.append_score(&record("toeic/part6", 4, 5)).await.unwrap();

        let part5 = TaskId::new("toeic/part5").unwrap();
        let only = repo.list_scores_for_task(&part5).await.unwrap();
        assert_eq!(only.len(), 1);
        assert_eq!(only[0].task_id(), &part5);

        repo.clear_scores().await.unwrap();
        assert!(repo.list_scores().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn storage_shares_one_backend() {
        let storage = Storage::in_memory();
        let clone = storage.clone();
        storage
            .scores
            .append_score(&record("toeic/part7", 1, 2))
            .await
            .unwrap();
        assert_eq!(clone.scores.list_scores().await.unwrap().len(), 1);
    }
}
