use std::sync::Arc;

use tracing::{debug, info};

use exam_core::model::{ScoreRecord, TaskId};
use storage::repository::{InMemoryRepository, ScoreRepository};

use super::dashboard::Dashboard;
use crate::Clock;
use crate::error::ScoreServiceError;

/// Records finished sessions into the score history and reads them back.
#[derive(Clone)]
pub struct ScoreHistoryService {
    clock: Clock,
    scores: Arc<dyn ScoreRepository>,
}

impl ScoreHistoryService {
    #[must_use]
    pub fn new(clock: Clock, scores: Arc<dyn ScoreRepository>) -> Self {
        Self { clock, scores }
    }

    /// Service over a fresh in-memory history.
    #[must_use]
    pub fn in_memory(clock: Clock) -> Self {
        Self::new(clock, Arc::new(InMemoryRepository::new()))
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    /// Submit one finished session, dated with the service clock.
    ///
    /// Sessions without questions are not recorded and yield `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns `ScoreServiceError::Record` for inconsistent counts and
    /// `ScoreServiceError::Storage` if the backend rejects the record.
    pub async fn save_score(
        &self,
        task_id: &TaskId,
        correct: u32,
        total: u32,
        elapsed_seconds: u64,
        question_file: Option<&str>,
    ) -> Result<Option<ScoreRecord>, ScoreServiceError> {
        if total == 0 {
            debug!(task = %task_id, "no questions answered, score not recorded");
            return Ok(None);
        }

        let mut record = ScoreRecord::new(
            task_id.clone(),
            self.clock.now(),
            correct,
            total,
            elapsed_seconds,
        )?;
        if let Some(file) = question_file {
            record = record.with_question_file(file);
        }

        self.scores.append_score(&record).await?;
        info!(
            task = %task_id,
            correct,
            total,
            pct = record.pct(),
            elapsed_seconds,
            "score recorded"
        );
        Ok(Some(record))
    }

    /// Every recorded session, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `ScoreServiceError::Storage` on backend failures.
    pub async fn list_all(&self) -> Result<Vec<ScoreRecord>, ScoreServiceError> {
        Ok(self.scores.list_scores().await?)
    }

    /// Recorded sessions for one task, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `ScoreServiceError::Storage` on backend failures.
    pub async fn list_for_task(
        &self,
        task_id: &TaskId,
    ) -> Result<Vec<ScoreRecord>, ScoreServiceError> {
        Ok(self.scores.list_scores_for_task(task_id).await?)
    }

    /// Drop the whole history.
    ///
    /// # Errors
    ///
    /// Returns `ScoreServiceError::Storage` on backend failures.
    pub async fn clear_all(&self) -> Result<(), ScoreServiceError> {
        self.scores.clear_scores().await?;
        info!("score history cleared");
        Ok(())
    }

    /// Per-task aggregates over the whole history.
    ///
    /// # Errors
    ///
    /// Returns `ScoreServiceError::Storage` on backend failures.
    pub async fn dashboard(&self) -> Result<Dashboard, ScoreServiceError> {
        let records = self.scores.list_scores().await?;
        Ok(Dashboard::from_records(&records))
    }
}
