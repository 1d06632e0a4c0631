use tracing::debug;

use exam_core::model::{ScoreRecord, TaskId};
use exam_core::{AdaptiveSession, Phase, Stopwatch};

use crate::error::ExamLoopError;
use crate::scores::ScoreHistoryService;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Submission {
    Pending,
    /// Submitted; `None` when the session had no questions to record.
    Done(Option<ScoreRecord>),
}

/// One adaptive exam screen: the two-module session, its stopwatch and the
/// score submission at the end.
pub struct AdaptiveExamLoop {
    task_id: TaskId,
    question_file: Option<String>,
    session: AdaptiveSession,
    stopwatch: Stopwatch,
    history: ScoreHistoryService,
    submission: Submission,
}

impl AdaptiveExamLoop {
    #[must_use]
    pub fn new(task_id: TaskId, history: ScoreHistoryService) -> Self {
        Self {
            task_id,
            question_file: None,
            session: AdaptiveSession::new(),
            stopwatch: Stopwatch::new(history.clock()),
            history,
            submission: Submission::Pending,
        }
    }

    #[must_use]
    pub fn with_question_file(mut self, file: impl Into<String>) -> Self {
        self.question_file = Some(file.into());
        self
    }

    #[must_use]
    pub fn task_id(&self) -> &TaskId {
        &self.task_id
    }

    #[must_use]
    pub fn session(&self) -> &AdaptiveSession {
        &self.session
    }

    #[must_use]
    pub fn stopwatch(&self) -> &Stopwatch {
        &self.stopwatch
    }

    pub fn stopwatch_mut(&mut self) -> &mut Stopwatch {
        &mut self.stopwatch
    }

    #[must_use]
    pub fn is_submitted(&self) -> bool {
        matches!(self.submission, Submission::Done(_))
    }

    /// Record stored for this session, if any.
    #[must_use]
    pub fn submitted_record(&self) -> Option<&ScoreRecord> {
        match &self.submission {
            Submission::Done(record) => record.as_ref(),
            Submission::Pending => None,
        }
    }

    pub fn start(&mut self) {
        self.stopwatch.start();
    }

    pub fn answer(&mut self, correct: bool) {
        self.session.record_answer(correct);
    }

    pub fn finish_module1(&mut self) {
        self.session.finish_module1();
    }

    pub fn start_module2(&mut self) {
        self.session.start_module2();
    }

    /// Complete the session and submit its score.
    ///
    /// # Errors
    ///
    /// Returns `ExamLoopError::NotComplete` if module 2 was not in progress and
    /// `ExamLoopError::Score` if the submission fails; retry with [`Self::finalize`].
    pub async fn finish_module2(&mut self) -> Result<Option<ScoreRecord>, ExamLoopError> {
        self.session.finish_module2();
        self.finalize().await
    }

    /// Submit the completed session unless it was already submitted.
    ///
    /// # Errors
    ///
    /// Returns `ExamLoopError::NotComplete` before the session completes and
    /// `ExamLoopError::Score` if persistence fails.
    pub async fn finalize(&mut self) -> Result<Option<ScoreRecord>, ExamLoopError> {
        if let Submission::Done(record) = &self.submission {
            return Ok(record.clone());
        }
        if self.session.phase() != Phase::Complete {
            return Err(ExamLoopError::NotComplete);
        }

        let elapsed = self.stopwatch.stop();
        let record = self
            .history
            .save_score(
                &self.task_id,
                self.session.total_correct(),
                self.session.total_questions(),
                elapsed,
                self.question_file.as_deref(),
            )
            .await?;
        debug!(
            task = %self.task_id,
            band = %self.session.band_score(),
            elapsed,
            "adaptive session submitted"
        );
        self.submission = Submission::Done(record.clone());
        Ok(record)
    }

    /// Back to a fresh module 1 with a zeroed stopwatch.
    pub fn restart(&mut self) {
        self.session.reset();
        self.stopwatch.reset();
        self.submission = Submission::Pending;
    }
}
