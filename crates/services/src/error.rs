//! Shared error types for the services crate.

use thiserror::Error;

use exam_core::model::ScoreRecordError;
use storage::repository::StorageError;

/// Errors emitted by `ScoreHistoryService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ScoreServiceError {
    #[error(transparent)]
    Record(#[from] ScoreRecordError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `AdaptiveExamLoop`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExamLoopError {
    #[error("adaptive session is not complete")]
    NotComplete,
    #[error(transparent)]
    Score(#[from] ScoreServiceError),
}

/// Errors emitted while configuring the HTTP score store.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HttpStoreConfigError {
    #[error("score store url is empty")]
    Empty,
    #[error("invalid score store url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("score store url must use http or https, got {0:?}")]
    UnsupportedScheme(String),
}
