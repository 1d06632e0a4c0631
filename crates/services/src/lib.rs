#![forbid(unsafe_code)]

pub mod error;
pub mod exam;
pub mod scores;

pub use exam_core::Clock;

pub use error::{ExamLoopError, HttpStoreConfigError, ScoreServiceError};
pub use exam::{
    AdaptiveExamLoop, TickerHandle, spawn_countdown_ticker, spawn_stopwatch_ticker,
};
pub use scores::{
    Dashboard, HttpScoreStore, ScoreHistoryService, ScoreStoreConfig, TaskSummary,
};
