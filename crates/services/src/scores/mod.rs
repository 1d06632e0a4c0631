mod dashboard;
mod http_store;
mod service;

pub use dashboard::{Dashboard, TaskSummary};
pub use http_store::{HttpScoreStore, SCORES_URL_ENV, ScoreStoreConfig};
pub use service::ScoreHistoryService;
