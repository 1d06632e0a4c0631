mod ticker;
mod workflow;

pub use ticker::{TickerHandle, spawn_countdown_ticker, spawn_stopwatch_ticker};
pub use workflow::AdaptiveExamLoop;
