mod ids;
mod practice;
mod score;

pub use ids::{ProblemId, TaskId, TaskIdError};
pub use practice::{PracticeAnswer, PracticeScore, PracticeSheet};
pub use score::{ScoreRecord, ScoreRecordError};
