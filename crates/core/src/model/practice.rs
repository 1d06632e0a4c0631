use serde::Serialize;

use crate::scoring::rounded_percentage;

/// A single answered question on a plain (non-adaptive) practice screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PracticeAnswer {
    pub question_id: String,
    pub correct: bool,
}

/// Score of a practice sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PracticeScore {
    pub correct: u32,
    pub total: u32,
    pub percentage: u32,
}

/// Answers recorded on one practice screen, in answer order.
///
/// Owned by the screen that creates it; there is no shared instance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PracticeSheet {
    answers: Vec<PracticeAnswer>,
}

impl PracticeSheet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, question_id: impl Into<String>, correct: bool) {
        self.answers.push(PracticeAnswer {
            question_id: question_id.into(),
            correct,
        });
    }

    #[must_use]
    pub fn answers(&self) -> &[PracticeAnswer] {
        &self.answers
    }

    #[must_use]
    pub fn score(&self) -> PracticeScore {
        let total = u32::try_from(self.answers.len()).unwrap_or(u32::MAX);
        let correct = u32::try_from(self.answers.iter().filter(|a| a.correct).count())
            .unwrap_or(u32::MAX);
        PracticeScore {
            correct,
            total,
            percentage: rounded_percentage(correct, total),
        }
    }

    pub fn reset(&mut self) {
        self.answers.clear();
    }
}
