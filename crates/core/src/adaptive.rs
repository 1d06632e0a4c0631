use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::scoring::{self, BandScore, Branch};

/// Coarse lifecycle stage of an adaptive session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    Module1,
    Branching,
    Module2,
    Complete,
}

/// Module whose questions are currently being served.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Module {
    Module1,
    Module2Hard,
    Module2Easy,
}

impl Module {
    #[must_use]
    pub fn for_branch(branch: Branch) -> Self {
        match branch {
            Branch::Hard => Module::Module2Hard,
            Branch::Easy => Module::Module2Easy,
        }
    }

    /// Ladder used for the band score. Anything but the hard track scores on the easy one.
    #[must_use]
    pub fn scoring_branch(self) -> Branch {
        match self {
            Module::Module2Hard => Branch::Hard,
            Module::Module1 | Module::Module2Easy => Branch::Easy,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Tally {
    correct: u32,
    total: u32,
}

impl Tally {
    fn record(&mut self, correct: bool) {
        self.total = self.total.saturating_add(1);
        if correct {
            self.correct = self.correct.saturating_add(1);
        }
    }
}

/// Two-module adaptive test session.
///
/// Only the phase, the module and the two tallies are stored. Percentages, totals and
/// the band score are recomputed from the tallies on every read.
///
/// Calls that do not belong to the current phase (e.g. `start_module2` while still in
/// module 1) are ignored and logged; phases only ever move forward until [`reset`].
///
/// [`reset`]: AdaptiveSession::reset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdaptiveSession {
    phase: Phase,
    module: Module,
    module1: Tally,
    module2: Tally,
}

impl AdaptiveSession {
    #[must_use]
    pub fn new() -> Self {
        Self {
            phase: Phase::Module1,
            module: Module::Module1,
            module1: Tally::default(),
            module2: Tally::default(),
        }
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn module(&self) -> Module {
        self.module
    }

    #[must_use]
    pub fn module1_correct(&self) -> u32 {
        self.module1.correct
    }

    #[must_use]
    pub fn module1_total(&self) -> u32 {
        self.module1.total
    }

    #[must_use]
    pub fn module2_correct(&self) -> u32 {
        self.module2.correct
    }

    #[must_use]
    pub fn module2_total(&self) -> u32 {
        self.module2.total
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.phase == Phase::Complete
    }

    /// Branch chosen at the end of module 1, if any.
    #[must_use]
    pub fn branch(&self) -> Option<Branch> {
        match self.module {
            Module::Module1 => None,
            Module::Module2Hard => Some(Branch::Hard),
            Module::Module2Easy => Some(Branch::Easy),
        }
    }

    pub fn record_module1_answer(&mut self, correct: bool) {
        if self.phase != Phase::Module1 {
            warn!(phase = ?self.phase, "module 1 answer outside module 1 ignored");
            return;
        }
        self.module1.record(correct);
    }

    pub fn record_module2_answer(&mut self, correct: bool) {
        if self.phase != Phase::Module2 {
            warn!(phase = ?self.phase, "module 2 answer outside module 2 ignored");
            return;
        }
        self.module2.record(correct);
    }

    /// Record into whichever module is being answered right now.
    pub fn record_answer(&mut self, correct: bool) {
        match self.phase {
            Phase::Module1 => self.record_module1_answer(correct),
            _ => self.record_module2_answer(correct),
        }
    }

    /// Close module 1 and pick the module-2 track from the raw percentage.
    pub fn finish_module1(&mut self) {
        if self.phase != Phase::Module1 {
            warn!(phase = ?self.phase, "finish_module1 ignored");
            return;
        }
        let pct = scoring::raw_percentage(self.module1.correct, self.module1.total);
        let branch = scoring::branch_for(pct);
        self.module = Module::for_branch(branch);
        self.phase = Phase::Branching;
        debug!(pct, %branch, "module 1 finished");
    }

    pub fn start_module2(&mut self) {
        if self.phase != Phase::Branching {
            warn!(phase = ?self.phase, "start_module2 ignored");
            return;
        }
        self.phase = Phase::Module2;
        debug!(module = ?self.module, "module 2 started");
    }

    pub fn finish_module2(&mut self) {
        if self.phase != Phase::Module2 {
            warn!(phase = ?self.phase, "finish_module2 ignored");
            return;
        }
        self.phase = Phase::Complete;
        debug!(
            correct = self.total_correct(),
            total = self.total_questions(),
            "adaptive session complete"
        );
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Rounded module-1 percentage, for display only.
    #[must_use]
    pub fn module1_pct(&self) -> u32 {
        scoring::rounded_percentage(self.module1.correct, self.module1.total)
    }

    #[must_use]
    pub fn total_correct(&self) -> u32 {
        self.module1.correct.saturating_add(self.module2.correct)
    }

    #[must_use]
    pub fn total_questions(&self) -> u32 {
        self.module1.total.saturating_add(self.module2.total)
    }

    #[must_use]
    pub fn total_pct(&self) -> u32 {
        scoring::rounded_percentage(self.total_correct(), self.total_questions())
    }

    #[must_use]
    pub fn band_score(&self) -> BandScore {
        scoring::band_score(self.total_pct(), self.module.scoring_branch())
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase,
            module: self.module,
            module1_correct: self.module1.correct,
            module1_total: self.module1.total,
            module2_correct: self.module2.correct,
            module2_total: self.module2.total,
            module1_pct: self.module1_pct(),
            total_correct: self.total_correct(),
            total_questions: self.total_questions(),
            total_pct: self.total_pct(),
            band_score: self.band_score(),
        }
    }
}

impl Default for AdaptiveSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only copy of a session, including derived values, for rendering or caching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub phase: Phase,
    pub module: Module,
    pub module1_correct: u32,
    pub module1_total: u32,
    pub module2_correct: u32,
    pub module2_total: u32,
    pub module1_pct: u32,
    pub total_correct: u32,
    pub total_questions: u32,
    pub total_pct: u32,
    pub band_score: BandScore,
}
