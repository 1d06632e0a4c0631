//! Percentages and band scores.
//!
//! Everything here is a pure function of answer counts. Adaptive sessions use the
//! branch-aware [`band_score`]; plain practice screens only need
//! [`rounded_percentage`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// Raw module-1 percentage at or above which module 2 is served hard.
pub const HARD_BRANCH_THRESHOLD_PCT: f64 = 70.0;

/// Difficulty track taken for module 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Branch {
    Hard,
    Easy,
}

impl Branch {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Branch::Hard => "hard",
            Branch::Easy => "easy",
        }
    }

    /// Parses `hard` / `easy` (case-insensitive).
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "hard" => Some(Branch::Hard),
            "easy" => Some(Branch::Easy),
            _ => None,
        }
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrounded percentage in `0.0..=100.0`. An empty tally is 0, never NaN.
#[must_use]
pub fn raw_percentage(correct: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    f64::from(correct) / f64::from(total) * 100.0
}

/// Percentage rounded to the nearest integer, halves rounding up.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn rounded_percentage(correct: u32, total: u32) -> u32 {
    // raw_percentage is never negative and never above 100 for correct <= total
    raw_percentage(correct, total).round() as u32
}

/// Module-2 track for a raw (unrounded) module-1 percentage.
///
/// The comparison is against the raw value: 69.6% goes easy even though it is
/// displayed as 70%.
#[must_use]
pub fn branch_for(raw_pct: f64) -> Branch {
    if raw_pct >= HARD_BRANCH_THRESHOLD_PCT {
        Branch::Hard
    } else {
        Branch::Easy
    }
}

/// Human-facing proficiency band, e.g. `5.5–6.0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct BandScore(&'static str);

impl BandScore {
    #[must_use]
    pub fn label(self) -> &'static str {
        self.0
    }
}

impl fmt::Display for BandScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

struct Ladder {
    rungs: [(u32, &'static str); 3],
    floor: &'static str,
}

const HARD_LADDER: Ladder = Ladder {
    rungs: [(90, "5.5–6.0"), (75, "4.5–5.0"), (60, "3.5–4.0")],
    floor: "–3.5",
};

const EASY_LADDER: Ladder = Ladder {
    rungs: [(90, "3.5–4.0"), (75, "3.0–3.5"), (60, "2.5–3.0")],
    floor: "–2.5",
};

/// Band for a rounded total percentage on the given track.
///
/// Rungs are checked top-down; lower bounds are inclusive.
#[must_use]
pub fn band_score(total_pct: u32, branch: Branch) -> BandScore {
    let ladder = match branch {
        Branch::Hard => &HARD_LADDER,
        Branch::Easy => &EASY_LADDER,
    };
    let label = ladder
        .rungs
        .iter()
        .find(|(min, _)| total_pct >= *min)
        .map_or(ladder.floor, |(_, label)| *label);
    BandScore(label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_tally_is_zero_percent() {
        assert!(raw_percentage(0, 0).abs() < f64::EPSILON);
        assert_eq!(rounded_percentage(0, 0), 0);
    }

    #[test]
    fn rounding_is_half_up() {
        assert_eq!(rounded_percentage(1, 3), 33);
        assert_eq!(rounded_percentage(2, 3), 67);
        assert_eq!(rounded_percentage(7, 9), 78);
        assert_eq!(rounded_percentage(1, 8), 13);
    }

    #[test]
    fn branch_uses_raw_percentage() {
        assert_eq!(branch_for(raw_percentage(7, 10)), Branch::Hard);
        assert_eq!(branch_for(raw_percentage(1, 3)), Branch::Easy);
        // 87/125 = 69.6% rounds to 70 for display but stays easy
        assert_eq!(rounded_percentage(87, 125), 70);
        assert_eq!(branch_for(raw_percentage(87, 125)), Branch::Easy);
    }

    #[test]
    fn hard_ladder_bounds_are_inclusive() {
        assert_eq!(band_score(100, Branch::Hard).label(), "5.5–6.0");
        assert_eq!(band_score(90, Branch::Hard).label(), "5.5–6.0");
        assert_eq!(band_score(89, Branch::Hard).label(), "4.5–5.0");
        assert_eq!(band_score(75, Branch::Hard).label(), "4.5–5.0");
        assert_eq!(band_score(60, Branch::Hard).label(), "3.5–4.0");
        assert_eq!(band_score(59, Branch::Hard).label(), "–3.5");
    }

    #[test]
    fn easy_ladder_caps_lower() {
        assert_eq!(band_score(90, Branch::Easy).label(), "3.5–4.0");
        assert_eq!(band_score(74, Branch::Easy).label(), "2.5–3.0");
        assert_eq!(band_score(0, Branch::Easy).label(), "–2.5");
    }

    #[test]
    fn branch_parses_case_insensitively() {
        assert_eq!(Branch::parse(" HARD "), Some(Branch::Hard));
        assert_eq!(Branch::parse("easy"), Some(Branch::Easy));
        assert_eq!(Branch::parse("medium"), None);
    }
}
