//! Hit statistics and judgement types.
//!
//! This module defines the judgement tiers used for scoring, the per-tier
//! lookup table every weight/delta configuration is expressed with, and the
//! running judgement counters of a play.

use serde::{Deserialize, Serialize};

/// Hit judgement types from best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Judgement {
    /// Perfect timing (best).
    Marv,
    /// Excellent timing.
    Perf,
    /// Good timing.
    Great,
    /// Acceptable timing.
    Good,
    /// Poor timing.
    Okay,
    /// Missed note.
    Miss,
    /// Release that matches no held note. Never recorded, always turned into a miss.
    Ghost,
}

impl Judgement {
    /// Judgements that can end up in [`JudgementCounts`], best first.
    pub const SCORED: [Judgement; 6] = [
        Judgement::Marv,
        Judgement::Perf,
        Judgement::Great,
        Judgement::Good,
        Judgement::Okay,
        Judgement::Miss,
    ];

    /// Severity rank, 0 being the best tier. Ghost ranks with Miss.
    pub fn severity(self) -> u8 {
        match self {
            Judgement::Marv => 0,
            Judgement::Perf => 1,
            Judgement::Great => 2,
            Judgement::Good => 3,
            Judgement::Okay => 4,
            Judgement::Miss | Judgement::Ghost => 5,
        }
    }

    /// Returns true if `self` is a strictly better tier than `other`.
    pub fn is_better_than(self, other: Judgement) -> bool {
        self.severity() < other.severity()
    }

    /// The judgement that is actually recorded for `self`.
    pub fn recorded(self) -> Judgement {
        match self {
            Judgement::Ghost => Judgement::Miss,
            j => j,
        }
    }

    /// Whether this judgement breaks the combo.
    pub fn breaks_combo(self) -> bool {
        matches!(self.recorded(), Judgement::Miss)
    }

    pub fn name(self) -> &'static str {
        match self {
            Judgement::Marv => "Marvelous",
            Judgement::Perf => "Perfect",
            Judgement::Great => "Great",
            Judgement::Good => "Good",
            Judgement::Okay => "Okay",
            Judgement::Miss => "Miss",
            Judgement::Ghost => "Ghost",
        }
    }
}

/// Kind of key action a hit was recorded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum KeyPressType {
    #[default]
    Press,
    Release,
    /// No key event at all: the note went by unhit.
    None,
}

/// One value per scored judgement.
///
/// Weight, score and health tables are all expressed with this type so the
/// value of a tier never depends on its position in the enum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JudgementTable<T> {
    pub marv: T,
    pub perf: T,
    pub great: T,
    pub good: T,
    pub okay: T,
    pub miss: T,
}

impl<T: Copy> JudgementTable<T> {
    pub const fn new(marv: T, perf: T, great: T, good: T, okay: T, miss: T) -> Self {
        Self {
            marv,
            perf,
            great,
            good,
            okay,
            miss,
        }
    }

    /// Looks up the value for a judgement. Ghost uses the miss entry.
    pub fn get(&self, judgement: Judgement) -> T {
        match judgement {
            Judgement::Marv => self.marv,
            Judgement::Perf => self.perf,
            Judgement::Great => self.great,
            Judgement::Good => self.good,
            Judgement::Okay => self.okay,
            Judgement::Miss | Judgement::Ghost => self.miss,
        }
    }

    /// Iterates `(judgement, value)` pairs best first.
    pub fn iter(&self) -> impl Iterator<Item = (Judgement, T)> + '_ {
        Judgement::SCORED.into_iter().map(move |j| (j, self.get(j)))
    }
}

/// Accumulated judgement counters for a play session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JudgementCounts {
    pub marv: u32,
    pub perf: u32,
    pub great: u32,
    pub good: u32,
    pub okay: u32,
    pub miss: u32,
}

impl JudgementCounts {
    /// Creates empty counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Increments the counter of the recorded form of `judgement`.
    pub fn add(&mut self, judgement: Judgement) {
        match judgement.recorded() {
            Judgement::Marv => self.marv += 1,
            Judgement::Perf => self.perf += 1,
            Judgement::Great => self.great += 1,
            Judgement::Good => self.good += 1,
            Judgement::Okay => self.okay += 1,
            Judgement::Miss | Judgement::Ghost => self.miss += 1,
        }
    }

    pub fn get(&self, judgement: Judgement) -> u32 {
        match judgement {
            Judgement::Marv => self.marv,
            Judgement::Perf => self.perf,
            Judgement::Great => self.great,
            Judgement::Good => self.good,
            Judgement::Okay => self.okay,
            Judgement::Miss => self.miss,
            Judgement::Ghost => 0,
        }
    }

    /// Number of judgements recorded so far.
    pub fn total(&self) -> u32 {
        self.marv + self.perf + self.great + self.good + self.okay + self.miss
    }

    /// Weighted accuracy percentage (0-100).
    ///
    /// `Σ weight[j] × count[j] / (total × weight[Marv])`, floored at 0 and
    /// capped at 100. An empty set of counters is a flawless 100.
    pub fn accuracy(&self, weights: &JudgementTable<f64>) -> f64 {
        let total = self.total();
        if total == 0 || weights.marv <= 0.0 {
            return 100.0;
        }

        let weighted: f64 = Judgement::SCORED
            .iter()
            .map(|&j| self.get(j) as f64 * weights.get(j))
            .sum();

        let ratio = weighted / (total as f64 * weights.marv);
        (ratio * 100.0).clamp(0.0, 100.0)
    }
}

/// Mean and spread of the recorded hit offsets, in milliseconds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HitErrorSummary {
    pub count: u32,
    pub mean_ms: f64,
    pub std_dev_ms: f64,
}

impl HitErrorSummary {
    /// Builds a summary from signed hit offsets. Empty input gives zeros.
    pub fn from_offsets(offsets: &[i32]) -> Self {
        if offsets.is_empty() {
            return Self::default();
        }

        let n = offsets.len() as f64;
        let mean = offsets.iter().map(|&o| o as f64).sum::<f64>() / n;
        let variance = offsets
            .iter()
            .map(|&o| {
                let d = o as f64 - mean;
                d * d
            })
            .sum::<f64>()
            / n;

        Self {
            count: offsets.len() as u32,
            mean_ms: mean,
            std_dev_ms: variance.sqrt(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUAVER_WEIGHTS: JudgementTable<f64> =
        JudgementTable::new(100.0, 98.25, 65.0, 25.0, -100.0, -50.0);

    #[test]
    fn test_severity_ordering() {
        assert!(Judgement::Marv.is_better_than(Judgement::Perf));
        assert!(Judgement::Okay.is_better_than(Judgement::Miss));
        assert!(!Judgement::Ghost.is_better_than(Judgement::Miss));
        assert!(!Judgement::Miss.is_better_than(Judgement::Ghost));
    }

    #[test]
    fn test_ghost_is_counted_as_miss() {
        let mut counts = JudgementCounts::new();
        counts.add(Judgement::Ghost);
        assert_eq!(counts.miss, 1);
        assert_eq!(counts.get(Judgement::Ghost), 0);
        assert_eq!(counts.total(), 1);
    }

    #[test]
    fn test_accuracy_all_marv_is_100() {
        let mut counts = JudgementCounts::new();
        for _ in 0..5 {
            counts.add(Judgement::Marv);
        }
        assert_eq!(counts.accuracy(&QUAVER_WEIGHTS), 100.0);
    }

    #[test]
    fn test_accuracy_weighted() {
        let mut counts = JudgementCounts::new();
        counts.add(Judgement::Marv);
        counts.add(Judgement::Great);
        let acc = counts.accuracy(&QUAVER_WEIGHTS);
        assert!((acc - 82.5).abs() < 1e-9);
    }

    #[test]
    fn test_accuracy_floored_at_zero() {
        let mut counts = JudgementCounts::new();
        counts.add(Judgement::Okay);
        counts.add(Judgement::Miss);
        assert_eq!(counts.accuracy(&QUAVER_WEIGHTS), 0.0);
    }

    #[test]
    fn test_empty_accuracy() {
        assert_eq!(JudgementCounts::new().accuracy(&QUAVER_WEIGHTS), 100.0);
    }

    #[test]
    fn test_hit_error_summary() {
        let summary = HitErrorSummary::from_offsets(&[-10, 10, 0]);
        assert_eq!(summary.count, 3);
        assert_eq!(summary.mean_ms, 0.0);
        assert!((summary.std_dev_ms - (200.0f64 / 3.0).sqrt()).abs() < 1e-9);
        assert_eq!(HitErrorSummary::from_offsets(&[]), HitErrorSummary::default());
    }
}
