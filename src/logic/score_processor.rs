//! Running score, combo, accuracy and health of one play.
//!
//! A [`ScoreProcessor`] is fed one judgement at a time. Given the same
//! configuration, mods and judgement sequence two processors always end up
//! bit-identical: score math is integer-only and the float state is
//! accumulated in event order.

use crate::models::engine::hit_window::TimingWindows;
use crate::models::engine::note::MapInfo;
use crate::models::replay::HitEvent;
use crate::models::settings::{Mods, ScoringConfig};
use crate::models::stats::{HitErrorSummary, Judgement, JudgementCounts, KeyPressType};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Score reached when every judgement of the map is a marv.
pub const MAX_SCORE: u32 = 1_000_000;

pub const MAX_HEALTH: f64 = 100.0;

/// Multiplier steps gained per index.
const MULTIPLIER_COUNT_PER_INDEX: u32 = 10;
const MAX_MULTIPLIER_COUNT: u32 = 150;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ScoreError {
    #[error("judgement overflow: all {total} judgements of the map were already processed")]
    JudgementOverflow { total: u32 },
}

/// A recorded hit offset, kept for hit error statistics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HitStat {
    pub song_position: i32,
    pub hit_difference: i32,
    pub key_press_type: KeyPressType,
    pub judgement: Judgement,
}

/// Copy of the observable processor state at one point in time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreSnapshot {
    pub score: u32,
    pub combo: u32,
    pub max_combo: u32,
    pub health: f64,
    pub accuracy: f64,
    pub counts: JudgementCounts,
    pub failed: bool,
}

/// Quaver-style multiplier: grows on good hits, drops on bad ones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Multiplier {
    count: u32,
}

impl Multiplier {
    fn apply(&mut self, judgement: Judgement) {
        self.count = match judgement {
            Judgement::Marv | Judgement::Perf | Judgement::Great => {
                (self.count + 1).min(MAX_MULTIPLIER_COUNT)
            }
            Judgement::Good => self.count,
            Judgement::Okay | Judgement::Miss | Judgement::Ghost => {
                self.count.saturating_sub(MULTIPLIER_COUNT_PER_INDEX)
            }
        };
    }

    fn bonus(&self) -> u64 {
        ((self.count / MULTIPLIER_COUNT_PER_INDEX) * MULTIPLIER_COUNT_PER_INDEX) as u64
    }
}

#[derive(Debug, Clone)]
pub struct ScoreProcessor {
    config: ScoringConfig,
    mods: Mods,
    /// Windows after applying the playback rate.
    windows: TimingWindows,
    total_judgements: u32,
    /// Raw score count reached by an all-marv play of the map.
    max_score_count: u64,
    score_count: u64,
    multiplier: Multiplier,
    score: u32,
    combo: u32,
    max_combo: u32,
    health: f64,
    failed: bool,
    counts: JudgementCounts,
    hit_stats: Vec<HitStat>,
}

impl ScoreProcessor {
    /// Creates a processor for a map with `total_judgements` scorable actions.
    pub fn new(total_judgements: u32, config: ScoringConfig, mods: Mods) -> Self {
        let windows = config.windows.scaled(mods.rate());
        let max_score_count = max_score_count(total_judgements, &config);

        Self {
            config,
            mods,
            windows,
            total_judgements,
            max_score_count,
            score_count: 0,
            multiplier: Multiplier::default(),
            score: 0,
            combo: 0,
            max_combo: 0,
            health: MAX_HEALTH,
            failed: false,
            counts: JudgementCounts::new(),
            hit_stats: Vec::new(),
        }
    }

    pub fn from_map(map: &MapInfo, config: ScoringConfig, mods: Mods) -> Self {
        Self::new(map.total_judgement_count(), config, mods)
    }

    /// Applies one judgement and returns the judgement actually recorded.
    ///
    /// Ghost is recorded as a miss. Once every judgement of the map has been
    /// processed further calls are rejected with
    /// [`ScoreError::JudgementOverflow`] and leave the state untouched.
    pub fn calculate_score(
        &mut self,
        judgement: Judgement,
        is_release: bool,
    ) -> Result<Judgement, ScoreError> {
        if self.is_finished() {
            log::warn!(
                "Rejected {:?}{}: {} of {} judgements already processed",
                judgement,
                if is_release { " release" } else { "" },
                self.processed_judgement_count(),
                self.total_judgements
            );
            return Err(ScoreError::JudgementOverflow {
                total: self.total_judgements,
            });
        }

        let judgement = judgement.recorded();
        self.counts.add(judgement);

        if judgement.breaks_combo() {
            self.combo = 0;
        } else {
            self.combo += 1;
        }
        self.max_combo = self.max_combo.max(self.combo);

        self.multiplier.apply(judgement);
        self.score_count +=
            self.config.score_weights.get(judgement) as u64 + self.multiplier.bonus();
        self.score = scale_score(self.score_count, self.max_score_count);

        self.apply_health(judgement);

        Ok(judgement)
    }

    /// Classifies a hit offset with the rate-scaled windows, then scores it.
    pub fn calculate_score_for_hit(
        &mut self,
        hit_difference: i32,
        key_press_type: KeyPressType,
    ) -> Result<Judgement, ScoreError> {
        let judgement = self.windows.classify_event(
            hit_difference,
            key_press_type,
            self.config.release_multiplier,
        );
        self.calculate_score(judgement, key_press_type == KeyPressType::Release)
    }

    /// Scores a recorded event and keeps its offset for hit statistics.
    ///
    /// Events without a key press are misses regardless of any pre-assigned
    /// judgement.
    pub fn process_event(&mut self, event: &HitEvent) -> Result<Judgement, ScoreError> {
        let judgement = match (event.key_press_type, event.judgement) {
            (KeyPressType::None, _) => self.calculate_score(Judgement::Miss, false)?,
            (_, Some(judgement)) => self.calculate_score(judgement, event.is_release())?,
            (key_press_type, None) => {
                self.calculate_score_for_hit(event.hit_difference, key_press_type)?
            }
        };

        self.hit_stats.push(HitStat {
            song_position: event.song_position,
            hit_difference: event.hit_difference,
            key_press_type: event.key_press_type,
            judgement,
        });

        Ok(judgement)
    }

    fn apply_health(&mut self, judgement: Judgement) {
        if self.failed {
            return;
        }

        let delta = self.config.health_deltas.get(judgement);
        self.health = (self.health + delta).clamp(0.0, MAX_HEALTH);

        if self.health <= 0.0 && !self.mods.no_fail() {
            self.failed = true;
            log::debug!(
                "Play failed after {} judgements",
                self.processed_judgement_count()
            );
        }
    }

    /// Weighted accuracy percentage (0-100) of the judgements so far.
    pub fn accuracy(&self) -> f64 {
        self.counts.accuracy(&self.config.accuracy_weights)
    }

    /// Number of scorable actions in the map.
    pub fn total_judgement_count(&self) -> u32 {
        self.total_judgements
    }

    pub fn processed_judgement_count(&self) -> u32 {
        self.counts.total()
    }

    pub fn remaining_judgement_count(&self) -> u32 {
        self.total_judgements
            .saturating_sub(self.processed_judgement_count())
    }

    /// True once every judgement of the map has been processed.
    pub fn is_finished(&self) -> bool {
        self.processed_judgement_count() >= self.total_judgements
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn combo(&self) -> u32 {
        self.combo
    }

    pub fn max_combo(&self) -> u32 {
        self.max_combo
    }

    pub fn health(&self) -> f64 {
        self.health
    }

    /// Health ran out without NoFail.
    pub fn failed(&self) -> bool {
        self.failed
    }

    pub fn counts(&self) -> &JudgementCounts {
        &self.counts
    }

    pub fn mods(&self) -> Mods {
        self.mods
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Timing windows in effect, after the playback rate.
    pub fn windows(&self) -> &TimingWindows {
        &self.windows
    }

    pub fn hit_stats(&self) -> &[HitStat] {
        &self.hit_stats
    }

    /// Mean and spread of the offsets of every recorded non-miss hit.
    pub fn hit_error_summary(&self) -> HitErrorSummary {
        let offsets: Vec<i32> = self
            .hit_stats
            .iter()
            .filter(|s| s.judgement != Judgement::Miss)
            .map(|s| s.hit_difference)
            .collect();
        HitErrorSummary::from_offsets(&offsets)
    }

    pub fn snapshot(&self) -> ScoreSnapshot {
        ScoreSnapshot {
            score: self.score,
            combo: self.combo,
            max_combo: self.max_combo,
            health: self.health,
            accuracy: self.accuracy(),
            counts: self.counts,
            failed: self.failed,
        }
    }
}

/// Raw score count of an all-marv play with `total` judgements.
fn max_score_count(total: u32, config: &ScoringConfig) -> u64 {
    let mut multiplier = Multiplier::default();
    let marv = config.score_weights.marv as u64;

    (0..total).fold(0u64, |sum, _| {
        multiplier.apply(Judgement::Marv);
        sum + marv + multiplier.bonus()
    })
}

fn scale_score(score_count: u64, max_score_count: u64) -> u32 {
    if max_score_count == 0 {
        return 0;
    }
    let scaled = score_count * MAX_SCORE as u64 / max_score_count;
    scaled.min(MAX_SCORE as u64) as u32
}
