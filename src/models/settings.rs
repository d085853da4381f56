//! Scoring configuration and gameplay modifiers.
//!
//! Everything a score processor needs is carried by an explicit
//! [`ScoringConfig`] value; nothing is read from global state.

use crate::models::engine::hit_window::TimingWindows;
use crate::models::stats::{Judgement, JudgementTable};
use serde::{Deserialize, Serialize};
use std::fs;
use std::ops::{BitOr, BitOrAssign};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Gameplay modifier bit flags.
///
/// Only [`Mods::NO_FAIL`] and the speed flags affect scoring; any other bit is
/// carried through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Mods(u32);

impl Mods {
    pub const NONE: Mods = Mods(0);
    pub const NO_FAIL: Mods = Mods(1 << 0);
    pub const AUTOPLAY: Mods = Mods(1 << 1);
    pub const SPEED_0_5X: Mods = Mods(1 << 2);
    pub const SPEED_0_75X: Mods = Mods(1 << 3);
    pub const SPEED_0_9X: Mods = Mods(1 << 4);
    pub const SPEED_1_1X: Mods = Mods(1 << 5);
    pub const SPEED_1_25X: Mods = Mods(1 << 6);
    pub const SPEED_1_5X: Mods = Mods(1 << 7);
    pub const SPEED_2_0X: Mods = Mods(1 << 8);

    const SPEEDS: [(Mods, f64); 7] = [
        (Mods::SPEED_0_5X, 0.5),
        (Mods::SPEED_0_75X, 0.75),
        (Mods::SPEED_0_9X, 0.9),
        (Mods::SPEED_1_1X, 1.1),
        (Mods::SPEED_1_25X, 1.25),
        (Mods::SPEED_1_5X, 1.5),
        (Mods::SPEED_2_0X, 2.0),
    ];

    pub const fn from_bits(bits: u32) -> Self {
        Mods(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn contains(self, other: Mods) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: Mods) {
        self.0 |= other.0;
    }

    pub const fn no_fail(self) -> bool {
        self.contains(Mods::NO_FAIL)
    }

    /// Playback rate selected by the speed flags, 1.0 when none is set.
    ///
    /// If several speed flags are present the first one in ascending order wins.
    pub fn rate(self) -> f64 {
        Self::SPEEDS
            .iter()
            .find(|(flag, _)| self.contains(*flag))
            .map(|(_, rate)| *rate)
            .unwrap_or(1.0)
    }
}

impl BitOr for Mods {
    type Output = Mods;

    fn bitor(self, rhs: Mods) -> Mods {
        Mods(self.0 | rhs.0)
    }
}

impl BitOrAssign for Mods {
    fn bitor_assign(&mut self, rhs: Mods) {
        self.0 |= rhs.0;
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("timing windows must be finite, non-negative and nested")]
    WindowsNotNested,
    #[error("release window multiplier must be positive, got {0}")]
    InvalidReleaseMultiplier(f64),
    #[error("accuracy weights must be finite and below the marv weight ({0})")]
    InvalidAccuracyWeights(f64),
    #[error("health deltas must be finite")]
    InvalidHealthDeltas,
}

/// Ruleset used to turn judgements into score, accuracy and health.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Factor applied to every window when judging long note releases.
    pub release_multiplier: f64,
    pub windows: TimingWindows,
    pub accuracy_weights: JudgementTable<f64>,
    pub score_weights: JudgementTable<u32>,
    pub health_deltas: JudgementTable<f64>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            release_multiplier: 1.5,
            windows: TimingWindows::standard(),
            accuracy_weights: JudgementTable::new(100.0, 98.25, 65.0, 25.0, -100.0, -50.0),
            score_weights: JudgementTable::new(100, 50, 25, 10, 5, 0),
            health_deltas: JudgementTable::new(0.5, 0.4, 0.2, -3.0, -4.5, -6.0),
        }
    }
}

impl ScoringConfig {
    pub fn with_windows(windows: TimingWindows) -> Self {
        Self {
            windows,
            ..Self::default()
        }
    }

    /// Checks the invariants the score processor relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.windows.is_nested() {
            return Err(ConfigError::WindowsNotNested);
        }
        if !(self.release_multiplier.is_finite() && self.release_multiplier > 0.0) {
            return Err(ConfigError::InvalidReleaseMultiplier(self.release_multiplier));
        }

        let marv = self.accuracy_weights.marv;
        let weights_ok = marv.is_finite()
            && marv > 0.0
            && self
                .accuracy_weights
                .iter()
                .filter(|&(j, _)| j != Judgement::Marv)
                .all(|(_, w)| w.is_finite() && w < marv);
        if !weights_ok {
            return Err(ConfigError::InvalidAccuracyWeights(marv));
        }

        if !self.health_deltas.iter().all(|(_, d)| d.is_finite()) {
            return Err(ConfigError::InvalidHealthDeltas);
        }

        Ok(())
    }

    /// Parses and validates a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: ScoringConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a TOML config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        match Self::from_toml_str(&content) {
            Ok(config) => Ok(config),
            Err(e) => {
                log::error!("Failed to load scoring config {:?}: {}", path, e);
                Err(e)
            }
        }
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}
