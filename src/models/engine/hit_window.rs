//! Definitions and constructors for hit window timing thresholds.

use crate::models::stats::{Judgement, KeyPressType};
use serde::{Deserialize, Serialize};

/// Maximum absolute hit offset (ms) per judgement, nested from marv to miss.
///
/// `miss_ms` is how late an unhit note may pass before it counts as missed;
/// it is not a classification tier of its own.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimingWindows {
    pub marv_ms: f64,
    pub perf_ms: f64,
    pub great_ms: f64,
    pub good_ms: f64,
    pub okay_ms: f64,
    pub miss_ms: f64,
}

impl Default for TimingWindows {
    fn default() -> Self {
        Self::standard()
    }
}

impl TimingWindows {
    /// Quaver "Standard" windows.
    pub const fn standard() -> Self {
        Self {
            marv_ms: 18.0,
            perf_ms: 43.0,
            great_ms: 76.0,
            good_ms: 106.0,
            okay_ms: 127.0,
            miss_ms: 164.0,
        }
    }

    /// Creates windows based on osu! Overall Difficulty.
    pub fn from_osu_od(od: f64) -> Self {
        Self {
            marv_ms: 16.0,               // Fixed (legacy behavior)
            perf_ms: 64.0 - (3.0 * od),  // 300 window
            great_ms: 97.0 - (3.0 * od), // 100 window
            good_ms: 127.0 - (3.0 * od), // 50 window
            okay_ms: 151.0 - (3.0 * od),
            miss_ms: 188.0 - (3.0 * od),
        }
    }

    /// Creates windows based on the Etterna judge level (J4 = standard).
    pub fn from_etterna_judge(judge_level: u8) -> Self {
        let scale = if judge_level == 9 {
            0.2
        } else {
            1.0 - ((judge_level as f64 - 4.0) / 6.0)
        };

        // Etterna rule: the last window never drops below 180ms.
        let okay = (180.0 * scale).max(180.0);

        Self {
            marv_ms: 22.5 * scale,
            perf_ms: 45.0 * scale,
            great_ms: 90.0 * scale,
            good_ms: 135.0 * scale,
            okay_ms: okay,
            miss_ms: okay.max(500.0),
        }
    }

    /// Utility constructor for fully custom values.
    pub fn from_custom(marv: f64, perf: f64, great: f64, good: f64, okay: f64, miss: f64) -> Self {
        Self {
            marv_ms: marv,
            perf_ms: perf,
            great_ms: great,
            good_ms: good,
            okay_ms: okay,
            miss_ms: miss,
        }
    }

    /// Windows as seen by the player at the given playback rate.
    pub fn scaled(&self, rate: f64) -> Self {
        Self {
            marv_ms: self.marv_ms * rate,
            perf_ms: self.perf_ms * rate,
            great_ms: self.great_ms * rate,
            good_ms: self.good_ms * rate,
            okay_ms: self.okay_ms * rate,
            miss_ms: self.miss_ms * rate,
        }
    }

    fn thresholds(&self) -> [f64; 6] {
        [
            self.marv_ms,
            self.perf_ms,
            self.great_ms,
            self.good_ms,
            self.okay_ms,
            self.miss_ms,
        ]
    }

    /// True when every window is finite, non-negative and contains the previous one.
    pub fn is_nested(&self) -> bool {
        let t = self.thresholds();
        t.iter().all(|w| w.is_finite() && *w >= 0.0) && t.windows(2).all(|w| w[0] <= w[1])
    }

    /// Best tier whose window contains `|hit_difference|`, scaled by `multiplier`.
    fn tier(&self, hit_difference: i32, multiplier: f64) -> Option<Judgement> {
        let abs_diff = (hit_difference as f64).abs();

        [
            (self.marv_ms, Judgement::Marv),
            (self.perf_ms, Judgement::Perf),
            (self.great_ms, Judgement::Great),
            (self.good_ms, Judgement::Good),
            (self.okay_ms, Judgement::Okay),
        ]
        .into_iter()
        .find(|(window, _)| abs_diff <= window * multiplier)
        .map(|(_, judgement)| judgement)
    }

    /// Classifies a press. Anything beyond the okay window is a miss.
    pub fn classify(&self, hit_difference: i32) -> Judgement {
        self.tier(hit_difference, 1.0).unwrap_or(Judgement::Miss)
    }

    /// Classifies a long note release against windows widened by `multiplier`.
    ///
    /// A release outside every window matches no held note and yields
    /// [`Judgement::Ghost`].
    pub fn classify_release(&self, hit_difference: i32, multiplier: f64) -> Judgement {
        self.tier(hit_difference, multiplier)
            .unwrap_or(Judgement::Ghost)
    }

    /// Classifies any key action. `KeyPressType::None` is always a miss.
    pub fn classify_event(
        &self,
        hit_difference: i32,
        key_press_type: KeyPressType,
        release_multiplier: f64,
    ) -> Judgement {
        match key_press_type {
            KeyPressType::Press => self.classify(hit_difference),
            KeyPressType::Release => self.classify_release(hit_difference, release_multiplier),
            KeyPressType::None => Judgement::Miss,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_standard() {
        let windows = TimingWindows::standard();
        assert_eq!(windows.classify(5), Judgement::Marv);
        assert_eq!(windows.classify(-18), Judgement::Marv);
        assert_eq!(windows.classify(-20), Judgement::Perf);
        assert_eq!(windows.classify(60), Judgement::Great);
        assert_eq!(windows.classify(-100), Judgement::Good);
        assert_eq!(windows.classify(127), Judgement::Okay);
        assert_eq!(windows.classify(128), Judgement::Miss);
        assert_eq!(windows.classify(200), Judgement::Miss);
    }

    #[test]
    fn test_release_is_widened() {
        let windows = TimingWindows::standard();
        // 20ms is a Perf on press but within 18 * 1.5 on release.
        assert_eq!(windows.classify_release(20, 1.5), Judgement::Marv);
        assert_eq!(windows.classify_release(190, 1.5), Judgement::Okay);
        assert_eq!(windows.classify_release(191, 1.5), Judgement::Ghost);
    }

    #[test]
    fn test_no_key_is_miss() {
        let windows = TimingWindows::standard();
        assert_eq!(
            windows.classify_event(0, KeyPressType::None, 1.5),
            Judgement::Miss
        );
    }

    #[test]
    fn test_scaled_windows() {
        let windows = TimingWindows::standard().scaled(1.5);
        assert_eq!(windows.marv_ms, 27.0);
        assert_eq!(windows.classify(25), Judgement::Marv);
    }

    #[test]
    fn test_presets_are_nested() {
        assert!(TimingWindows::standard().is_nested());
        assert!(TimingWindows::from_osu_od(8.0).is_nested());
        assert!(TimingWindows::from_etterna_judge(4).is_nested());
        assert!(TimingWindows::from_etterna_judge(9).is_nested());
        assert!(!TimingWindows::from_custom(50.0, 40.0, 76.0, 106.0, 127.0, 164.0).is_nested());
    }
}
