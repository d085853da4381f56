//! Accuracy to performance rating conversion.

use crate::logic::score_processor::ScoreProcessor;

/// Accuracy at which the rating equals the map difficulty.
const REFERENCE_ACCURACY: f64 = 98.0;
const CURVE_EXPONENT: i32 = 6;

/// Converts accuracy on a map into a skill rating.
///
/// Holds nothing but the map difficulty, so a single value can be shared
/// across threads and simulations of the same map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingProcessor {
    difficulty: f64,
}

impl RatingProcessor {
    /// `difficulty` is the map's precomputed difficulty rating. Negative or
    /// non-finite values are treated as 0.
    pub fn new(difficulty: f64) -> Self {
        let difficulty = if difficulty.is_finite() {
            difficulty.max(0.0)
        } else {
            0.0
        };
        Self { difficulty }
    }

    pub fn difficulty(&self) -> f64 {
        self.difficulty
    }

    /// `difficulty × (accuracy / 98)^6`, with accuracy clamped to 0-100.
    pub fn calculate_rating(&self, accuracy: f64) -> f64 {
        let accuracy = if accuracy.is_finite() {
            accuracy.clamp(0.0, 100.0)
        } else {
            0.0
        };
        self.difficulty * (accuracy / REFERENCE_ACCURACY).powi(CURVE_EXPONENT)
    }

    /// Rating of a perfect play, used as the graph ceiling.
    pub fn max_rating(&self) -> f64 {
        self.calculate_rating(100.0)
    }

    /// Rating of a play in progress. A failed play is worth nothing.
    pub fn rating_for(&self, processor: &ScoreProcessor) -> f64 {
        if processor.failed() {
            0.0
        } else {
            self.calculate_rating(processor.accuracy())
        }
    }

    /// Ratings for a list of accuracies, e.g. for axis labels.
    pub fn ratings_for_accuracies<I>(&self, accuracies: I) -> Vec<(f64, f64)>
    where
        I: IntoIterator<Item = f64>,
    {
        accuracies
            .into_iter()
            .map(|acc| (acc, self.calculate_rating(acc)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::settings::{Mods, ScoringConfig};
    use crate::models::stats::Judgement;

    #[test]
    fn test_reference_accuracy_gives_difficulty() {
        let rating = RatingProcessor::new(25.0);
        assert!((rating.calculate_rating(98.0) - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_monotonic() {
        for difficulty in [0.0, 1.5, 10.0, 42.0, 100.0] {
            let rating = RatingProcessor::new(difficulty);
            let mut last = rating.calculate_rating(0.0);
            for step in 1..=1000 {
                let value = rating.calculate_rating(step as f64 / 10.0);
                assert!(value >= last);
                last = value;
            }
            assert_eq!(last, rating.max_rating());
        }
    }

    #[test]
    fn test_ceiling_scales_with_difficulty() {
        assert!(RatingProcessor::new(20.0).max_rating() > RatingProcessor::new(10.0).max_rating());
    }

    #[test]
    fn test_out_of_range_inputs() {
        let rating = RatingProcessor::new(10.0);
        assert_eq!(rating.calculate_rating(150.0), rating.max_rating());
        assert_eq!(rating.calculate_rating(-5.0), 0.0);
        assert_eq!(rating.calculate_rating(f64::NAN), 0.0);
        assert_eq!(RatingProcessor::new(f64::NAN).difficulty(), 0.0);
    }

    #[test]
    fn test_failed_play_is_zero() {
        let mut processor = ScoreProcessor::new(30, ScoringConfig::default(), Mods::NONE);
        for _ in 0..20 {
            processor.calculate_score(Judgement::Miss, false).unwrap();
        }
        assert!(processor.failed());
        assert_eq!(RatingProcessor::new(30.0).rating_for(&processor), 0.0);
    }

    #[test]
    fn test_shared_across_threads() {
        let rating = RatingProcessor::new(12.0);
        let handles: Vec<_> = (0..4)
            .map(|i| std::thread::spawn(move || rating.calculate_rating(90.0 + i as f64)))
            .collect();
        for (i, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.join().unwrap(), rating.calculate_rating(90.0 + i as f64));
        }
    }
}
