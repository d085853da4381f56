//! Replay simulation driver.
//!
//! Feeds a recorded list of hit events through a fresh [`ScoreProcessor`]
//! and builds the time series shown on results screens: accuracy/rating and
//! health over time, plus the best possible continuation of a play that was
//! quit or failed before the end of the map.

use crate::difficulty::rating::RatingProcessor;
use crate::logic::score_processor::{ScoreError, ScoreProcessor, ScoreSnapshot};
use crate::models::engine::hit_window::TimingWindows;
use crate::models::engine::note::MapInfo;
use crate::models::replay::{HitEvent, ReplayData, first_out_of_order};
use crate::models::settings::{Mods, ScoringConfig};
use crate::models::stats::Judgement;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rating points ignored at the start of a play when looking for the minimum.
pub const MIN_RATING_SKIP: usize = 20;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SimulationError {
    #[error("hit event {index} at {position}ms comes before the previous one at {previous}ms")]
    OutOfOrder {
        index: usize,
        previous: i32,
        position: i32,
    },
    #[error(transparent)]
    Score(#[from] ScoreError),
}

/// Anything placed on the song timeline.
pub trait Timed {
    fn time(&self) -> i32;
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingPoint {
    pub time: i32,
    pub accuracy: f64,
    pub rating: f64,
}

impl Timed for RatingPoint {
    fn time(&self) -> i32 {
        self.time
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HealthPoint {
    pub time: i32,
    pub health: f64,
}

impl Timed for HealthPoint {
    fn time(&self) -> i32 {
        self.time
    }
}

/// Append-only series holding at most one point per timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries<T> {
    points: Vec<T>,
}

impl<T> Default for TimeSeries<T> {
    fn default() -> Self {
        Self { points: Vec::new() }
    }
}

impl<T: Timed> TimeSeries<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `point`, or replaces the last point when it has the same time.
    pub fn record(&mut self, point: T) {
        match self.points.last_mut() {
            Some(last) if last.time() == point.time() => *last = point,
            _ => self.points.push(point),
        }
    }

    pub fn points(&self) -> &[T] {
        &self.points
    }

    pub fn last(&self) -> Option<&T> {
        self.points.last()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Everything derived from one replay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    /// Accuracy and rating of the actual play after each event. Points follow
    /// accuracy alone and are not zeroed when the play fails.
    pub rating: TimeSeries<RatingPoint>,
    pub health: TimeSeries<HealthPoint>,
    /// Best possible continuation after the play stopped. Empty when the play
    /// reached the end of the map.
    pub max_possible: TimeSeries<RatingPoint>,
    /// Lowest rating of the real play once the first [`MIN_RATING_SKIP`]
    /// points are ignored.
    pub min_rating: Option<f64>,
    /// State at the end of the real play.
    pub snapshot: ScoreSnapshot,
    /// Rating of the real play, 0 if it failed. Unlike the `rating` series this
    /// follows [`RatingProcessor::rating_for`].
    pub final_rating: f64,
    /// State at the end of the best possible continuation.
    pub max_possible_snapshot: Option<ScoreSnapshot>,
    /// Song position of the last real event, where the continuation picks up.
    pub continued_from: Option<i32>,
}

/// Rebuilds score, health and rating series from recorded hit events.
#[derive(Debug, Clone)]
pub struct ReplayEngine<'a> {
    map: &'a MapInfo,
    config: ScoringConfig,
    mods: Mods,
    rating: RatingProcessor,
}

impl<'a> ReplayEngine<'a> {
    pub fn new(map: &'a MapInfo, config: ScoringConfig, mods: Mods, difficulty: f64) -> Self {
        Self {
            map,
            config,
            mods,
            rating: RatingProcessor::new(difficulty),
        }
    }

    /// Engine using the mods the replay was recorded with.
    pub fn for_replay(
        map: &'a MapInfo,
        replay: &ReplayData,
        config: ScoringConfig,
        difficulty: f64,
    ) -> Self {
        if let (Some(expected), Some(actual)) = (&replay.map_md5, &map.md5) {
            if expected != actual {
                log::warn!("Replay was recorded on map {expected}, simulating on {actual}");
            }
        }
        Self::new(map, config, replay.mods, difficulty)
    }

    pub fn rating_processor(&self) -> &RatingProcessor {
        &self.rating
    }

    fn new_processor(&self) -> ScoreProcessor {
        ScoreProcessor::from_map(self.map, self.config.clone(), self.mods)
    }

    /// Runs the full simulation.
    ///
    /// Events must be in non-decreasing song position order; otherwise
    /// nothing is simulated and [`SimulationError::OutOfOrder`] is returned.
    pub fn simulate(&self, events: &[HitEvent]) -> Result<SimulationResult, SimulationError> {
        check_order(events)?;

        let mut processor = self.new_processor();
        let mut rating = TimeSeries::new();
        let mut health = TimeSeries::new();

        for event in events {
            processor.process_event(event)?;

            let accuracy = processor.accuracy();
            rating.record(RatingPoint {
                time: event.song_position,
                accuracy,
                rating: self.rating.calculate_rating(accuracy),
            });
            health.record(HealthPoint {
                time: event.song_position,
                health: processor.health(),
            });
        }

        let snapshot = processor.snapshot();
        let final_rating = self.rating.rating_for(&processor);
        let min_rating = min_rating(&rating);

        let mut max_possible = TimeSeries::new();
        let mut max_possible_snapshot = None;
        let mut continued_from = None;

        if let Some(last) = events.last() {
            if !processor.is_finished() {
                self.continue_max_possible(&mut processor, &mut max_possible)?;
                max_possible_snapshot = Some(processor.snapshot());
                continued_from = Some(last.song_position);
            }
        }

        log::debug!(
            "Simulated {} events: score {}, acc {:.2}%, {} rating points, {} max possible points",
            events.len(),
            snapshot.score,
            snapshot.accuracy,
            rating.len(),
            max_possible.len()
        );

        Ok(SimulationResult {
            rating,
            health,
            max_possible,
            min_rating,
            snapshot,
            final_rating,
            max_possible_snapshot,
            continued_from,
        })
    }

    /// Feeds a marv for every action of the map not judged yet.
    ///
    /// The map's actions are taken in time order and the first
    /// `processed_judgement_count` of them are treated as already played, so
    /// unplayed chord notes and notes hit early are both accounted for.
    fn continue_max_possible(
        &self,
        processor: &mut ScoreProcessor,
        series: &mut TimeSeries<RatingPoint>,
    ) -> Result<(), SimulationError> {
        let played = processor.processed_judgement_count() as usize;

        for (time, is_release) in self.map.judgement_actions().into_iter().skip(played) {
            if processor.is_finished() {
                break;
            }
            processor.calculate_score(Judgement::Marv, is_release)?;

            let accuracy = processor.accuracy();
            series.record(RatingPoint {
                time,
                accuracy,
                rating: self.rating.calculate_rating(accuracy),
            });
        }

        Ok(())
    }

    /// Processor state after every event up to and including `song_position`.
    pub fn processor_at(
        &self,
        events: &[HitEvent],
        song_position: i32,
    ) -> Result<ScoreProcessor, SimulationError> {
        check_order(events)?;

        let mut processor = self.new_processor();
        for event in events
            .iter()
            .take_while(|e| e.song_position <= song_position)
        {
            processor.process_event(event)?;
        }
        Ok(processor)
    }

    /// Simulates the same events judged with different timing windows.
    pub fn rejudge(
        &self,
        events: &[HitEvent],
        windows: TimingWindows,
    ) -> Result<SimulationResult, SimulationError> {
        let engine = ReplayEngine {
            config: ScoringConfig {
                windows,
                ..self.config.clone()
            },
            ..self.clone()
        };
        engine.simulate(events)
    }
}

fn check_order(events: &[HitEvent]) -> Result<(), SimulationError> {
    match first_out_of_order(events) {
        Some(index) => Err(SimulationError::OutOfOrder {
            index,
            previous: events[index - 1].song_position,
            position: events[index].song_position,
        }),
        None => Ok(()),
    }
}

/// Minimum rating after the opening points. Short plays use every point.
fn min_rating(series: &TimeSeries<RatingPoint>) -> Option<f64> {
    let points = series.points();
    let considered = if points.len() > MIN_RATING_SKIP {
        &points[MIN_RATING_SKIP..]
    } else {
        points
    };

    considered.iter().map(|p| p.rating).reduce(f64::min)
}
