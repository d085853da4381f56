//! Scoring core of a vertical scrolling rhythm game.
//!
//! Turns a stream of judged hits into score, combo, accuracy, health and
//! rating, and rebuilds those values as time series from a stored replay.

pub mod database;
pub mod difficulty;
pub mod logic;
pub mod models;

pub use difficulty::RatingProcessor;
pub use logic::{ReplayEngine, ScoreProcessor, SimulationResult};
pub use models::engine::{HitObject, MapInfo, TimingWindows};
pub use models::replay::{HitEvent, ReplayData};
pub use models::settings::{Mods, ScoringConfig};
pub use models::stats::{Judgement, JudgementCounts, KeyPressType};
