//! Score processing and replay simulation.
//!
//! Everything here is synchronous and free of I/O. Each simulation owns its
//! own [`ScoreProcessor`]; independent simulations can run on separate
//! threads without any locking.

pub mod replay_engine;
pub mod score_processor;

pub use replay_engine::{
    HealthPoint, RatingPoint, ReplayEngine, SimulationError, SimulationResult, TimeSeries,
};
pub use score_processor::{HitStat, ScoreError, ScoreProcessor, ScoreSnapshot};
