//! Plain data types of the scoring core.

pub mod engine;
pub mod replay;
pub mod settings;
pub mod stats;
