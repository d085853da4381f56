//! Difficulty-derived values.
//!
//! Map difficulty itself is computed elsewhere and passed in as a number;
//! this module only turns it and an accuracy into a rating.

pub mod rating;

pub use rating::RatingProcessor;
