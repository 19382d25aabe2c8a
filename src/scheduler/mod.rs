//! Spaced repetition scheduling engine
//!
//! This module provides:
//! - Forgetting-curve formulas (retrievability, stability growth, intervals)
//! - The state machine over new/learning/review/relearning cards
//! - A `Scheduler` instance tying validated parameters to a seedable
//!   random source for interval fuzz

pub mod algorithm;
pub mod engine;
pub mod params;

pub use algorithm::{
    fuzz_interval, next_difficulty, next_interval, next_recall_stability, retrievability,
    ScheduleError,
};
pub use engine::{ReviewPreview, Scheduler};
pub use params::{ParameterError, SchedulingParameters};
