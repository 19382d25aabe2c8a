//! Scheduler instance: validated parameters plus an injectable random source

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::models::{CardState, IntervalResult, Rating};

use super::algorithm::{apply_review, ScheduleError};
use super::params::{ParameterError, SchedulingParameters};

/// Unfuzzed intervals for both possible ratings of a card, computed without
/// committing any state. Shown to the reviewer before they answer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReviewPreview {
    pub wrong: IntervalResult,
    pub correct: IntervalResult,
}

/// The scheduling engine.
///
/// Holds validated parameters and the random source used for interval fuzz,
/// so scheduling stays deterministic under a fixed seed. Construct one per
/// configuration and pass it where reviews happen; there is no process-wide
/// default instance.
pub struct Scheduler {
    params: SchedulingParameters,
    rng: StdRng,
}

impl Scheduler {
    /// Build a scheduler with an entropy-seeded random source
    pub fn new(params: SchedulingParameters) -> Result<Self, ParameterError> {
        params.validate()?;
        Ok(Self {
            params,
            rng: StdRng::from_entropy(),
        })
    }

    /// Build a scheduler with a fixed seed, for reproducible runs
    pub fn with_seed(params: SchedulingParameters, seed: u64) -> Result<Self, ParameterError> {
        params.validate()?;
        Ok(Self {
            params,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    pub fn params(&self) -> &SchedulingParameters {
        &self.params
    }

    /// Random source shared with the session queue builder
    pub(crate) fn rng_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// Compute the successor state and interval for one rated review.
    ///
    /// The input state is not modified; the caller decides whether to
    /// persist the returned state. Fails only on malformed input.
    pub fn schedule(
        &mut self,
        state: &CardState,
        rating: Rating,
        now: DateTime<Utc>,
    ) -> Result<(CardState, IntervalResult), ScheduleError> {
        apply_review(&self.params, state, rating, now, Some(&mut self.rng))
    }

    /// Intervals both ratings would produce, without committing anything.
    ///
    /// Fuzz is skipped so the preview is deterministic and this method can
    /// take `&self`.
    pub fn preview(
        &self,
        state: &CardState,
        now: DateTime<Utc>,
    ) -> Result<ReviewPreview, ScheduleError> {
        let (_, wrong) = apply_review::<StdRng>(&self.params, state, Rating::Wrong, now, None)?;
        let (_, correct) = apply_review::<StdRng>(&self.params, state, Rating::Correct, now, None)?;
        Ok(ReviewPreview { wrong, correct })
    }
}
