//! Forgetting-curve model and review state transitions
//!
//! The model is a half-life exponential: a card's `stability` is the number
//! of days after which recall probability has decayed to 50%. Intervals are
//! chosen so that predicted recall at the due date equals the configured
//! target retention. Ratings are binary; each lifecycle stage has exactly
//! two outgoing transitions.

use std::f64::consts::LN_2;

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use thiserror::Error;

use crate::models::{CardState, CardStatus, IntervalResult, Rating};

use super::params::SchedulingParameters;

#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("invalid card state: {reason}")]
    InvalidState { reason: String },
}

/// Probability of successful recall after `elapsed_days`, for a card with
/// the given stability. Returns 0 for cards with no stability yet.
pub fn retrievability(elapsed_days: f64, stability: f64) -> f64 {
    if stability <= 0.0 {
        return 0.0;
    }
    (-elapsed_days / stability * LN_2).exp()
}

/// Difficulty after one rating, clamped to [1, 10].
///
/// Correct answers ease the card, wrong answers harden it.
pub fn next_difficulty(params: &SchedulingParameters, difficulty: f64, rating: Rating) -> f64 {
    let shifted = match rating {
        Rating::Correct => difficulty - params.difficulty_decay,
        Rating::Wrong => difficulty + params.difficulty_growth,
    };
    shifted.clamp(1.0, 10.0)
}

/// Stability after a successful recall.
///
/// Growth is damped for hard cards and for recalls made while the card was
/// still fresh in memory, but never amounts to less than one extra day.
pub fn next_recall_stability(
    params: &SchedulingParameters,
    difficulty: f64,
    stability: f64,
    retrievability: f64,
) -> f64 {
    let difficulty_damp = 1.0 - (difficulty - 1.0) * params.difficulty_weight_in_growth / 9.0;
    let recall_boost = 1.0 + (1.0 - retrievability) * 0.5;
    let grown = stability * params.stability_growth_factor * difficulty_damp * recall_boost;
    grown.max(stability + 1.0)
}

/// Interval (whole days) at which predicted recall equals the target
/// retention, clamped to [1, max_interval_days].
pub fn next_interval(params: &SchedulingParameters, stability: f64) -> f64 {
    let days = (-stability * params.target_retention.ln() / LN_2).round();
    days.clamp(1.0, params.max_interval_days)
}

/// Apply bounded random jitter to a day-scale interval.
///
/// Intervals under 2.5 days pass through untouched, as does everything when
/// fuzzing is disabled. The jitter band narrows as intervals grow so that
/// long schedules drift by at most 5%. The result never drops below 2 days.
pub fn fuzz_interval<R: Rng>(params: &SchedulingParameters, interval: f64, rng: &mut R) -> f64 {
    if !params.fuzz_enabled || interval < 2.5 {
        return interval;
    }

    let band = if interval < 7.0 {
        0.15
    } else if interval < 30.0 {
        0.10
    } else {
        0.05
    };

    let lower = ((interval * (1.0 - band)).round() as i64).max(2);
    let upper = ((interval * (1.0 + band)).round() as i64).max(lower);
    rng.gen_range(lower..=upper) as f64
}

fn days_between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> f64 {
    let seconds = later.signed_duration_since(earlier).num_seconds();
    (seconds as f64 / 86_400.0).max(0.0)
}

fn validate(state: &CardState) -> Result<(), ScheduleError> {
    if !state.stability.is_finite() || state.stability < 0.0 {
        return Err(ScheduleError::InvalidState {
            reason: format!("stability {} is negative or not finite", state.stability),
        });
    }
    if !state.difficulty.is_finite() || !(0.0..=10.0).contains(&state.difficulty) {
        return Err(ScheduleError::InvalidState {
            reason: format!("difficulty {} outside [0, 10]", state.difficulty),
        });
    }
    Ok(())
}

fn initial_stability(params: &SchedulingParameters, rating: Rating) -> f64 {
    match rating {
        Rating::Wrong => params.initial_stability_wrong,
        Rating::Correct => params.initial_stability_correct,
    }
}

/// Compute the successor state and interval for one review.
///
/// Pure except for the optional fuzz draw: pass `None` to get the unfuzzed
/// interval (used by previews), or a generator to jitter day-scale review
/// intervals.
pub(crate) fn apply_review<R: Rng>(
    params: &SchedulingParameters,
    state: &CardState,
    rating: Rating,
    now: DateTime<Utc>,
    fuzz_rng: Option<&mut R>,
) -> Result<(CardState, IntervalResult), ScheduleError> {
    validate(state)?;

    let elapsed = state
        .last_review
        .map(|last| days_between(last, now))
        .unwrap_or(0.0);
    let recall = retrievability(elapsed, state.stability);

    let mut next = state.clone();
    next.reps = state.reps + 1;

    let interval_days = match state.state {
        CardStatus::New => {
            next.reps = 1;
            next.stability = initial_stability(params, rating);
            next.difficulty = params.initial_difficulty;
            next.state = CardStatus::Learning;
            match rating {
                Rating::Correct => {
                    next.learning_step = 1;
                    next.lapses = 0;
                    params.learning_step_days(1)
                }
                Rating::Wrong => {
                    next.learning_step = 0;
                    next.lapses = 1;
                    params.learning_step_days(0)
                }
            }
        }

        CardStatus::Learning | CardStatus::Relearning => match rating {
            Rating::Correct => {
                let step = state.learning_step + 1;
                if step as usize >= params.learning_steps.len() {
                    // Ladder exhausted: graduate into spaced review.
                    next.state = CardStatus::Review;
                    next.stability =
                        next_recall_stability(params, state.difficulty, state.stability, recall);
                    next.difficulty = next_difficulty(params, state.difficulty, Rating::Correct);
                    next.learning_step = 0;
                    let base = next_interval(params, next.stability);
                    match fuzz_rng {
                        Some(rng) => fuzz_interval(params, base, rng),
                        None => base,
                    }
                } else {
                    next.learning_step = step;
                    params.learning_step_days(step as usize)
                }
            }
            Rating::Wrong => {
                next.stability = params.initial_stability_wrong;
                next.difficulty = next_difficulty(params, state.difficulty, Rating::Wrong);
                next.learning_step = 0;
                // A failure chain counts one lapse: the first Wrong in
                // Learning counts, further Wrongs while Relearning do not.
                if state.state == CardStatus::Learning {
                    next.lapses = state.lapses + 1;
                }
                params.learning_step_days(0)
            }
        },

        CardStatus::Review => match rating {
            Rating::Correct => {
                next.stability =
                    next_recall_stability(params, state.difficulty, state.stability, recall);
                next.difficulty = next_difficulty(params, state.difficulty, Rating::Correct);
                let base = next_interval(params, next.stability);
                match fuzz_rng {
                    Some(rng) => fuzz_interval(params, base, rng),
                    None => base,
                }
            }
            Rating::Wrong => {
                next.state = CardStatus::Relearning;
                next.stability = params
                    .initial_stability_wrong
                    .max(state.stability * params.forget_stability_retention);
                next.difficulty = next_difficulty(params, state.difficulty, Rating::Wrong);
                next.lapses = state.lapses + 1;
                next.learning_step = 0;
                params.learning_step_days(0)
            }
        },
    };

    next.elapsed_days = elapsed;
    next.scheduled_days = interval_days;
    next.last_review = Some(now);
    next.due_date = now + Duration::seconds((interval_days * 86_400.0).floor() as i64);

    Ok((next, IntervalResult::from_days(interval_days)))
}
