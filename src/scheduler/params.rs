//! Tunable parameters for the scheduling engine

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParameterError {
    #[error("target_retention {0} outside supported range [0.70, 0.95]")]
    TargetRetentionOutOfRange(f64),

    #[error("learning_steps must contain at least one positive minute value")]
    InvalidLearningSteps,

    #[error("initial stability must be positive, got {0}")]
    NonPositiveInitialStability(f64),

    #[error("forget_stability_retention {0} outside supported range (0, 1]")]
    ForgetRetentionOutOfRange(f64),

    #[error("max_interval_days must be at least 1, got {0}")]
    MaxIntervalTooSmall(f64),

    #[error("stability_growth_factor must be greater than 1, got {0}")]
    GrowthFactorTooSmall(f64),
}

/// Engine configuration, immutable for the lifetime of a scheduler.
///
/// Every field has a serde default so a partial config file deserializes
/// into a usable parameter set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulingParameters {
    /// Seed stability (days) when the first exposure is rated Wrong
    #[serde(default = "default_initial_stability_wrong")]
    pub initial_stability_wrong: f64,
    /// Seed stability (days) when the first exposure is rated Correct
    #[serde(default = "default_initial_stability_correct")]
    pub initial_stability_correct: f64,
    /// Seed difficulty on first exposure
    #[serde(default = "default_initial_difficulty")]
    pub initial_difficulty: f64,
    /// Subtracted from difficulty on a Correct rating
    #[serde(default = "default_difficulty_decay")]
    pub difficulty_decay: f64,
    /// Added to difficulty on a Wrong rating
    #[serde(default = "default_difficulty_growth")]
    pub difficulty_growth: f64,
    /// Base multiplier for stability growth on successful recall
    #[serde(default = "default_stability_growth_factor")]
    pub stability_growth_factor: f64,
    /// How strongly high difficulty suppresses stability growth
    #[serde(default = "default_difficulty_weight_in_growth")]
    pub difficulty_weight_in_growth: f64,
    /// Fraction of stability kept after a lapse
    #[serde(default = "default_forget_stability_retention")]
    pub forget_stability_retention: f64,
    /// Intra-day learning ladder, in minutes
    #[serde(default = "default_learning_steps")]
    pub learning_steps: Vec<f64>,
    /// Desired recall probability at the scheduled due date
    #[serde(default = "default_target_retention")]
    pub target_retention: f64,
    /// Upper clamp on any computed interval, in days
    #[serde(default = "default_max_interval_days")]
    pub max_interval_days: f64,
    /// Whether day-scale intervals get randomized jitter
    #[serde(default = "default_fuzz_enabled")]
    pub fuzz_enabled: bool,
}

fn default_initial_stability_wrong() -> f64 {
    0.4
}

fn default_initial_stability_correct() -> f64 {
    3.0
}

fn default_initial_difficulty() -> f64 {
    5.0
}

fn default_difficulty_decay() -> f64 {
    0.4
}

fn default_difficulty_growth() -> f64 {
    1.2
}

fn default_stability_growth_factor() -> f64 {
    2.5
}

fn default_difficulty_weight_in_growth() -> f64 {
    0.8
}

fn default_forget_stability_retention() -> f64 {
    0.3
}

fn default_learning_steps() -> Vec<f64> {
    vec![1.0, 10.0]
}

fn default_target_retention() -> f64 {
    0.9
}

fn default_max_interval_days() -> f64 {
    36500.0
}

fn default_fuzz_enabled() -> bool {
    true
}

impl Default for SchedulingParameters {
    fn default() -> Self {
        Self {
            initial_stability_wrong: default_initial_stability_wrong(),
            initial_stability_correct: default_initial_stability_correct(),
            initial_difficulty: default_initial_difficulty(),
            difficulty_decay: default_difficulty_decay(),
            difficulty_growth: default_difficulty_growth(),
            stability_growth_factor: default_stability_growth_factor(),
            difficulty_weight_in_growth: default_difficulty_weight_in_growth(),
            forget_stability_retention: default_forget_stability_retention(),
            learning_steps: default_learning_steps(),
            target_retention: default_target_retention(),
            max_interval_days: default_max_interval_days(),
            fuzz_enabled: default_fuzz_enabled(),
        }
    }
}

impl SchedulingParameters {
    /// Reject configurations the engine formulas cannot work with
    pub fn validate(&self) -> Result<(), ParameterError> {
        if !(0.70..=0.95).contains(&self.target_retention) {
            return Err(ParameterError::TargetRetentionOutOfRange(
                self.target_retention,
            ));
        }
        if self.learning_steps.is_empty() || self.learning_steps.iter().any(|&m| m <= 0.0) {
            return Err(ParameterError::InvalidLearningSteps);
        }
        if self.initial_stability_wrong <= 0.0 {
            return Err(ParameterError::NonPositiveInitialStability(
                self.initial_stability_wrong,
            ));
        }
        if self.initial_stability_correct <= 0.0 {
            return Err(ParameterError::NonPositiveInitialStability(
                self.initial_stability_correct,
            ));
        }
        if self.forget_stability_retention <= 0.0 || self.forget_stability_retention > 1.0 {
            return Err(ParameterError::ForgetRetentionOutOfRange(
                self.forget_stability_retention,
            ));
        }
        if self.max_interval_days < 1.0 {
            return Err(ParameterError::MaxIntervalTooSmall(self.max_interval_days));
        }
        if self.stability_growth_factor <= 1.0 {
            return Err(ParameterError::GrowthFactorTooSmall(
                self.stability_growth_factor,
            ));
        }
        Ok(())
    }

    /// Learning-step interval in days for the given ladder index
    pub(crate) fn learning_step_days(&self, step: usize) -> f64 {
        let idx = step.min(self.learning_steps.len() - 1);
        self.learning_steps[idx] / 1440.0
    }
}
