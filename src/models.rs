//! Data models for the scheduling engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle stage of a card in the spaced repetition system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardStatus {
    /// Never reviewed
    New,
    /// In initial learning phase
    Learning,
    /// Regular spaced review
    Review,
    /// Failed and re-learning
    Relearning,
}

impl Default for CardStatus {
    fn default() -> Self {
        Self::New
    }
}

/// Binary review rating.
///
/// The four-point Anki-style scale is collapsed to two outcomes so a
/// reviewer only decides "did I recall this or not".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rating {
    Wrong,
    Correct,
}

impl Rating {
    pub fn is_correct(self) -> bool {
        matches!(self, Rating::Correct)
    }
}

/// Current scheduling state for a card.
///
/// Owned by the card repository and passed by value into and out of the
/// engine. Callers may persist this struct verbatim; the field names are
/// the schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardState {
    pub card_id: Uuid,
    /// Current lifecycle stage
    #[serde(default)]
    pub state: CardStatus,
    /// Days for recall probability to decay to the target retention
    #[serde(default)]
    pub stability: f64,
    /// Intrinsic hardness, 1 (easiest) to 10 (hardest); 0 until first seeded
    #[serde(default)]
    pub difficulty: f64,
    /// Days since the previous review, written by the engine
    #[serde(default)]
    pub elapsed_days: f64,
    /// Interval chosen at the last scheduling, in days
    #[serde(default)]
    pub scheduled_days: f64,
    /// When the card is next due for review
    pub due_date: DateTime<Utc>,
    /// When the card was last reviewed, absent for new cards
    #[serde(default)]
    pub last_review: Option<DateTime<Utc>>,
    /// Total number of reviews
    #[serde(default)]
    pub reps: u32,
    /// Number of lapses (see the engine for what counts as one)
    #[serde(default)]
    pub lapses: u32,
    /// Index into the learning-step ladder
    #[serde(default)]
    pub learning_step: u32,
}

impl CardState {
    /// Fresh state for a card that has never been reviewed
    pub fn new(card_id: Uuid) -> Self {
        Self {
            card_id,
            state: CardStatus::New,
            stability: 0.0,
            difficulty: 0.0,
            elapsed_days: 0.0,
            scheduled_days: 0.0,
            due_date: Utc::now(),
            last_review: None,
            reps: 0,
            lapses: 0,
            learning_step: 0,
        }
    }

    /// Check if the card is due at the given instant
    pub fn is_due_at(&self, now: DateTime<Utc>) -> bool {
        self.due_date <= now
    }

    /// Check if the card is due for review
    pub fn is_due(&self) -> bool {
        self.is_due_at(Utc::now())
    }
}

/// Display category for a scheduled interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntervalCategory {
    Minutes,
    Hours,
    Days,
    Months,
    Years,
}

impl IntervalCategory {
    /// Categorize an interval expressed in days
    pub fn from_days(days: f64) -> Self {
        if days < 1.0 / 24.0 {
            Self::Minutes
        } else if days < 1.0 {
            Self::Hours
        } else if days < 30.0 {
            Self::Days
        } else if days < 365.0 {
            Self::Months
        } else {
            Self::Years
        }
    }
}

/// Interval chosen by the engine for a single scheduling decision
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntervalResult {
    /// Interval length in days (fractional for sub-day learning steps)
    pub days: f64,
    pub category: IntervalCategory,
}

impl IntervalResult {
    pub fn from_days(days: f64) -> Self {
        Self {
            days,
            category: IntervalCategory::from_days(days),
        }
    }
}

/// A record of a single review attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub id: Uuid,
    pub card_id: Uuid,
    pub rating: Rating,
    /// Interval scheduled by this review (days)
    pub interval_days: f64,
    /// Stability after this review
    pub stability: f64,
    /// Difficulty after this review
    pub difficulty: f64,
    /// How long the reviewer spent on the card
    pub seconds_taken: i64,
    /// When the review occurred
    pub reviewed_at: DateTime<Utc>,
}

impl ReviewRecord {
    pub fn new(
        card_id: Uuid,
        rating: Rating,
        interval_days: f64,
        stability: f64,
        difficulty: f64,
        seconds_taken: i64,
        reviewed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            card_id,
            rating,
            interval_days,
            stability,
            difficulty,
            seconds_taken,
            reviewed_at,
        }
    }
}

/// Aggregate statistics over a set of card states
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReviewStats {
    pub total_cards: usize,
    pub new_cards: usize,
    pub learning_cards: usize,
    pub review_cards: usize,
    pub due_cards: usize,
}

impl ReviewStats {
    /// Tally the lifecycle and due counts for a batch of states
    pub fn collect<'a>(states: impl IntoIterator<Item = &'a CardState>, now: DateTime<Utc>) -> Self {
        let mut stats = Self::default();

        for state in states {
            stats.total_cards += 1;
            match state.state {
                CardStatus::New => stats.new_cards += 1,
                CardStatus::Learning => stats.learning_cards += 1,
                CardStatus::Review | CardStatus::Relearning => stats.review_cards += 1,
            }
            if state.is_due_at(now) {
                stats.due_cards += 1;
            }
        }

        stats
    }
}
