//! Review session coordination
//!
//! A session owns the ordered queue for one sitting, steps through it,
//! delegates scheduling to the engine, and keeps statistics plus an undo
//! history. Sessions are single-threaded; callers serialize access to one
//! instance. Nothing here is persisted: only card states and review
//! records survive, through the repository.

use std::convert::Infallible;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{CardState, CardStatus, IntervalResult, Rating, ReviewRecord};
use crate::repository::{CardRepository, DueFilter};
use crate::scheduler::{ScheduleError, Scheduler};

use super::queue::build_queue;

/// Cards still in a sub-day learning phase come around again in the same
/// sitting when they fall due within this horizon.
const REQUEUE_HORIZON_MINUTES: i64 = 30;

#[derive(Error, Debug)]
pub enum SessionError<E: std::error::Error = Infallible> {
    #[error("no card is currently available in the review queue")]
    EmptyQueue,

    #[error("nothing to undo")]
    NothingToUndo,

    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    #[error(transparent)]
    Repository(E),
}

/// What `answer` hands back: the committed state and the interval it was
/// scheduled with
#[derive(Debug, Clone)]
pub struct AnswerOutcome {
    pub state: CardState,
    pub interval: IntervalResult,
}

/// Computed view over a session's progress
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub answered: u32,
    pub correct: u32,
    pub wrong: u32,
    /// Bucket sizes at queue-build time
    pub new_cards: usize,
    pub learning_cards: usize,
    pub review_cards: usize,
    /// Queue entries not yet answered
    pub remaining: usize,
    pub duration_secs: i64,
    pub mean_secs_per_card: f64,
    /// Percentage of answered cards rated Correct, 0 when none answered
    pub retention_rate: f64,
}

#[derive(Debug, Clone)]
struct UndoEntry {
    card_id: Uuid,
    prior_state: CardState,
    rating: Rating,
    /// Whether the answer put a same-session revisit on the queue tail
    requeued: bool,
}

/// One review sitting over a queue of due cards
pub struct ReviewSession {
    scheduler: Scheduler,
    queue: Vec<CardState>,
    cursor: usize,
    started_at: DateTime<Utc>,
    card_shown_at: Option<DateTime<Utc>>,
    correct_count: u32,
    wrong_count: u32,
    new_total: usize,
    learning_total: usize,
    review_total: usize,
    undo_stack: Vec<UndoEntry>,
    records: Vec<ReviewRecord>,
}

impl ReviewSession {
    /// Build a session over an already-fetched due-card set.
    ///
    /// The new-card bucket is truncated to `new_daily_cap` minus
    /// `new_done_today`; learning cards lead the queue and review/new cards
    /// are interleaved behind them. The scheduler's random source drives
    /// the interleaving, so a seeded scheduler yields a reproducible queue.
    pub fn new(
        mut scheduler: Scheduler,
        due_cards: Vec<CardState>,
        new_daily_cap: Option<u32>,
        new_done_today: u32,
    ) -> Self {
        let built = build_queue(due_cards, new_daily_cap, new_done_today, scheduler.rng_mut());
        Self {
            scheduler,
            queue: built.cards,
            cursor: 0,
            started_at: Utc::now(),
            card_shown_at: None,
            correct_count: 0,
            wrong_count: 0,
            new_total: built.new_count,
            learning_total: built.learning_count,
            review_total: built.review_count,
            undo_stack: Vec::new(),
            records: Vec::new(),
        }
    }

    /// Fetch due cards and today's new-card count from the repository, then
    /// build a session over them
    pub fn from_repository<R: CardRepository>(
        scheduler: Scheduler,
        repo: &R,
        filter: &DueFilter,
        new_daily_cap: Option<u32>,
        today: NaiveDate,
    ) -> Result<Self, SessionError<R::Error>> {
        let due_cards = repo
            .get_due_cards(filter)
            .map_err(SessionError::Repository)?;
        let new_done_today = repo
            .get_new_done_today(today)
            .map_err(SessionError::Repository)?;
        Ok(Self::new(scheduler, due_cards, new_daily_cap, new_done_today))
    }

    /// The card under the cursor, if the session is not complete
    pub fn current(&self) -> Option<&CardState> {
        self.queue.get(self.cursor)
    }

    /// Present the current card: stamps the shown timestamp used to measure
    /// time spent, and returns the card to display
    pub fn next(&mut self) -> Option<&CardState> {
        if self.cursor >= self.queue.len() {
            return None;
        }
        self.card_shown_at = Some(Utc::now());
        self.queue.get(self.cursor)
    }

    /// Intervals both ratings would give the current card
    pub fn preview(&self) -> Result<crate::scheduler::ReviewPreview, SessionError> {
        let card = self.current().ok_or(SessionError::EmptyQueue)?;
        Ok(self.scheduler.preview(card, Utc::now())?)
    }

    /// Rate the current card.
    ///
    /// Schedules the card, persists the new state, appends a review record,
    /// and advances the cursor. A card that lands back in a learning phase
    /// and falls due within half an hour is re-enqueued at the tail for a
    /// same-session revisit.
    pub fn answer<R: CardRepository>(
        &mut self,
        repo: &mut R,
        rating: Rating,
    ) -> Result<AnswerOutcome, SessionError<R::Error>> {
        let now = Utc::now();
        let current = self
            .queue
            .get(self.cursor)
            .cloned()
            .ok_or(SessionError::EmptyQueue)?;

        let (new_state, interval) = self.scheduler.schedule(&current, rating, now)?;

        let seconds_taken = self
            .card_shown_at
            .map(|shown| now.signed_duration_since(shown).num_seconds().max(0))
            .unwrap_or(0);
        let record = ReviewRecord::new(
            current.card_id,
            rating,
            interval.days,
            new_state.stability,
            new_state.difficulty,
            seconds_taken,
            now,
        );

        repo.persist_state(current.card_id, &new_state)
            .map_err(SessionError::Repository)?;
        repo.append_review(&record)
            .map_err(SessionError::Repository)?;

        self.queue[self.cursor] = new_state.clone();
        match rating {
            Rating::Correct => self.correct_count += 1,
            Rating::Wrong => self.wrong_count += 1,
        }

        let requeued = matches!(
            new_state.state,
            CardStatus::Learning | CardStatus::Relearning
        ) && new_state.due_date.signed_duration_since(now)
            <= Duration::minutes(REQUEUE_HORIZON_MINUTES);
        if requeued {
            self.queue.push(new_state.clone());
        }

        self.undo_stack.push(UndoEntry {
            card_id: current.card_id,
            prior_state: current,
            rating,
            requeued,
        });
        self.records.push(record);
        self.cursor += 1;
        self.card_shown_at = None;

        log::debug!(
            "card {} rated {:?}, now {:?}, due {}",
            new_state.card_id,
            rating,
            new_state.state,
            new_state.due_date
        );

        Ok(AnswerOutcome {
            state: new_state,
            interval,
        })
    }

    /// Revert the most recent answer.
    ///
    /// Restores the prior persisted state, drops the review record from the
    /// session log, rolls the counters and cursor back, and removes the
    /// same-session revisit that answer may have enqueued.
    pub fn undo<R: CardRepository>(
        &mut self,
        repo: &mut R,
    ) -> Result<CardState, SessionError<R::Error>> {
        let entry = self
            .undo_stack
            .last()
            .cloned()
            .ok_or(SessionError::NothingToUndo)?;

        repo.persist_state(entry.card_id, &entry.prior_state)
            .map_err(SessionError::Repository)?;
        self.undo_stack.pop();

        if entry.requeued {
            if let Some(pos) = self.queue.iter().rposition(|c| c.card_id == entry.card_id) {
                if pos >= self.cursor {
                    self.queue.remove(pos);
                }
            }
        }

        self.cursor = self.cursor.saturating_sub(1);
        debug_assert_eq!(self.queue[self.cursor].card_id, entry.card_id);
        self.queue[self.cursor] = entry.prior_state.clone();

        match entry.rating {
            Rating::Correct => self.correct_count = self.correct_count.saturating_sub(1),
            Rating::Wrong => self.wrong_count = self.wrong_count.saturating_sub(1),
        }
        self.records.pop();
        self.card_shown_at = None;

        log::debug!("undid review of card {}", entry.card_id);

        Ok(entry.prior_state)
    }

    /// Push the current card to the queue tail without rating it. The
    /// cursor stays put, so the next card slides into view.
    pub fn skip(&mut self) -> Result<(), SessionError> {
        if self.cursor >= self.queue.len() {
            return Err(SessionError::EmptyQueue);
        }
        let card = self.queue.remove(self.cursor);
        self.queue.push(card);
        self.card_shown_at = None;
        Ok(())
    }

    /// True once every queue entry has been answered
    pub fn is_complete(&self) -> bool {
        self.cursor >= self.queue.len()
    }

    /// Queue entries not yet answered
    pub fn remaining(&self) -> usize {
        self.queue.len() - self.cursor
    }

    /// Review records produced so far this sitting
    pub fn records(&self) -> &[ReviewRecord] {
        &self.records
    }

    /// Wall-clock time since the session started
    pub fn elapsed(&self) -> Duration {
        Utc::now().signed_duration_since(self.started_at)
    }

    pub fn summary(&self) -> SessionSummary {
        let answered = self.correct_count + self.wrong_count;
        let duration_secs = self.elapsed().num_seconds();
        let mean_secs_per_card = if answered > 0 {
            duration_secs as f64 / answered as f64
        } else {
            0.0
        };
        let retention_rate = if answered > 0 {
            self.correct_count as f64 / answered as f64 * 100.0
        } else {
            0.0
        };

        SessionSummary {
            answered,
            correct: self.correct_count,
            wrong: self.wrong_count,
            new_cards: self.new_total,
            learning_cards: self.learning_total,
            review_cards: self.review_total,
            remaining: self.remaining(),
            duration_secs,
            mean_secs_per_card,
            retention_rate,
        }
    }
}
