//! Spaced repetition scheduling core
//!
//! This crate is the scheduling heart of a flashcard system: given a
//! card's learning history and a binary rating, it computes the next
//! review state and due date, and it coordinates one review sitting over
//! a queue of due cards.
//!
//! - [`scheduler`] - forgetting-curve model, state machine over
//!   new/learning/review/relearning cards, interval computation with
//!   bounded random fuzz
//! - [`session`] - queue construction, answer/undo/skip stepping,
//!   per-session statistics
//! - [`repository`] - the storage collaborator interface; persistence
//!   itself lives with the caller
//!
//! The engine does no I/O and holds no global state. Construct a
//! [`Scheduler`] from [`SchedulingParameters`], hand it to a
//! [`ReviewSession`], and drive the session once per rating event:
//!
//! ```rust,ignore
//! let scheduler = Scheduler::new(SchedulingParameters::default())?;
//! let mut session =
//!     ReviewSession::from_repository(scheduler, &repo, &DueFilter::all(), Some(20), today)?;
//!
//! while let Some(card) = session.next().cloned() {
//!     let rating = ask_user(&card);
//!     session.answer(&mut repo, rating)?;
//! }
//! println!("{:?}", session.summary());
//! ```
//!
//! Randomness (interval fuzz, queue interleaving) flows from a single
//! seedable source owned by the scheduler, so `Scheduler::with_seed`
//! makes a whole session reproducible.

pub mod models;
pub mod repository;
pub mod scheduler;
pub mod session;

pub use models::{
    CardState, CardStatus, IntervalCategory, IntervalResult, Rating, ReviewRecord, ReviewStats,
};
pub use repository::{CardRepository, DueFilter};
pub use scheduler::{
    ParameterError, ReviewPreview, ScheduleError, Scheduler, SchedulingParameters,
};
pub use session::{AnswerOutcome, ReviewSession, SessionError, SessionSummary};
