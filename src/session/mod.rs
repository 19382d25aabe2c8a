//! Review session coordination
//!
//! This module provides:
//! - Prioritized queue construction over a due-card set
//! - The `ReviewSession` driver: step, answer, undo, skip
//! - Per-session statistics and the session review log

pub mod queue;
pub mod review;

pub use review::{AnswerOutcome, ReviewSession, SessionError, SessionSummary};
