//! Card repository collaborator interface
//!
//! The engine and the session coordinator never touch storage themselves.
//! Whatever owns the cards (a file store, a database, an editor plugin
//! host) implements this trait and hands states in and out by value.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::models::{CardState, ReviewRecord};

/// Narrowing criteria for a due-card query
#[derive(Debug, Clone, Default)]
pub struct DueFilter {
    /// Restrict to a single deck
    pub deck_id: Option<Uuid>,
    /// Restrict to cards carrying at least one of these tags
    pub tags: Vec<String>,
}

impl DueFilter {
    /// Match everything
    pub fn all() -> Self {
        Self::default()
    }
}

/// Storage collaborator driven by the session coordinator.
///
/// Failures propagate through the session verbatim as the implementation's
/// own error type; the coordinator neither retries nor wraps them.
pub trait CardRepository {
    type Error: std::error::Error;

    /// Cards currently due for review, in repository order
    fn get_due_cards(&self, filter: &DueFilter) -> Result<Vec<CardState>, Self::Error>;

    /// How many new cards were already introduced on the given date
    fn get_new_done_today(&self, date: NaiveDate) -> Result<u32, Self::Error>;

    /// Persist the scheduling state for a card
    fn persist_state(&mut self, card_id: Uuid, state: &CardState) -> Result<(), Self::Error>;

    /// Append one review to the card's history
    fn append_review(&mut self, record: &ReviewRecord) -> Result<(), Self::Error>;
}

#[cfg(test)]
pub(crate) mod memory {
    //! In-memory reference collaborator used by the crate's tests

    use std::collections::HashMap;
    use std::convert::Infallible;

    use chrono::{NaiveDate, Utc};
    use uuid::Uuid;

    use super::{CardRepository, DueFilter};
    use crate::models::{CardState, ReviewRecord};

    #[derive(Debug, Default)]
    pub(crate) struct MemoryRepository {
        states: HashMap<Uuid, CardState>,
        decks: HashMap<Uuid, Uuid>,
        tags: HashMap<Uuid, Vec<String>>,
        order: Vec<Uuid>,
        pub(crate) reviews: Vec<ReviewRecord>,
        pub(crate) new_done_by_date: HashMap<NaiveDate, u32>,
    }

    impl MemoryRepository {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        pub(crate) fn insert(&mut self, state: CardState) {
            self.order.push(state.card_id);
            self.states.insert(state.card_id, state);
        }

        pub(crate) fn insert_tagged(&mut self, state: CardState, deck_id: Uuid, tags: &[&str]) {
            self.decks.insert(state.card_id, deck_id);
            self.tags
                .insert(state.card_id, tags.iter().map(|t| t.to_string()).collect());
            self.insert(state);
        }

        pub(crate) fn state(&self, card_id: Uuid) -> &CardState {
            &self.states[&card_id]
        }

        fn matches(&self, card_id: Uuid, filter: &DueFilter) -> bool {
            if let Some(deck_id) = filter.deck_id {
                if self.decks.get(&card_id) != Some(&deck_id) {
                    return false;
                }
            }
            if !filter.tags.is_empty() {
                let card_tags = self.tags.get(&card_id);
                let has_any = card_tags
                    .map(|tags| filter.tags.iter().any(|t| tags.contains(t)))
                    .unwrap_or(false);
                if !has_any {
                    return false;
                }
            }
            true
        }
    }

    impl CardRepository for MemoryRepository {
        type Error = Infallible;

        fn get_due_cards(&self, filter: &DueFilter) -> Result<Vec<CardState>, Infallible> {
            let now = Utc::now();
            Ok(self
                .order
                .iter()
                .filter_map(|id| self.states.get(id))
                .filter(|s| s.is_due_at(now))
                .filter(|s| self.matches(s.card_id, filter))
                .cloned()
                .collect())
        }

        fn get_new_done_today(&self, date: NaiveDate) -> Result<u32, Infallible> {
            Ok(self.new_done_by_date.get(&date).copied().unwrap_or(0))
        }

        fn persist_state(&mut self, card_id: Uuid, state: &CardState) -> Result<(), Infallible> {
            if !self.states.contains_key(&card_id) {
                self.order.push(card_id);
            }
            self.states.insert(card_id, state.clone());
            Ok(())
        }

        fn append_review(&mut self, record: &ReviewRecord) -> Result<(), Infallible> {
            self.reviews.push(record.clone());
            Ok(())
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use chrono::Duration;

        fn due_card() -> CardState {
            let mut state = CardState::new(Uuid::new_v4());
            state.due_date = Utc::now() - Duration::hours(1);
            state
        }

        #[test]
        fn test_due_query_skips_future_cards() {
            let mut repo = MemoryRepository::new();
            repo.insert(due_card());
            let mut future = due_card();
            future.due_date = Utc::now() + Duration::days(3);
            repo.insert(future);

            let due = repo.get_due_cards(&DueFilter::all()).unwrap();
            assert_eq!(due.len(), 1);
        }

        #[test]
        fn test_filter_by_deck_and_tag() {
            let mut repo = MemoryRepository::new();
            let deck_a = Uuid::new_v4();
            let deck_b = Uuid::new_v4();
            repo.insert_tagged(due_card(), deck_a, &["rust"]);
            repo.insert_tagged(due_card(), deck_a, &["history"]);
            repo.insert_tagged(due_card(), deck_b, &["rust"]);

            let by_deck = DueFilter {
                deck_id: Some(deck_a),
                ..DueFilter::all()
            };
            assert_eq!(repo.get_due_cards(&by_deck).unwrap().len(), 2);

            let by_tag = DueFilter {
                tags: vec!["rust".to_string()],
                ..DueFilter::all()
            };
            assert_eq!(repo.get_due_cards(&by_tag).unwrap().len(), 2);

            let both = DueFilter {
                deck_id: Some(deck_a),
                tags: vec!["rust".to_string()],
            };
            assert_eq!(repo.get_due_cards(&both).unwrap().len(), 1);
        }

        #[test]
        fn test_new_done_today_defaults_to_zero() {
            let repo = MemoryRepository::new();
            let today = Utc::now().date_naive();
            assert_eq!(repo.get_new_done_today(today).unwrap(), 0);
        }
    }
}
