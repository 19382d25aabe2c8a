//! Review queue construction
//!
//! Learning and relearning cards come first since their sub-day steps need
//! frequent revisits. New and review cards are then interleaved with a
//! weighted random draw so fresh material is spread through the backlog
//! instead of clumping at either end.

use std::collections::VecDeque;

use rand::Rng;

use crate::models::{CardState, CardStatus};

/// Chance of drawing from the review bucket while both buckets are non-empty
pub(crate) const REVIEW_DRAW_PROBABILITY: f64 = 0.7;

pub(crate) struct BuiltQueue {
    pub cards: Vec<CardState>,
    /// Bucket sizes recorded before interleaving
    pub new_count: usize,
    pub learning_count: usize,
    pub review_count: usize,
}

/// Order a due-card set into a review queue.
///
/// The new bucket is truncated to whatever remains of the daily cap.
/// Within each bucket the incoming order is preserved.
pub(crate) fn build_queue<R: Rng>(
    due_cards: Vec<CardState>,
    new_daily_cap: Option<u32>,
    new_done_today: u32,
    rng: &mut R,
) -> BuiltQueue {
    let mut new_bucket = Vec::new();
    let mut learning_bucket = Vec::new();
    let mut review_bucket = Vec::new();

    for card in due_cards {
        match card.state {
            CardStatus::New => new_bucket.push(card),
            CardStatus::Learning | CardStatus::Relearning => learning_bucket.push(card),
            CardStatus::Review => review_bucket.push(card),
        }
    }

    if let Some(cap) = new_daily_cap {
        let remaining = cap.saturating_sub(new_done_today) as usize;
        new_bucket.truncate(remaining);
    }

    let new_count = new_bucket.len();
    let learning_count = learning_bucket.len();
    let review_count = review_bucket.len();

    let mut cards = learning_bucket;
    cards.reserve(new_count + review_count);

    let mut new_queue: VecDeque<CardState> = new_bucket.into();
    let mut review_queue: VecDeque<CardState> = review_bucket.into();

    while !new_queue.is_empty() && !review_queue.is_empty() {
        let drawn = if rng.gen_bool(REVIEW_DRAW_PROBABILITY) {
            review_queue.pop_front()
        } else {
            new_queue.pop_front()
        };
        if let Some(card) = drawn {
            cards.push(card);
        }
    }
    cards.extend(review_queue);
    cards.extend(new_queue);

    log::info!(
        "review queue built: {} learning, {} new, {} review",
        learning_count,
        new_count,
        review_count
    );

    BuiltQueue {
        cards,
        new_count,
        learning_count,
        review_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use uuid::Uuid;

    fn card(status: CardStatus) -> CardState {
        let mut state = CardState::new(Uuid::new_v4());
        state.state = status;
        state
    }

    fn ids_with_status(cards: &[CardState], status: CardStatus) -> Vec<Uuid> {
        cards
            .iter()
            .filter(|c| c.state == status)
            .map(|c| c.card_id)
            .collect()
    }

    #[test]
    fn test_queue_layout_with_daily_cap() {
        let new: Vec<CardState> = (0..10).map(|_| card(CardStatus::New)).collect();
        let learning: Vec<CardState> = (0..5).map(|_| card(CardStatus::Learning)).collect();
        let review: Vec<CardState> = (0..20).map(|_| card(CardStatus::Review)).collect();

        let new_ids: Vec<Uuid> = new.iter().map(|c| c.card_id).collect();
        let learning_ids: Vec<Uuid> = learning.iter().map(|c| c.card_id).collect();
        let review_ids: Vec<Uuid> = review.iter().map(|c| c.card_id).collect();

        let mut due = Vec::new();
        due.extend(new.clone());
        due.extend(learning.clone());
        due.extend(review.clone());

        let mut rng = StdRng::seed_from_u64(11);
        let built = build_queue(due, Some(3), 0, &mut rng);

        assert_eq!(built.cards.len(), 5 + 3 + 20);
        assert_eq!(built.new_count, 3);
        assert_eq!(built.learning_count, 5);
        assert_eq!(built.review_count, 20);

        // Learning cards lead, in their original order.
        let head: Vec<Uuid> = built.cards[..5].iter().map(|c| c.card_id).collect();
        assert_eq!(head, learning_ids);

        // The tail holds exactly the capped new cards and every review
        // card, each bucket's internal order preserved.
        let tail = &built.cards[5..];
        assert_eq!(ids_with_status(tail, CardStatus::New), new_ids[..3].to_vec());
        assert_eq!(ids_with_status(tail, CardStatus::Review), review_ids);
    }

    #[test]
    fn test_cap_already_spent_excludes_new_cards() {
        let due = vec![
            card(CardStatus::New),
            card(CardStatus::New),
            card(CardStatus::Review),
        ];
        let mut rng = StdRng::seed_from_u64(11);
        let built = build_queue(due, Some(2), 2, &mut rng);

        assert_eq!(built.new_count, 0);
        assert_eq!(built.cards.len(), 1);
        assert_eq!(built.cards[0].state, CardStatus::Review);
    }

    #[test]
    fn test_no_cap_keeps_all_new_cards() {
        let due: Vec<CardState> = (0..7).map(|_| card(CardStatus::New)).collect();
        let mut rng = StdRng::seed_from_u64(11);
        let built = build_queue(due, None, 50, &mut rng);

        assert_eq!(built.new_count, 7);
        assert_eq!(built.cards.len(), 7);
    }

    #[test]
    fn test_relearning_cards_sort_with_learning() {
        let due = vec![
            card(CardStatus::Review),
            card(CardStatus::Relearning),
            card(CardStatus::Learning),
        ];
        let mut rng = StdRng::seed_from_u64(11);
        let built = build_queue(due, None, 0, &mut rng);

        assert_eq!(built.learning_count, 2);
        assert_eq!(built.cards[0].state, CardStatus::Relearning);
        assert_eq!(built.cards[1].state, CardStatus::Learning);
        assert_eq!(built.cards[2].state, CardStatus::Review);
    }

    #[test]
    fn test_same_seed_same_interleaving() {
        let build = |seed: u64| {
            let mut due = Vec::new();
            let mut maker = StdRng::seed_from_u64(99);
            for _ in 0..30 {
                let status = if maker.gen_bool(0.5) {
                    CardStatus::New
                } else {
                    CardStatus::Review
                };
                let mut state = CardState::new(Uuid::from_u128(maker.gen()));
                state.state = status;
                due.push(state);
            }
            let mut rng = StdRng::seed_from_u64(seed);
            build_queue(due, None, 0, &mut rng)
                .cards
                .iter()
                .map(|c| c.card_id)
                .collect::<Vec<_>>()
        };

        assert_eq!(build(4), build(4));
    }
}
