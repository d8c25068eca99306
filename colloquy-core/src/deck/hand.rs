//! The player's hand.

use crate::card::CardInstance;
use crate::types::{CardCategory, InstanceId, Persistence};

/// Ordered set of instances held by the player.
///
/// The hand limit is a signal: a hand above the limit reports
/// [`Hand::is_overflowing`] and the presentation layer decides what to do.
#[derive(Debug, Clone)]
pub struct Hand {
    cards: Vec<CardInstance>,
    limit: usize,
}

impl Hand {
    /// Empty hand with the given overflow limit.
    #[must_use]
    pub const fn new(limit: usize) -> Self {
        Self {
            cards: Vec::new(),
            limit,
        }
    }

    /// Number of held instances.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Whether the hand is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Overflow limit.
    #[must_use]
    pub const fn limit(&self) -> usize {
        self.limit
    }

    /// Whether the hand holds more than the limit.
    #[must_use]
    pub fn is_overflowing(&self) -> bool {
        self.cards.len() > self.limit
    }

    /// Held instances, in draw order.
    pub fn iter(&self) -> impl Iterator<Item = &CardInstance> {
        self.cards.iter()
    }

    /// Ids of every held instance.
    #[must_use]
    pub fn ids(&self) -> Vec<InstanceId> {
        self.cards.iter().map(CardInstance::id).collect()
    }

    /// Whether `id` is held.
    #[must_use]
    pub fn contains(&self, id: InstanceId) -> bool {
        self.cards.iter().any(|c| c.id() == id)
    }

    /// Borrow a held instance.
    #[must_use]
    pub fn get(&self, id: InstanceId) -> Option<&CardInstance> {
        self.cards.iter().find(|c| c.id() == id)
    }

    /// Append drawn instances.
    pub fn extend(&mut self, cards: impl IntoIterator<Item = CardInstance>) {
        self.cards.extend(cards);
    }

    /// Remove and return one instance.
    pub fn remove(&mut self, id: InstanceId) -> Option<CardInstance> {
        let pos = self.cards.iter().position(|c| c.id() == id)?;
        Some(self.cards.remove(pos))
    }

    /// Remove every instance matching `pred`, preserving the order of the rest.
    pub fn remove_where(
        &mut self,
        mut pred: impl FnMut(&CardInstance) -> bool,
    ) -> Vec<CardInstance> {
        let (removed, kept) = std::mem::take(&mut self.cards)
            .into_iter()
            .partition(|c| pred(c));
        self.cards = kept;
        removed
    }

    /// Strip fleeting instances. Observations and goal cards are kept.
    pub fn remove_fleeting(&mut self) -> Vec<CardInstance> {
        self.remove_where(|c| {
            let t = c.template();
            t.persistence() == Persistence::Fleeting
                && t.category() != CardCategory::Observation
                && !t.is_goal()
        })
    }

    /// Strip opportunity instances.
    pub fn sweep_opportunities(&mut self) -> Vec<CardInstance> {
        self.remove_where(|c| c.template().persistence() == Persistence::Opportunity)
    }
}
