//! Session-scoped deck: the live draw pool and the discard pile.

use std::collections::HashSet;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::card::CardInstance;
use crate::rules::EmotionalState;
use crate::types::{CardCategory, InstanceId, Persistence};

/// Parameters of one draw.
#[derive(Debug, Clone)]
pub struct DrawRequest<'a> {
    /// Cards wanted.
    pub count: usize,
    /// NPC state; cards not drawable in it are skipped.
    pub state: EmotionalState,
    /// Comfort plus depth bonus. Cards deeper than this stay hidden.
    pub depth_gate: i32,
    /// Only draw this category.
    pub category: Option<CardCategory>,
    /// Draw an available goal card before anything else.
    pub goal_priority: bool,
    /// Instances already in the hand.
    pub held: &'a HashSet<InstanceId>,
}

/// Where a discarded instance ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiscardRoute {
    /// Opportunity cards are gone for good.
    Removed,
    /// Burdens never leave the deck until resolved.
    ReturnedToPool,
    /// Everything else waits for a reshuffle.
    DiscardPile,
}

/// Live pool and discard pile of one conversation.
#[derive(Debug, Clone, Default)]
pub struct SessionDeck {
    pool: Vec<CardInstance>,
    discard: Vec<CardInstance>,
}

impl SessionDeck {
    /// Deck whose live pool holds `cards`.
    #[must_use]
    pub fn new(cards: Vec<CardInstance>) -> Self {
        Self {
            pool: cards,
            discard: Vec::new(),
        }
    }

    /// Instances in the live pool.
    #[must_use]
    pub fn pool_len(&self) -> usize {
        self.pool.len()
    }

    /// Instances in the discard pile.
    #[must_use]
    pub fn discard_len(&self) -> usize {
        self.discard.len()
    }

    /// Whether both the pool and the discard pile are empty.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.pool.is_empty() && self.discard.is_empty()
    }

    /// Whether the live pool holds `id`.
    #[must_use]
    pub fn contains(&self, id: InstanceId) -> bool {
        self.pool.iter().any(|c| c.id() == id)
    }

    /// Live pool contents.
    pub fn pool(&self) -> impl Iterator<Item = &CardInstance> {
        self.pool.iter()
    }

    /// Shuffle the live pool.
    pub fn shuffle(&mut self, rng: &mut impl Rng) {
        self.pool.shuffle(rng);
    }

    fn is_available(card: &CardInstance, request: &DrawRequest<'_>) -> bool {
        let template = card.template();
        let depth = template.depth();
        (depth == 0 || i32::from(depth) <= request.depth_gate)
            && template.is_drawable_in(request.state)
            && request.category.is_none_or(|c| template.category() == c)
            && !request.held.contains(&card.id())
    }

    /// Number of instances a request could currently draw.
    #[must_use]
    pub fn available(&self, request: &DrawRequest<'_>) -> usize {
        self.pool
            .iter()
            .filter(|c| Self::is_available(c, request))
            .count()
    }

    /// Number of discarded instances the request could draw after a reshuffle.
    #[must_use]
    pub fn available_in_discard(&self, request: &DrawRequest<'_>) -> usize {
        self.discard
            .iter()
            .filter(|c| Self::is_available(c, request))
            .count()
    }

    /// Draw up to `request.count` instances uniformly at random without
    /// replacement. Returns fewer when the pool runs short.
    ///
    /// Persistent instances stay in the pool; every other persistence leaves it.
    pub fn draw(&mut self, request: &DrawRequest<'_>, rng: &mut impl Rng) -> Vec<CardInstance> {
        let mut candidates: Vec<usize> = self
            .pool
            .iter()
            .enumerate()
            .filter(|(_, c)| Self::is_available(c, request))
            .map(|(i, _)| i)
            .collect();

        let mut picked = Vec::with_capacity(request.count.min(candidates.len()));
        if request.goal_priority && request.count > 0 {
            if let Some(pos) = candidates
                .iter()
                .position(|&i| self.pool[i].template().is_goal())
            {
                picked.push(candidates.swap_remove(pos));
            }
        }
        let remaining = request.count.saturating_sub(picked.len());
        picked.extend(candidates.choose_multiple(rng, remaining).copied());

        let drawn: Vec<CardInstance> = picked.iter().map(|&i| self.pool[i].clone()).collect();

        let mut leaving: Vec<usize> = picked
            .into_iter()
            .filter(|&i| self.pool[i].template().persistence() != Persistence::Persistent)
            .collect();
        leaving.sort_unstable_by(|a, b| b.cmp(a));
        for i in leaving {
            self.pool.remove(i);
        }

        debug!(
            requested = request.count,
            drawn = drawn.len(),
            pool = self.pool.len(),
            "Drew cards"
        );
        drawn
    }

    /// Remove an instance from the live pool.
    pub fn remove(&mut self, id: InstanceId) -> Option<CardInstance> {
        let pos = self.pool.iter().position(|c| c.id() == id)?;
        Some(self.pool.remove(pos))
    }

    /// Route a discarded instance by its persistence and category.
    pub fn discard(&mut self, card: CardInstance) -> DiscardRoute {
        let template = card.template();
        if template.persistence() == Persistence::Opportunity {
            DiscardRoute::Removed
        } else if template.category() == CardCategory::Burden {
            if !self.contains(card.id()) {
                self.pool.push(card);
            }
            DiscardRoute::ReturnedToPool
        } else {
            self.discard.push(card);
            DiscardRoute::DiscardPile
        }
    }

    /// Move the discard pile into the live pool and shuffle. Returns the number
    /// of instances moved.
    pub fn reshuffle(&mut self, rng: &mut impl Rng) -> usize {
        let moved = self.discard.len();
        self.pool.append(&mut self.discard);
        self.pool.shuffle(rng);
        debug!(moved, pool = self.pool.len(), "Reshuffled discard pile");
        moved
    }

    /// Insert a goal instance at a random position of the live pool.
    pub fn shuffle_in_goal(&mut self, goal: CardInstance, rng: &mut impl Rng) {
        let pos = rng.gen_range(0..=self.pool.len());
        self.pool.insert(pos, goal);
    }

    /// Burden instances still in the live pool.
    #[must_use]
    pub fn burden_cards(&self) -> Vec<&CardInstance> {
        self.pool
            .iter()
            .filter(|c| c.template().category() == CardCategory::Burden)
            .collect()
    }

    /// Permanently remove a resolved burden. Returns it if it was in the deck.
    pub fn resolve_burden(&mut self, id: InstanceId) -> Option<CardInstance> {
        let is_target =
            |c: &CardInstance| c.id() == id && c.template().category() == CardCategory::Burden;
        if let Some(pos) = self.pool.iter().position(is_target) {
            return Some(self.pool.remove(pos));
        }
        let pos = self.discard.iter().position(is_target)?;
        Some(self.discard.remove(pos))
    }

    /// Permanently remove every burden. Returns the ids removed.
    pub fn remove_all_burdens(&mut self) -> Vec<InstanceId> {
        let mut removed = Vec::new();
        for pile in [&mut self.pool, &mut self.discard] {
            pile.retain(|c| {
                let burden = c.template().category() == CardCategory::Burden;
                if burden {
                    removed.push(c.id());
                }
                !burden
            });
        }
        removed
    }

    /// Prepare the deck for another conversation with the same NPC: the
    /// discard pile returns to the pool, fleeting instances are dropped.
    pub fn reset_for_new_conversation(&mut self, rng: &mut impl Rng) {
        self.pool.append(&mut self.discard);
        self.pool
            .retain(|c| c.template().persistence() != Persistence::Fleeting);
        self.pool.shuffle(rng);
    }
}
