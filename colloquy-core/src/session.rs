//! One conversation: the LISTEN / SPEAK turn state machine.
//!
//! A [`ConversationSession`] owns everything scoped to a single conversation
//! with one NPC: the current emotional state, the session deck and hand,
//! comfort, patience, goal tracking and a seeded RNG. Every shuffle, draw and
//! roll goes through that RNG, so a session replays exactly from its seed.
//!
//! The ledger is not owned. SPEAK borrows it to read token counts, grant
//! tokens and settle exchanges.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, info_span, warn};

use crate::card::{CardInstance, CardKind, CardTemplate, ConversationEffect, InstanceAllocator};
use crate::chance::{chance_with_ledger, is_unlocked, letter_eligible};
use crate::config::ColloquyConfig;
use crate::deck::{DrawRequest, Hand, SessionDeck};
use crate::ledger::TokenLedger;
use crate::outcome::{
    CardResolution, ConversationOutcome, ConversationStatus, EndReason, HandEntry,
    LetterNegotiation, ListenResult, Rejection, SpeakReport, SpeakResult, TurnView, token_reward,
};
use crate::rules::{EmotionalState, RulesTable, StateRuleset, comfort_shift};
use crate::telemetry::spans;
use crate::types::{CardCategory, InstanceId, NpcId, ResourceAmount, SessionId};

/// Everything needed to open a session.
#[derive(Debug, Clone)]
pub struct SessionSetup {
    /// NPC on the other side.
    pub npc: NpcId,
    /// Templates whose instances form the opening deck.
    pub cards: Vec<Arc<CardTemplate>>,
    /// Goal card shuffled into the deck, if the conversation has one.
    pub goal: Option<Arc<CardTemplate>>,
    /// Opening emotional state.
    pub state: EmotionalState,
    /// Turns the NPC tolerates.
    pub patience: u32,
    /// Seed for shuffles, draws and rolls.
    pub seed: u64,
}

/// A single conversation with one NPC.
#[derive(Debug, Clone)]
pub struct ConversationSession {
    id: SessionId,
    npc: NpcId,
    rules: Arc<RulesTable>,
    config: Arc<ColloquyConfig>,
    allocator: InstanceAllocator,
    deck: SessionDeck,
    hand: Hand,
    state: EmotionalState,
    comfort: i32,
    depth_bonus: i32,
    patience: u32,
    turns: u32,
    goal_urgency: BTreeMap<InstanceId, u32>,
    goal_resolved: bool,
    goal_achieved: bool,
    externally_resolved: bool,
    negotiation: Option<LetterNegotiation>,
    rng: ChaCha8Rng,
}

impl ConversationSession {
    /// Open a session: instantiate and shuffle the deck, then shuffle in the goal.
    #[must_use]
    pub fn new(setup: SessionSetup, rules: Arc<RulesTable>, config: Arc<ColloquyConfig>) -> Self {
        let id = SessionId::new();
        let _span = info_span!(spans::SESSION_START, session = %id, npc = %setup.npc).entered();

        let mut allocator = InstanceAllocator::new(id);
        let mut rng = ChaCha8Rng::seed_from_u64(setup.seed);
        let instances = setup.cards.into_iter().map(|t| allocator.spawn(t)).collect();
        let mut deck = SessionDeck::new(instances);
        deck.shuffle(&mut rng);

        let hand = Hand::new(config.engine.hand_limit);
        let mut session = Self {
            id,
            npc: setup.npc,
            rules,
            config,
            allocator,
            deck,
            hand,
            state: setup.state,
            comfort: 0,
            depth_bonus: 0,
            patience: setup.patience,
            turns: 0,
            goal_urgency: BTreeMap::new(),
            goal_resolved: false,
            goal_achieved: false,
            externally_resolved: false,
            negotiation: None,
            rng,
        };
        if let Some(goal) = setup.goal {
            session.shuffle_in_goal(goal);
        }
        if session.deck.pool_len() == 0 {
            warn!("Conversation opened with an empty deck");
        }
        info!(
            state = ?session.state,
            cards = session.deck.pool_len(),
            patience = session.patience,
            "Conversation started"
        );
        session
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// Session id.
    #[must_use]
    pub const fn id(&self) -> SessionId {
        self.id
    }

    /// NPC on the other side.
    #[must_use]
    pub const fn npc(&self) -> &NpcId {
        &self.npc
    }

    /// Current emotional state.
    #[must_use]
    pub const fn state(&self) -> EmotionalState {
        self.state
    }

    /// Ruleset of the current state.
    #[must_use]
    pub fn ruleset(&self) -> &StateRuleset {
        self.rules.get(self.state)
    }

    /// Current comfort.
    #[must_use]
    pub const fn comfort(&self) -> i32 {
        self.comfort
    }

    /// Comfort plus the accumulated depth bonus.
    #[must_use]
    pub const fn depth_gate(&self) -> i32 {
        self.comfort + self.depth_bonus
    }

    /// Remaining patience.
    #[must_use]
    pub const fn patience(&self) -> u32 {
        self.patience
    }

    /// Turns taken.
    #[must_use]
    pub const fn turns(&self) -> u32 {
        self.turns
    }

    /// Held cards.
    #[must_use]
    pub const fn hand(&self) -> &Hand {
        &self.hand
    }

    /// Deck.
    #[must_use]
    pub const fn deck(&self) -> &SessionDeck {
        &self.deck
    }

    /// Turns left before a held goal card expires.
    #[must_use]
    pub fn goal_turns_remaining(&self, id: InstanceId) -> Option<u32> {
        self.goal_urgency.get(&id).copied()
    }

    /// Whether the conversation can continue, and if not, why.
    #[must_use]
    pub fn status(&self) -> ConversationStatus {
        let reason = if self.ruleset().terminal {
            Some(EndReason::Hostile)
        } else if self.goal_resolved {
            Some(EndReason::GoalResolved)
        } else if self.externally_resolved {
            Some(EndReason::ExternalResolution)
        } else if self.is_depleted() {
            Some(EndReason::Exhausted)
        } else if self.patience == 0 {
            Some(EndReason::PatienceExhausted)
        } else {
            None
        };
        reason.map_or(ConversationStatus::Active, ConversationStatus::Ended)
    }

    /// Empty hand and no LISTEN can ever refill it. With nothing held comfort
    /// is frozen, so only a state change or depth advance could widen the draw.
    fn is_depleted(&self) -> bool {
        if !self.hand.is_empty() {
            return false;
        }
        let reshuffle = self.config.engine.reshuffle_on_exhaustion;
        if self.deck.is_exhausted() || (self.deck.pool_len() == 0 && !reshuffle) {
            return true;
        }
        let rules = self.ruleset();
        if rules.listen_transition != self.state || rules.auto_advance_depth {
            return false;
        }
        let held = HashSet::new();
        let request = DrawRequest {
            count: usize::from(rules.cards_on_listen),
            state: self.state,
            depth_gate: self.depth_gate(),
            category: None,
            goal_priority: false,
            held: &held,
        };
        let mut drawable = self.deck.available(&request);
        if reshuffle {
            drawable += self.deck.available_in_discard(&request);
        }
        request.count == 0 || drawable == 0
    }

    // -----------------------------------------------------------------------
    // Host hooks
    // -----------------------------------------------------------------------

    /// Shuffle a fresh instance of `template` into the live pool.
    pub fn shuffle_in_goal(&mut self, template: Arc<CardTemplate>) -> InstanceId {
        let goal = self.allocator.spawn(template);
        let id = goal.id();
        self.deck.shuffle_in_goal(goal, &mut self.rng);
        debug!(goal = %id, "Goal shuffled into deck");
        id
    }

    /// Mark the conversation's purpose as met outside the card game.
    pub fn signal_resolution(&mut self) {
        self.externally_resolved = true;
        info!(session = %self.id, "Conversation resolved externally");
    }

    /// Force the emotional state. The only way out of a terminal state.
    pub fn reset_state(&mut self, state: EmotionalState) {
        self.transition(state, "reset");
    }

    /// Permanently remove every burden from the deck and hand. Returns how
    /// many distinct instances were removed.
    pub fn remove_all_burdens(&mut self) -> usize {
        let mut removed: HashSet<InstanceId> = self
            .hand
            .remove_where(|c| c.template().category() == CardCategory::Burden)
            .iter()
            .map(CardInstance::id)
            .collect();
        removed.extend(self.deck.remove_all_burdens());
        info!(removed = removed.len(), "Burdens cleared");
        removed.len()
    }

    fn transition(&mut self, next: EmotionalState, cause: &'static str) {
        if next != self.state {
            info!(from = ?self.state, to = ?next, cause, "Emotional state changed");
        }
        self.state = next;
    }

    // -----------------------------------------------------------------------
    // LISTEN
    // -----------------------------------------------------------------------

    /// Take a LISTEN turn. Always legal.
    pub fn listen(&mut self) -> ListenResult {
        let _span = info_span!(spans::LISTEN, session = %self.id).entered();
        let previous_state = self.state;
        let rules = *self.rules.get(previous_state);
        self.patience = self.patience.saturating_sub(1);
        self.turns += 1;

        let mut leaving = self.hand.remove_fleeting();
        if !rules.preserves_opportunities {
            leaving.extend(self.hand.sweep_opportunities());
        }
        let removed: Vec<InstanceId> = leaving.iter().map(CardInstance::id).collect();
        for card in leaving {
            self.deck.discard(card);
        }

        let mut reshuffled = false;
        let mut drawn = Vec::new();
        if rules.injects_crisis {
            let wanted = usize::from(rules.crisis_cards_injected.min(rules.cards_on_listen));
            drawn = self.draw_into_hand(wanted, Some(CardCategory::Crisis), false, &mut reshuffled);
        }
        let crisis_injected = drawn.len();
        let rest = usize::from(rules.cards_on_listen).saturating_sub(crisis_injected);
        drawn.extend(self.draw_into_hand(rest, None, rules.checks_goal_deck, &mut reshuffled));

        let urgency = self.config.engine.goal_urgency_turns;
        for card in drawn.iter().filter(|c| c.template().is_goal()) {
            info!(goal = %card.id(), turns = urgency, "Goal card drawn");
            self.goal_urgency.insert(card.id(), urgency);
        }
        let expired_goals = self.tick_goal_urgency();

        self.transition(rules.listen_transition, "listen");
        if rules.auto_advance_depth {
            self.depth_bonus += 1;
        }

        let status = self.status();
        debug!(
            drawn = drawn.len(),
            crisis_injected,
            removed = removed.len(),
            hand = self.hand.len(),
            ?status,
            "Listened"
        );
        ListenResult {
            drawn: drawn.iter().map(CardInstance::id).collect(),
            crisis_injected,
            removed,
            expired_goals,
            reshuffled,
            previous_state,
            state: self.state,
            overflowing: self.hand.is_overflowing(),
            status,
        }
    }

    /// Draw up to `count` instances into the hand, reshuffling the discard
    /// pile once if the live pool runs short.
    fn draw_into_hand(
        &mut self,
        count: usize,
        category: Option<CardCategory>,
        goal_priority: bool,
        reshuffled: &mut bool,
    ) -> Vec<CardInstance> {
        if count == 0 {
            return Vec::new();
        }
        let mut held: HashSet<InstanceId> = self.hand.ids().into_iter().collect();
        let mut drawn = {
            let request = DrawRequest {
                count,
                state: self.state,
                depth_gate: self.depth_gate(),
                category,
                goal_priority,
                held: &held,
            };
            self.deck.draw(&request, &mut self.rng)
        };

        if drawn.len() < count
            && self.config.engine.reshuffle_on_exhaustion
            && self.deck.discard_len() > 0
        {
            self.deck.reshuffle(&mut self.rng);
            *reshuffled = true;
            held.extend(drawn.iter().map(CardInstance::id));
            let goal_drawn = drawn.iter().any(|c| c.template().is_goal());
            let request = DrawRequest {
                count: count - drawn.len(),
                state: self.state,
                depth_gate: self.depth_gate(),
                category,
                goal_priority: goal_priority && !goal_drawn,
                held: &held,
            };
            drawn.extend(self.deck.draw(&request, &mut self.rng));
        }

        self.hand.extend(drawn.iter().cloned());
        drawn
    }

    /// Count down every held goal; expired goals leave the session.
    fn tick_goal_urgency(&mut self) -> Vec<InstanceId> {
        let mut expired = Vec::new();
        self.goal_urgency.retain(|id, turns| {
            *turns = turns.saturating_sub(1);
            if *turns == 0 {
                expired.push(*id);
                false
            } else {
                true
            }
        });
        for &id in &expired {
            self.hand.remove(id);
            self.deck.remove(id);
            info!(goal = %id, "Goal card expired");
        }
        expired
    }

    // -----------------------------------------------------------------------
    // SPEAK
    // -----------------------------------------------------------------------

    /// Check a selection against the current state and the ledger without
    /// changing anything.
    ///
    /// # Errors
    ///
    /// Returns the first [`Rejection`] the selection hits.
    pub fn validate(
        &self,
        selection: &[InstanceId],
        ledger: &dyn TokenLedger,
    ) -> Result<Vec<CardInstance>, Rejection> {
        if selection.is_empty() {
            return Err(Rejection::EmptySelection);
        }
        let mut seen = HashSet::with_capacity(selection.len());
        if let Some(&dup) = selection.iter().find(|id| !seen.insert(**id)) {
            return Err(Rejection::DuplicateSelection(dup));
        }
        let cards = selection
            .iter()
            .map(|&id| self.hand.get(id).ok_or(Rejection::NotInHand(id)))
            .collect::<Result<Vec<_>, _>>()?;

        let rules = self.ruleset();
        if let Some(card) = cards.iter().find(|c| !rules.allows(c.template().category())) {
            return Err(Rejection::CategoryNotAllowed {
                instance: card.id(),
                category: card.template().category(),
                state: self.state,
            });
        }
        if let Some(max) = rules.max_cards {
            if cards.len() > usize::from(max) {
                return Err(Rejection::TooManyCards {
                    selected: cards.len(),
                    max,
                });
            }
        }
        for card in &cards {
            let template = card.template();
            let held = ledger.token_count(template.connection);
            if !is_unlocked(template.power(), held) {
                return Err(Rejection::Locked {
                    instance: card.id(),
                    required: template.power().required_tokens(),
                    held,
                });
            }
        }
        if let Some(card) = cards.iter().find(|c| {
            let template = c.template();
            !letter_eligible(template, ledger.token_count(template.connection), self.state)
        }) {
            return Err(Rejection::LetterIneligible(card.id()));
        }

        let mut cost: Vec<ResourceAmount> = Vec::new();
        for card in &cards {
            if let CardKind::Exchange(exchange) = &card.template().kind {
                cost.extend_from_slice(&exchange.cost);
                if !ledger.can_afford(&cost) {
                    return Err(Rejection::Unaffordable(card.id()));
                }
            }
        }

        let total: u32 = cards
            .iter()
            .map(|c| {
                let t = c.template();
                u32::from(rules.effective_weight(t.category(), t.weight()))
            })
            .sum();
        if total > u32::from(rules.max_weight) {
            return Err(Rejection::OverWeight {
                total,
                max: rules.max_weight,
            });
        }

        Ok(cards.into_iter().cloned().collect())
    }

    /// Whether a single held card could be played right now.
    #[must_use]
    pub fn is_playable(&self, id: InstanceId, ledger: &dyn TokenLedger) -> bool {
        self.validate(&[id], ledger).is_ok()
    }

    /// Take a SPEAK turn with the selected instances.
    ///
    /// Validation is atomic: a rejected selection spends no patience and
    /// leaves hand, deck and ledger untouched.
    pub fn speak(&mut self, selection: &[InstanceId], ledger: &mut dyn TokenLedger) -> SpeakResult {
        let _span = info_span!(spans::SPEAK, session = %self.id, cards = selection.len()).entered();
        let played = match self.validate(selection, &*ledger) {
            Ok(cards) => cards,
            Err(rejection) => {
                debug!(%rejection, "SPEAK rejected");
                return SpeakResult::Rejected(rejection);
            }
        };

        let previous_state = self.state;
        let rules = *self.ruleset();
        self.patience = self.patience.saturating_sub(1);
        self.turns += 1;

        let mut resolutions = Vec::with_capacity(played.len());
        for card in played {
            resolutions.push(self.resolve(card, ledger));
        }

        let set_bonus = rules.set_bonus_for(resolutions.len());
        if set_bonus != 0 {
            debug!(set_bonus, "Set bonus earned");
        }
        self.comfort += set_bonus;
        let comfort_shift = self.climb_comfort_ladder();
        self.tick_goal_urgency();
        if rules.auto_advance_depth {
            self.depth_bonus += 1;
        }

        SpeakResult::Resolved(SpeakReport {
            resolutions,
            set_bonus,
            comfort_shift,
            comfort: self.comfort,
            previous_state,
            state: self.state,
            status: self.status(),
        })
    }

    /// Move one rung along the comfort ladder once comfort reaches the
    /// threshold either way, resetting comfort. Terminal states stay put.
    fn climb_comfort_ladder(&mut self) -> Option<EmotionalState> {
        let threshold = self.config.engine.comfort_threshold;
        if self.ruleset().terminal {
            return None;
        }
        let positive = if self.comfort >= threshold {
            true
        } else if self.comfort <= -threshold {
            false
        } else {
            return None;
        };
        let next = comfort_shift(self.state, positive);
        if next == self.state {
            return None;
        }
        debug!(comfort = self.comfort, threshold, "Comfort threshold reached");
        self.transition(next, "comfort");
        self.comfort = 0;
        Some(next)
    }

    /// Roll for one played instance and apply its effect.
    fn resolve(&mut self, card: CardInstance, ledger: &mut dyn TokenLedger) -> CardResolution {
        let template = Arc::clone(card.template());
        let id = card.id();
        let chance = chance_with_ledger(&template, &*ledger, &self.config.chance);
        let roll: u8 = self.rng.gen_range(1..=100);
        let success = roll <= chance;

        self.hand.remove(id);
        if template.category() != CardCategory::Burden {
            self.deck.remove(id);
        }
        self.goal_urgency.remove(&id);

        let mut resolution = CardResolution {
            instance: id,
            card: template.id.clone(),
            category: template.category(),
            chance,
            roll,
            success,
            comfort_delta: 0,
            tokens_granted: 0,
            new_state: None,
            resolved: false,
            negotiation: None,
            route: None,
        };
        let mut destroyed = false;

        match &template.kind {
            CardKind::Conversation(conversation) => match conversation.effect {
                ConversationEffect::Comfort | ConversationEffect::Observation => {
                    if success {
                        resolution.comfort_delta = conversation.base_comfort;
                    }
                }
                ConversationEffect::State {
                    success: on_success,
                    failure: on_failure,
                } => {
                    resolution.new_state = Some(if success { on_success } else { on_failure });
                }
                ConversationEffect::Crisis => {
                    if success {
                        resolution.comfort_delta = conversation.base_comfort;
                        resolution.resolved = true;
                        destroyed = true;
                    }
                }
            },
            CardKind::Token(token) => {
                if success {
                    resolution.comfort_delta = token.base_comfort;
                    resolution.tokens_granted = token.tokens_granted;
                    ledger.grant_tokens(template.connection, token.tokens_granted);
                }
            }
            CardKind::Burden(burden) => {
                if success {
                    self.deck.resolve_burden(id);
                    resolution.resolved = true;
                    destroyed = true;
                } else {
                    resolution.comfort_delta = -burden.comfort_penalty;
                }
            }
            CardKind::Exchange(exchange) => {
                ledger.apply_exchange(&exchange.cost, &exchange.reward);
            }
            CardKind::Letter(letter) => {
                let negotiation = LetterNegotiation {
                    card: template.id.clone(),
                    success,
                    terms: if success {
                        letter.success_terms
                    } else {
                        letter.failure_terms
                    },
                };
                info!(card = %template.id, success, "Letter negotiated");
                self.goal_resolved = true;
                self.goal_achieved |= success;
                self.negotiation = Some(negotiation.clone());
                resolution.negotiation = Some(negotiation);
                destroyed = true;
            }
        }

        self.comfort += resolution.comfort_delta;
        if let Some(next) = resolution.new_state {
            self.transition(next, "card");
        }
        if !destroyed {
            resolution.route = Some(self.deck.discard(card));
        }

        debug!(
            card = %resolution.card,
            chance,
            roll,
            success,
            comfort = self.comfort,
            "Resolved card"
        );
        resolution
    }

    // -----------------------------------------------------------------------
    // Presentation & Outcome
    // -----------------------------------------------------------------------

    /// Snapshot for the presentation layer.
    #[must_use]
    pub fn view(&self) -> TurnView {
        let rules = self.ruleset();
        TurnView {
            npc: self.npc.clone(),
            state: self.state,
            effects: rules.summary(self.state),
            hand: self
                .hand
                .iter()
                .map(|c| HandEntry {
                    instance: c.id(),
                    template: Arc::clone(c.template()),
                })
                .collect(),
            overflowing: self.hand.is_overflowing(),
            max_weight: rules.max_weight,
            comfort: self.comfort,
            patience: self.patience,
            status: self.status(),
        }
    }

    /// Summary of the conversation as it stands.
    #[must_use]
    pub fn outcome(&self) -> ConversationOutcome {
        let end_reason = match self.status() {
            ConversationStatus::Ended(reason) => Some(reason),
            ConversationStatus::Active => None,
        };
        ConversationOutcome {
            npc: self.npc.clone(),
            final_state: self.state,
            final_comfort: self.comfort,
            tokens_earned: token_reward(self.state, self.comfort, self.goal_achieved),
            goal_achieved: self.goal_achieved,
            end_reason,
            turns: self.turns,
            negotiation: self.negotiation.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{
        BurdenCard, ConversationCard, LetterCard, LetterEligibility, LetterTerms, Mechanics,
        TokenCard,
    };
    use crate::ledger::RelationshipLedger;
    use crate::types::{ConnectionType, Persistence};

    fn conversation(
        id: &str,
        weight: u8,
        persistence: Persistence,
        effect: ConversationEffect,
    ) -> Arc<CardTemplate> {
        Arc::new(CardTemplate::new(
            id,
            ConnectionType::Trust,
            CardKind::Conversation(ConversationCard {
                mechanics: Mechanics::new(weight, 0, persistence),
                effect,
                base_comfort: 2,
                override_success: Some(100),
            }),
        ))
    }

    fn session(cards: Vec<Arc<CardTemplate>>, state: EmotionalState) -> ConversationSession {
        ConversationSession::new(
            SessionSetup {
                npc: NpcId::new("elena"),
                cards,
                goal: None,
                state,
                patience: 10,
                seed: 42,
            },
            Arc::new(RulesTable::standard()),
            Arc::new(ColloquyConfig::default()),
        )
    }

    #[test]
    fn listen_spends_patience_and_draws() {
        let comfort = conversation("c", 1, Persistence::Persistent, ConversationEffect::Comfort);
        let mut s = session(vec![Arc::clone(&comfort); 5], EmotionalState::Neutral);
        let result = s.listen();
        assert_eq!(result.drawn.len(), 2);
        assert_eq!(s.patience(), 9);
        assert_eq!(s.turns(), 1);
        assert_eq!(s.deck().pool_len(), 5);
    }

    #[test]
    fn fleeting_cards_vanish_on_next_listen() {
        let fleeting = conversation("f", 1, Persistence::Fleeting, ConversationEffect::Comfort);
        let mut s = session(vec![Arc::clone(&fleeting); 6], EmotionalState::Neutral);
        let first = s.listen();
        let second = s.listen();
        assert_eq!(second.removed, first.drawn);
        assert_eq!(s.hand().len(), 2);
        assert_eq!(s.deck().discard_len(), 2);
    }

    #[test]
    fn state_card_moves_npc_on_success() {
        let calm = conversation(
            "calm",
            1,
            Persistence::Persistent,
            ConversationEffect::State {
                success: EmotionalState::Open,
                failure: EmotionalState::Guarded,
            },
        );
        let mut s = session(vec![calm], EmotionalState::Neutral);
        let drawn = s.listen().drawn;
        let mut ledger = RelationshipLedger::new();
        let report = s.speak(&drawn, &mut ledger);
        let report = report.report().expect("report");
        assert!(report.resolutions[0].success);
        assert_eq!(report.state, EmotionalState::Open);
        assert_eq!(s.deck().discard_len(), 1);
    }

    #[test]
    fn token_card_grants_through_the_ledger() {
        let gift = Arc::new(CardTemplate::new(
            "gift",
            ConnectionType::Commerce,
            CardKind::Token(TokenCard {
                mechanics: Mechanics::new(1, 0, Persistence::Persistent),
                base_comfort: 1,
                tokens_granted: 2,
                override_success: Some(100),
            }),
        ));
        let mut s = session(vec![gift], EmotionalState::Neutral);
        let drawn = s.listen().drawn;
        let mut ledger = RelationshipLedger::new();
        let report = s.speak(&drawn, &mut ledger);
        assert_eq!(report.report().expect("report").resolutions[0].tokens_granted, 2);
        assert_eq!(ledger.token_count(ConnectionType::Commerce), 2);
        assert_eq!(s.comfort(), 1);
    }

    #[test]
    fn failed_burden_costs_comfort_and_stays() {
        let debt = Arc::new(CardTemplate::new(
            "debt",
            ConnectionType::Trust,
            CardKind::Burden(BurdenCard {
                mechanics: Mechanics::new(1, 0, Persistence::Burden),
                comfort_penalty: 2,
            }),
        ));
        // Burdens carry no override; weight 1 with no tokens rolls against 60%.
        let mut s = session(vec![debt], EmotionalState::Neutral);
        let drawn = s.listen().drawn;
        let mut ledger = RelationshipLedger::new();
        let report = s.speak(&drawn, &mut ledger);
        let resolution = &report.report().expect("report").resolutions[0];
        if resolution.success {
            assert!(resolution.resolved);
            assert!(s.deck().burden_cards().is_empty());
        } else {
            assert_eq!(s.comfort(), -2);
            assert_eq!(s.deck().burden_cards().len(), 1);
        }
    }

    #[test]
    fn held_persistent_burden_is_removed_once() {
        let grudge = Arc::new(CardTemplate::new(
            "grudge",
            ConnectionType::Trust,
            CardKind::Burden(BurdenCard {
                mechanics: Mechanics::new(1, 0, Persistence::Persistent),
                comfort_penalty: 1,
            }),
        ));
        let mut s = session(vec![grudge], EmotionalState::Neutral);
        let drawn = s.listen().drawn;
        assert_eq!(drawn.len(), 1);
        assert!(s.deck().contains(drawn[0]));
        assert!(s.hand().contains(drawn[0]));

        assert_eq!(s.remove_all_burdens(), 1);
        assert!(s.hand().is_empty());
        assert!(s.deck().burden_cards().is_empty());
    }

    #[test]
    fn reaching_the_comfort_threshold_moves_one_rung() {
        let warm = Arc::new(CardTemplate::new(
            "warm",
            ConnectionType::Trust,
            CardKind::Conversation(ConversationCard {
                mechanics: Mechanics::new(1, 0, Persistence::Persistent),
                effect: ConversationEffect::Comfort,
                base_comfort: 3,
                override_success: Some(100),
            }),
        ));
        let mut s = session(vec![warm], EmotionalState::Neutral);
        let drawn = s.listen().drawn;
        let mut ledger = RelationshipLedger::new();
        let result = s.speak(&drawn, &mut ledger);
        let report = result.report().expect("report");
        assert_eq!(report.resolutions[0].comfort_delta, 3);
        assert_eq!(report.previous_state, EmotionalState::Neutral);
        assert_eq!(report.comfort_shift, Some(EmotionalState::Open));
        assert_eq!(report.state, EmotionalState::Open);
        assert_eq!(report.comfort, 0);
        assert_eq!(s.comfort(), 0);
    }

    #[test]
    fn comfort_below_threshold_keeps_the_state() {
        let comfort = conversation("c", 1, Persistence::Persistent, ConversationEffect::Comfort);
        let mut s = session(vec![comfort], EmotionalState::Neutral);
        let drawn = s.listen().drawn;
        let mut ledger = RelationshipLedger::new();
        let result = s.speak(&drawn, &mut ledger);
        let report = result.report().expect("report");
        assert_eq!(report.comfort_shift, None);
        assert_eq!(report.state, EmotionalState::Neutral);
        assert_eq!(s.comfort(), 2);
    }

    #[test]
    fn unreachable_pool_with_empty_hand_is_exhausted() {
        let deep = Arc::new(CardTemplate::new(
            "deep",
            ConnectionType::Trust,
            CardKind::Conversation(ConversationCard {
                mechanics: Mechanics::new(1, 10, Persistence::Persistent),
                effect: ConversationEffect::Comfort,
                base_comfort: 1,
                override_success: None,
            }),
        ));
        let neutral = session(vec![Arc::clone(&deep); 2], EmotionalState::Neutral);
        assert_eq!(neutral.status(), ConversationStatus::Ended(EndReason::Exhausted));

        // CONNECTED keeps deepening, so the same pool will open up eventually.
        let connected = session(vec![deep; 2], EmotionalState::Connected);
        assert_eq!(connected.status(), ConversationStatus::Active);
    }

    #[test]
    fn goal_expires_after_urgency_runs_out() {
        let letter = Arc::new(CardTemplate::new(
            "letter",
            ConnectionType::Trust,
            CardKind::Letter(LetterCard {
                mechanics: Mechanics::new(1, 0, Persistence::Persistent),
                eligibility: LetterEligibility::default(),
                success_terms: LetterTerms::default(),
                failure_terms: LetterTerms::default(),
                override_success: None,
            }),
        ));
        let filler = conversation("c", 1, Persistence::Persistent, ConversationEffect::Comfort);
        let mut s = ConversationSession::new(
            SessionSetup {
                npc: NpcId::new("elena"),
                cards: vec![filler; 4],
                goal: Some(letter),
                state: EmotionalState::Neutral,
                patience: 10,
                seed: 3,
            },
            Arc::new(RulesTable::standard()),
            Arc::new(ColloquyConfig::default()),
        );
        let drawn = s.listen();
        let goal = drawn
            .drawn
            .iter()
            .copied()
            .find(|id| s.hand().get(*id).is_some_and(|c| c.template().is_goal()))
            .expect("find");
        assert_eq!(s.goal_turns_remaining(goal), Some(2));
        s.listen();
        let last = s.listen();
        assert_eq!(last.expired_goals, vec![goal]);
        assert!(!s.hand().contains(goal));
        assert!(!s.deck().contains(goal));
    }

    #[test]
    fn reset_state_is_the_way_out_of_hostile() {
        let comfort = conversation("c", 1, Persistence::Persistent, ConversationEffect::Comfort);
        let mut s = session(vec![comfort; 3], EmotionalState::Hostile);
        assert_eq!(s.status(), ConversationStatus::Ended(EndReason::Hostile));
        s.reset_state(EmotionalState::Neutral);
        assert_eq!(s.status(), ConversationStatus::Active);
    }

    #[test]
    fn same_seed_same_session() {
        let cards: Vec<_> = (0..8)
            .map(|i| {
                let id = format!("c{i}");
                conversation(&id, 1, Persistence::Fleeting, ConversationEffect::Comfort)
            })
            .collect();
        let mut a = session(cards.clone(), EmotionalState::Open);
        let mut b = session(cards, EmotionalState::Open);
        let names = |s: &ConversationSession| {
            s.hand()
                .iter()
                .map(|c| c.template().id.clone())
                .collect::<Vec<_>>()
        };
        a.listen();
        b.listen();
        assert_eq!(names(&a), names(&b));
    }
}
