//! The conversation engine: session lifecycle keyed by [`SessionHandle`].
//!
//! The engine is the root object a host holds. It owns the shared card
//! catalog, the validated rules table and the configuration, and injects all
//! three into each session it opens. Unknown handles and unknown card ids are
//! the only errors; everything a player can do wrong comes back as a value.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{info, info_span};

use crate::card::CardCatalog;
use crate::config::ColloquyConfig;
use crate::error::{ColloquyError, Result};
use crate::ledger::TokenLedger;
use crate::outcome::{ConversationOutcome, ListenResult, SpeakResult, TurnView};
use crate::rules::{EmotionalState, NpcDisposition, RulesTable, initial_state};
use crate::session::{ConversationSession, SessionSetup};
use crate::telemetry::{ConversationCounters, CounterSnapshot, spans};
use crate::types::{CardId, InstanceId, NpcId, SessionHandle};

/// Optional knobs for [`ConversationEngine::start_session`].
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    /// RNG seed. Random when absent.
    pub seed: Option<u64>,
    /// Opening state. Wins over `disposition`.
    pub initial_state: Option<EmotionalState>,
    /// NPC disposition used to pick the opening state.
    pub disposition: Option<NpcDisposition>,
    /// Patience. Falls back to `engine.default_patience`.
    pub patience: Option<u32>,
    /// Goal card shuffled into the deck.
    pub goal: Option<CardId>,
}

impl SessionOptions {
    /// Fix the RNG seed.
    #[must_use]
    pub fn seeded(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Fix the opening state.
    #[must_use]
    pub fn in_state(mut self, state: EmotionalState) -> Self {
        self.initial_state = Some(state);
        self
    }

    /// Derive the opening state from the NPC's disposition.
    #[must_use]
    pub fn with_disposition(mut self, disposition: NpcDisposition) -> Self {
        self.disposition = Some(disposition);
        self
    }

    /// Override patience.
    #[must_use]
    pub fn with_patience(mut self, patience: u32) -> Self {
        self.patience = Some(patience);
        self
    }

    /// Shuffle a goal card into the deck.
    #[must_use]
    pub fn with_goal(mut self, goal: impl Into<CardId>) -> Self {
        self.goal = Some(goal.into());
        self
    }
}

/// Owner of every live conversation.
#[derive(Debug)]
pub struct ConversationEngine {
    catalog: Arc<CardCatalog>,
    rules: Arc<RulesTable>,
    config: Arc<ColloquyConfig>,
    sessions: HashMap<SessionHandle, ConversationSession>,
    counters: ConversationCounters,
}

impl ConversationEngine {
    /// Engine using the standard rules table.
    ///
    /// # Errors
    ///
    /// Propagates configuration and rules-table validation errors.
    pub fn new(catalog: Arc<CardCatalog>, config: ColloquyConfig) -> Result<Self> {
        Self::with_rules(catalog, RulesTable::standard(), config)
    }

    /// Engine using a custom rules table.
    ///
    /// # Errors
    ///
    /// Returns [`ColloquyError::Config`] if the configuration or the table is
    /// inconsistent.
    pub fn with_rules(
        catalog: Arc<CardCatalog>,
        rules: RulesTable,
        config: ColloquyConfig,
    ) -> Result<Self> {
        config.validate()?;
        rules.validate()?;
        info!(cards = catalog.len(), "Conversation engine ready");
        Ok(Self {
            catalog,
            rules: Arc::new(rules),
            config: Arc::new(config),
            sessions: HashMap::new(),
            counters: ConversationCounters::new(),
        })
    }

    /// Shared card catalog.
    #[must_use]
    pub fn catalog(&self) -> &Arc<CardCatalog> {
        &self.catalog
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &ColloquyConfig {
        &self.config
    }

    /// Number of live sessions.
    #[must_use]
    pub fn active_sessions(&self) -> usize {
        self.sessions.len()
    }

    /// Counter snapshot.
    #[must_use]
    pub fn counters(&self) -> CounterSnapshot {
        self.counters.snapshot()
    }

    /// Open a conversation with `npc` over a deck built from `pool`.
    ///
    /// # Errors
    ///
    /// Returns [`ColloquyError::UnknownCard`] for the first id in `pool` or
    /// the goal that the catalog does not hold. No session is created.
    pub fn start_session(
        &mut self,
        npc: NpcId,
        pool: &[CardId],
        options: SessionOptions,
    ) -> Result<SessionHandle> {
        let cards = pool
            .iter()
            .map(|id| self.catalog.get(id).map(Arc::clone))
            .collect::<Result<Vec<_>>>()?;
        let goal = options
            .goal
            .as_ref()
            .map(|id| self.catalog.get(id).map(Arc::clone))
            .transpose()?;

        let state = options
            .initial_state
            .or_else(|| options.disposition.as_ref().map(initial_state))
            .unwrap_or(EmotionalState::Neutral);
        let setup = SessionSetup {
            npc,
            cards,
            goal,
            state,
            patience: options.patience.unwrap_or(self.config.engine.default_patience),
            seed: options.seed.unwrap_or_else(rand::random),
        };

        let session =
            ConversationSession::new(setup, Arc::clone(&self.rules), Arc::clone(&self.config));
        let handle = session.id();
        self.sessions.insert(handle, session);
        ConversationCounters::add(&self.counters.sessions_started, 1);
        Ok(handle)
    }

    /// Borrow a live session.
    ///
    /// # Errors
    ///
    /// Returns [`ColloquyError::UnknownSession`] for a stale handle.
    pub fn session(&self, handle: SessionHandle) -> Result<&ConversationSession> {
        self.sessions
            .get(&handle)
            .ok_or(ColloquyError::UnknownSession(handle))
    }

    fn session_mut(&mut self, handle: SessionHandle) -> Result<&mut ConversationSession> {
        self.sessions
            .get_mut(&handle)
            .ok_or(ColloquyError::UnknownSession(handle))
    }

    /// Take a LISTEN turn.
    ///
    /// # Errors
    ///
    /// Returns [`ColloquyError::UnknownSession`] for a stale handle.
    pub fn listen(&mut self, handle: SessionHandle) -> Result<ListenResult> {
        let result = self.session_mut(handle)?.listen();
        ConversationCounters::add(&self.counters.listens, 1);
        ConversationCounters::add(&self.counters.cards_drawn, result.drawn.len() as u64);
        Ok(result)
    }

    /// Take a SPEAK turn.
    ///
    /// # Errors
    ///
    /// Returns [`ColloquyError::UnknownSession`] for a stale handle. A refused
    /// selection is `Ok(SpeakResult::Rejected(_))`.
    pub fn speak(
        &mut self,
        handle: SessionHandle,
        selection: &[InstanceId],
        ledger: &mut dyn TokenLedger,
    ) -> Result<SpeakResult> {
        let result = self.session_mut(handle)?.speak(selection, ledger);
        let counter = match result {
            SpeakResult::Resolved(_) => &self.counters.speaks,
            SpeakResult::Rejected(_) => &self.counters.rejections,
        };
        ConversationCounters::add(counter, 1);
        Ok(result)
    }

    /// Whether one held card could be played right now.
    ///
    /// # Errors
    ///
    /// Returns [`ColloquyError::UnknownSession`] for a stale handle.
    pub fn is_playable(
        &self,
        handle: SessionHandle,
        instance: InstanceId,
        ledger: &dyn TokenLedger,
    ) -> Result<bool> {
        Ok(self.session(handle)?.is_playable(instance, ledger))
    }

    /// Presentation snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`ColloquyError::UnknownSession`] for a stale handle.
    pub fn view(&self, handle: SessionHandle) -> Result<TurnView> {
        Ok(self.session(handle)?.view())
    }

    /// Shuffle a goal card into a live session's deck.
    ///
    /// # Errors
    ///
    /// Returns [`ColloquyError::UnknownCard`] or [`ColloquyError::UnknownSession`].
    pub fn shuffle_in_goal(&mut self, handle: SessionHandle, goal: &CardId) -> Result<InstanceId> {
        let template = Arc::clone(self.catalog.get(goal)?);
        Ok(self.session_mut(handle)?.shuffle_in_goal(template))
    }

    /// Signal that the conversation's purpose was met elsewhere.
    ///
    /// # Errors
    ///
    /// Returns [`ColloquyError::UnknownSession`] for a stale handle.
    pub fn signal_resolution(&mut self, handle: SessionHandle) -> Result<()> {
        self.session_mut(handle)?.signal_resolution();
        Ok(())
    }

    /// Force a session's emotional state.
    ///
    /// # Errors
    ///
    /// Returns [`ColloquyError::UnknownSession`] for a stale handle.
    pub fn reset_state(&mut self, handle: SessionHandle, state: EmotionalState) -> Result<()> {
        self.session_mut(handle)?.reset_state(state);
        Ok(())
    }

    /// Clear every burden out of a session, as when the obligations behind
    /// them are settled elsewhere. Returns how many instances were removed.
    ///
    /// # Errors
    ///
    /// Returns [`ColloquyError::UnknownSession`] for a stale handle.
    pub fn remove_all_burdens(&mut self, handle: SessionHandle) -> Result<usize> {
        Ok(self.session_mut(handle)?.remove_all_burdens())
    }

    /// Close a session and report how it went.
    ///
    /// # Errors
    ///
    /// Returns [`ColloquyError::UnknownSession`] for a stale handle.
    pub fn end_session(&mut self, handle: SessionHandle) -> Result<ConversationOutcome> {
        let session = self
            .sessions
            .remove(&handle)
            .ok_or(ColloquyError::UnknownSession(handle))?;
        let _span = info_span!(spans::SESSION_END, session = %handle).entered();
        let outcome = session.outcome();
        ConversationCounters::add(&self.counters.sessions_ended, 1);
        info!(
            npc = %outcome.npc,
            state = ?outcome.final_state,
            comfort = outcome.final_comfort,
            tokens = outcome.tokens_earned,
            goal = outcome.goal_achieved,
            reason = ?outcome.end_reason,
            "Conversation ended"
        );
        Ok(outcome)
    }
}
