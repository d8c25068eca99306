//! Emotional states and the rulesets they impose on a conversation.
//!
//! An NPC's emotional state *is* the rule set of the mini-game: it decides how
//! many cards a LISTEN draws, how much weight a SPEAK may carry, which card
//! categories are free or allowed, and where LISTEN moves the conversation
//! next. The table here is static data; [`ruleset`] is total over
//! [`EmotionalState`] by exhaustive match, and [`RulesTable`] lets a host
//! supply its own table while proving at construction that no state is missing.

use serde::{Deserialize, Serialize};

use crate::error::{ColloquyError, Result};
use crate::types::CardCategory;

// ---------------------------------------------------------------------------
// Emotional State
// ---------------------------------------------------------------------------

/// The NPC's current emotional state. Exactly one is current per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EmotionalState {
    /// Default balanced state.
    Neutral,
    /// Closed off, defensive.
    Guarded,
    /// Receptive, willing.
    Open,
    /// Peak rapport.
    Connected,
    /// Stressed, constrained.
    Tense,
    /// Engaged, wants interaction.
    Eager,
    /// Needs space.
    Overwhelmed,
    /// Crisis mode.
    Desperate,
    /// Cannot converse.
    Hostile,
}

impl EmotionalState {
    /// Every emotional state, in declaration order.
    pub const ALL: [Self; 9] = [
        Self::Neutral,
        Self::Guarded,
        Self::Open,
        Self::Connected,
        Self::Tense,
        Self::Eager,
        Self::Overwhelmed,
        Self::Desperate,
        Self::Hostile,
    ];

    /// Position of the state in [`Self::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Neutral => 0,
            Self::Guarded => 1,
            Self::Open => 2,
            Self::Connected => 3,
            Self::Tense => 4,
            Self::Eager => 5,
            Self::Overwhelmed => 6,
            Self::Desperate => 7,
            Self::Hostile => 8,
        }
    }
}

// ---------------------------------------------------------------------------
// State Ruleset
// ---------------------------------------------------------------------------

/// Complete mechanical parameters attached to one emotional state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateRuleset {
    /// Cards drawn by a LISTEN.
    pub cards_on_listen: u8,
    /// Total weight playable in one SPEAK.
    pub max_weight: u8,
    /// State entered after a LISTEN.
    pub listen_transition: EmotionalState,
    /// Whether a LISTEN pulls crisis cards into the hand before anything else.
    pub injects_crisis: bool,
    /// How many crisis cards an injecting LISTEN pulls.
    pub crisis_cards_injected: u8,
    /// Whether Opportunity cards survive a LISTEN.
    pub preserves_opportunities: bool,
    /// Cards that must be played together to earn [`Self::set_bonus`].
    pub required_cards: Option<u8>,
    /// Hard cap on cards played in one SPEAK.
    pub max_cards: Option<u8>,
    /// Whether the depth gate rises by one every turn spent in this state.
    pub auto_advance_depth: bool,
    /// Flat comfort bonus for meeting [`Self::required_cards`].
    pub set_bonus: i32,
    /// Categories that cost no weight in this state.
    pub free_categories: &'static [CardCategory],
    /// Categories playable in this state (`None` = all).
    pub allowed_categories: Option<&'static [CardCategory]>,
    /// Whether a LISTEN draws an available goal card first.
    pub checks_goal_deck: bool,
    /// Whether reaching this state ends the conversation.
    pub terminal: bool,
}

/// Categorical description of one ruleset effect, for the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StateEffect {
    /// LISTEN draws this many cards.
    Draws(u8),
    /// SPEAK weight limit.
    WeightLimit(u8),
    /// LISTEN moves the conversation to another state.
    ListenShiftsTo(EmotionalState),
    /// Crisis cards are pulled into the hand on LISTEN.
    InjectsCrisis(u8),
    /// A category costs no weight.
    FreeCategory(CardCategory),
    /// Only certain categories may be played.
    RestrictedCategories,
    /// Opportunity cards survive LISTEN.
    PreservesOpportunities,
    /// Playing this many cards together earns a comfort bonus.
    SetBonus {
        /// Cards required.
        cards: u8,
        /// Comfort granted.
        comfort: i32,
    },
    /// At most this many cards per SPEAK.
    MaxCards(u8),
    /// The depth gate rises every turn.
    AutoAdvancesDepth,
    /// The conversation cannot continue in this state.
    Terminal,
}

impl StateRuleset {
    /// Whether `category` costs no weight in this state.
    #[must_use]
    pub fn is_free(&self, category: CardCategory) -> bool {
        self.free_categories.contains(&category)
    }

    /// Whether `category` may be played in this state.
    #[must_use]
    pub fn allows(&self, category: CardCategory) -> bool {
        self.allowed_categories
            .is_none_or(|allowed| allowed.contains(&category))
    }

    /// Weight a card of `category` actually costs in this state.
    #[must_use]
    pub fn effective_weight(&self, category: CardCategory, weight: u8) -> u8 {
        if self.is_free(category) { 0 } else { weight }
    }

    /// Comfort bonus earned by playing `played` cards in one SPEAK.
    #[must_use]
    pub fn set_bonus_for(&self, played: usize) -> i32 {
        match self.required_cards {
            Some(required) if played >= usize::from(required) => self.set_bonus,
            _ => 0,
        }
    }

    /// Categorical summary of the ruleset's effects.
    #[must_use]
    pub fn summary(&self, state: EmotionalState) -> Vec<StateEffect> {
        let mut effects = vec![
            StateEffect::Draws(self.cards_on_listen),
            StateEffect::WeightLimit(self.max_weight),
        ];
        if self.listen_transition != state {
            effects.push(StateEffect::ListenShiftsTo(self.listen_transition));
        }
        if self.injects_crisis {
            effects.push(StateEffect::InjectsCrisis(self.crisis_cards_injected));
        }
        effects.extend(self.free_categories.iter().copied().map(StateEffect::FreeCategory));
        if self.allowed_categories.is_some() {
            effects.push(StateEffect::RestrictedCategories);
        }
        if self.preserves_opportunities {
            effects.push(StateEffect::PreservesOpportunities);
        }
        if let Some(cards) = self.required_cards {
            effects.push(StateEffect::SetBonus {
                cards,
                comfort: self.set_bonus,
            });
        }
        if let Some(max) = self.max_cards {
            effects.push(StateEffect::MaxCards(max));
        }
        if self.auto_advance_depth {
            effects.push(StateEffect::AutoAdvancesDepth);
        }
        if self.terminal {
            effects.push(StateEffect::Terminal);
        }
        effects
    }
}

// ---------------------------------------------------------------------------
// Standard Table
// ---------------------------------------------------------------------------

const BASE: StateRuleset = StateRuleset {
    cards_on_listen: 2,
    max_weight: 3,
    listen_transition: EmotionalState::Neutral,
    injects_crisis: false,
    crisis_cards_injected: 0,
    preserves_opportunities: false,
    required_cards: None,
    max_cards: None,
    auto_advance_depth: false,
    set_bonus: 0,
    free_categories: &[],
    allowed_categories: None,
    checks_goal_deck: false,
    terminal: false,
};

const NEUTRAL: StateRuleset = StateRuleset {
    checks_goal_deck: true,
    ..BASE
};

const GUARDED: StateRuleset = StateRuleset {
    cards_on_listen: 1,
    max_weight: 2,
    ..BASE
};

const OPEN: StateRuleset = StateRuleset {
    cards_on_listen: 3,
    listen_transition: EmotionalState::Open,
    preserves_opportunities: true,
    checks_goal_deck: true,
    ..BASE
};

const CONNECTED: StateRuleset = StateRuleset {
    cards_on_listen: 3,
    max_weight: 4,
    listen_transition: EmotionalState::Connected,
    preserves_opportunities: true,
    auto_advance_depth: true,
    checks_goal_deck: true,
    ..BASE
};

const TENSE: StateRuleset = StateRuleset {
    max_weight: 2,
    listen_transition: EmotionalState::Guarded,
    checks_goal_deck: true,
    ..BASE
};

const EAGER: StateRuleset = StateRuleset {
    cards_on_listen: 3,
    listen_transition: EmotionalState::Eager,
    required_cards: Some(2),
    set_bonus: 2,
    ..BASE
};

const OVERWHELMED: StateRuleset = StateRuleset {
    cards_on_listen: 1,
    max_weight: 1,
    max_cards: Some(1),
    ..BASE
};

// Stalling in a crisis escalates to HOSTILE.
const DESPERATE: StateRuleset = StateRuleset {
    max_weight: 1,
    listen_transition: EmotionalState::Hostile,
    injects_crisis: true,
    crisis_cards_injected: 1,
    max_cards: Some(1),
    free_categories: &[CardCategory::Crisis],
    checks_goal_deck: true,
    ..BASE
};

const HOSTILE: StateRuleset = StateRuleset {
    cards_on_listen: 0,
    max_weight: 0,
    listen_transition: EmotionalState::Hostile,
    free_categories: &[CardCategory::Crisis],
    allowed_categories: Some(&[CardCategory::Crisis, CardCategory::Burden]),
    terminal: true,
    ..BASE
};

/// Ruleset of the standard table for `state`.
#[must_use]
pub const fn ruleset(state: EmotionalState) -> &'static StateRuleset {
    match state {
        EmotionalState::Neutral => &NEUTRAL,
        EmotionalState::Guarded => &GUARDED,
        EmotionalState::Open => &OPEN,
        EmotionalState::Connected => &CONNECTED,
        EmotionalState::Tense => &TENSE,
        EmotionalState::Eager => &EAGER,
        EmotionalState::Overwhelmed => &OVERWHELMED,
        EmotionalState::Desperate => &DESPERATE,
        EmotionalState::Hostile => &HOSTILE,
    }
}

// ---------------------------------------------------------------------------
// Comfort Ladder
// ---------------------------------------------------------------------------

/// State one step along the comfort ladder from `state`.
///
/// Positive comfort climbs DESPERATE/HOSTILE → TENSE → GUARDED → NEUTRAL →
/// OPEN → EAGER → CONNECTED; negative comfort walks the same rungs back down
/// through HOSTILE to DESPERATE. The ends hold, and OVERWHELMED is not on the
/// ladder at all.
#[must_use]
pub const fn comfort_shift(state: EmotionalState, positive: bool) -> EmotionalState {
    use EmotionalState as S;
    if positive {
        match state {
            S::Desperate | S::Hostile => S::Tense,
            S::Tense => S::Guarded,
            S::Guarded => S::Neutral,
            S::Neutral => S::Open,
            S::Open => S::Eager,
            S::Eager | S::Connected => S::Connected,
            S::Overwhelmed => S::Overwhelmed,
        }
    } else {
        match state {
            S::Connected => S::Eager,
            S::Eager => S::Open,
            S::Open => S::Neutral,
            S::Neutral => S::Guarded,
            S::Guarded => S::Tense,
            S::Tense => S::Hostile,
            S::Hostile | S::Desperate => S::Desperate,
            S::Overwhelmed => S::Overwhelmed,
        }
    }
}

/// A complete state → ruleset table.
///
/// A table can only be built with an entry for every state, so lookups never
/// fail once construction has succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RulesTable {
    entries: [StateRuleset; 9],
}

impl Default for RulesTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl RulesTable {
    /// The built-in table.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            entries: EmotionalState::ALL.map(|state| *ruleset(state)),
        }
    }

    /// Build a table from explicit entries.
    ///
    /// Later entries for the same state replace earlier ones.
    ///
    /// # Errors
    ///
    /// Returns [`ColloquyError::MissingRuleset`] naming the first state
    /// without an entry.
    pub fn from_entries(
        entries: impl IntoIterator<Item = (EmotionalState, StateRuleset)>,
    ) -> Result<Self> {
        let mut slots: [Option<StateRuleset>; 9] = [None; 9];
        for (state, rules) in entries {
            slots[state.index()] = Some(rules);
        }
        let mut table = Self::standard().entries;
        for state in EmotionalState::ALL {
            table[state.index()] =
                slots[state.index()].ok_or(ColloquyError::MissingRuleset(state))?;
        }
        Ok(Self { entries: table })
    }

    /// Ruleset for `state`.
    #[must_use]
    pub fn get(&self, state: EmotionalState) -> &StateRuleset {
        &self.entries[state.index()]
    }

    /// Check that every ruleset is internally consistent.
    ///
    /// # Errors
    ///
    /// Returns [`ColloquyError::Config`] when a state injects more crisis cards
    /// than it draws, or demands more cards for its set bonus than it allows
    /// in one SPEAK.
    pub fn validate(&self) -> Result<()> {
        for state in EmotionalState::ALL {
            let rules = self.get(state);
            if rules.injects_crisis && rules.crisis_cards_injected > rules.cards_on_listen {
                return Err(ColloquyError::Config(format!(
                    "{state:?} injects {} crisis cards but only draws {}",
                    rules.crisis_cards_injected, rules.cards_on_listen
                )));
            }
            if let (Some(required), Some(max)) = (rules.required_cards, rules.max_cards) {
                if required > max {
                    return Err(ColloquyError::Config(format!(
                        "{state:?} requires {required} cards for its set bonus but caps SPEAK at {max}"
                    )));
                }
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Initial State
// ---------------------------------------------------------------------------

/// Broad personality archetype of an NPC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Personality {
    /// Loyal, warm.
    Devoted,
    /// Business first.
    Mercantile,
    /// Status conscious.
    Proud,
    /// Calculating.
    Cunning,
    /// Even-tempered.
    Steadfast,
}

/// A meeting the player owes the NPC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingPressure {
    /// Whether the NPC's safety is at stake.
    pub safety_stakes: bool,
    /// Minutes left before the meeting deadline.
    pub minutes_until_deadline: u32,
}

/// What the wider game knows about the NPC when a conversation opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NpcDisposition {
    /// Personality archetype.
    pub personality: Personality,
    /// Whether the player betrayed this NPC.
    pub betrayed: bool,
    /// Minutes left on the NPC's most urgent outgoing letter, if any.
    pub urgent_letter_minutes: Option<u32>,
    /// Pending meeting with the NPC, if any.
    pub meeting: Option<MeetingPressure>,
}

impl NpcDisposition {
    /// A calm NPC with no pressure on them.
    #[must_use]
    pub const fn calm(personality: Personality) -> Self {
        Self {
            personality,
            betrayed: false,
            urgent_letter_minutes: None,
            meeting: None,
        }
    }
}

const SIX_HOURS: u32 = 360;
const THREE_HOURS: u32 = 180;
const TWELVE_HOURS: u32 = 720;

/// Emotional state a conversation opens in.
///
/// Deadlines dominate: an urgent letter or meeting makes the NPC desperate or
/// tense regardless of personality. A betrayed NPC is hostile. Otherwise the
/// personality decides.
#[must_use]
pub fn initial_state(disposition: &NpcDisposition) -> EmotionalState {
    match disposition.urgent_letter_minutes {
        Some(minutes) if minutes < THREE_HOURS => return EmotionalState::Desperate,
        Some(minutes) if minutes < SIX_HOURS => return EmotionalState::Tense,
        _ => {}
    }

    if let Some(meeting) = disposition.meeting {
        let minutes = meeting.minutes_until_deadline;
        if (meeting.safety_stakes && minutes < SIX_HOURS) || minutes < THREE_HOURS {
            return EmotionalState::Desperate;
        }
        if minutes < TWELVE_HOURS {
            return EmotionalState::Tense;
        }
    }

    if disposition.betrayed {
        return EmotionalState::Hostile;
    }

    match disposition.personality {
        Personality::Devoted => EmotionalState::Open,
        Personality::Mercantile | Personality::Steadfast => EmotionalState::Neutral,
        Personality::Proud | Personality::Cunning => EmotionalState::Guarded,
    }
}
