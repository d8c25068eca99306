//! Card templates: the immutable, content-defined definition of every card.
//!
//! A template is a tagged union over the five kinds of card the game knows
//! about. The mechanical category the turn rules care about is derived
//! exhaustively from the variant, so adding a kind forces every rule that
//! dispatches on category to be revisited.

pub mod catalog;
pub mod instance;

pub use catalog::{CardCatalog, ContentProvider, JsonContentProvider};
pub use instance::{CardInstance, InstanceAllocator};

use serde::{Deserialize, Serialize};

use crate::rules::EmotionalState;
use crate::types::{CardCategory, CardId, ConnectionType, Persistence, PowerLevel, ResourceAmount};

// ---------------------------------------------------------------------------
// Shared Pieces
// ---------------------------------------------------------------------------

/// Categorical narrative hooks for the presentation layer. Never display text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NarrativeContext {
    /// Dialogue template tag the UI resolves to text.
    pub template: String,
    /// Free-form categorical tags.
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Mechanical properties of a card that is played inside a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mechanics {
    /// Emotional bandwidth cost, 0–4.
    pub weight: u8,
    /// Comfort gate before the card becomes drawable, 0–20. 0 = always.
    #[serde(default)]
    pub depth: u8,
    /// Behavior when left unplayed or discarded.
    pub persistence: Persistence,
    /// Token gate.
    #[serde(default)]
    pub power: PowerLevel,
    /// States in which the card may be drawn. Empty = every state.
    #[serde(default)]
    pub drawable_states: Vec<EmotionalState>,
}

impl Mechanics {
    /// Basic-power mechanics drawable in every state.
    #[must_use]
    pub const fn new(weight: u8, depth: u8, persistence: Persistence) -> Self {
        Self {
            weight,
            depth,
            persistence,
            power: PowerLevel::Basic,
            drawable_states: Vec::new(),
        }
    }

    /// Set the power level.
    #[must_use]
    pub fn with_power(mut self, power: PowerLevel) -> Self {
        self.power = power;
        self
    }

    /// Restrict drawing to the given states.
    #[must_use]
    pub fn drawable_in(mut self, states: impl IntoIterator<Item = EmotionalState>) -> Self {
        self.drawable_states = states.into_iter().collect();
        self
    }
}

// ---------------------------------------------------------------------------
// Card Kinds
// ---------------------------------------------------------------------------

/// What a conversation card does when played.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConversationEffect {
    /// Builds comfort.
    Comfort,
    /// Moves the NPC to another state.
    State {
        /// State on a successful roll.
        success: EmotionalState,
        /// State on a failed roll.
        failure: EmotionalState,
    },
    /// Something the player noticed; never fleeting-cleaned.
    Observation,
    /// Urgent plea; resolves the NPC's crisis.
    Crisis,
}

/// Ordinary dialogue card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationCard {
    /// Mechanical properties.
    pub mechanics: Mechanics,
    /// Effect on play.
    pub effect: ConversationEffect,
    /// Comfort gained on success.
    #[serde(default)]
    pub base_comfort: i32,
    /// Fixed success chance replacing the formula.
    #[serde(default)]
    pub override_success: Option<u8>,
}

/// Card that grants relationship tokens on success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenCard {
    /// Mechanical properties.
    pub mechanics: Mechanics,
    /// Comfort gained on success.
    #[serde(default)]
    pub base_comfort: i32,
    /// Tokens of the card's connection type granted on success.
    #[serde(default = "default_tokens_granted")]
    pub tokens_granted: u32,
    /// Fixed success chance replacing the formula.
    #[serde(default)]
    pub override_success: Option<u8>,
}

/// An unresolved obligation the player carries into the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BurdenCard {
    /// Mechanical properties.
    pub mechanics: Mechanics,
    /// Comfort lost when an attempt to resolve the burden fails.
    #[serde(default)]
    pub comfort_penalty: i32,
}

/// Direct resource trade. Always succeeds when affordable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeCard {
    /// What the player gives.
    #[serde(default)]
    pub cost: Vec<ResourceAmount>,
    /// What the player receives.
    #[serde(default)]
    pub reward: Vec<ResourceAmount>,
}

/// Who may be offered a letter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LetterEligibility {
    /// Tokens of the card's connection type the player must hold.
    #[serde(default)]
    pub required_tokens: u32,
    /// States the NPC must be in. Empty = any state.
    #[serde(default)]
    pub required_states: Vec<EmotionalState>,
}

/// Terms of a negotiated letter, reported to the obligation queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LetterTerms {
    /// Hours until the letter must be delivered.
    pub deadline_hours: u32,
    /// Queue slot the letter lands in.
    pub queue_position: u32,
    /// Coins paid on delivery.
    pub payment: u32,
    /// Whether the letter jumps to the front of the queue.
    #[serde(default)]
    pub forces_position_one: bool,
}

/// Letter negotiation card; the conversation's goal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LetterCard {
    /// Mechanical properties.
    pub mechanics: Mechanics,
    /// Who may be offered this letter.
    #[serde(default)]
    pub eligibility: LetterEligibility,
    /// Terms on a successful negotiation.
    pub success_terms: LetterTerms,
    /// Terms on a failed negotiation.
    pub failure_terms: LetterTerms,
    /// Fixed success chance replacing the formula.
    #[serde(default)]
    pub override_success: Option<u8>,
}

/// The five kinds of card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum CardKind {
    /// Ordinary dialogue.
    Conversation(ConversationCard),
    /// Relationship token grant.
    Token(TokenCard),
    /// Unresolved obligation.
    Burden(BurdenCard),
    /// Resource trade.
    Exchange(ExchangeCard),
    /// Letter negotiation.
    Letter(LetterCard),
}

// ---------------------------------------------------------------------------
// Card Template
// ---------------------------------------------------------------------------

/// Mechanics shared by every exchange card.
static EXCHANGE_MECHANICS: Mechanics = Mechanics::new(0, 0, Persistence::Persistent);

/// Immutable content-defined card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardTemplate {
    /// Unique id within the catalog.
    pub id: CardId,
    /// Relationship currency the card builds and is gated on.
    pub connection: ConnectionType,
    /// Presentation hooks.
    #[serde(default)]
    pub context: NarrativeContext,
    /// Kind-specific data.
    #[serde(flatten)]
    pub kind: CardKind,
}

impl CardTemplate {
    /// Create a template with an empty narrative context.
    #[must_use]
    pub fn new(id: impl Into<CardId>, connection: ConnectionType, kind: CardKind) -> Self {
        Self {
            id: id.into(),
            connection,
            context: NarrativeContext::default(),
            kind,
        }
    }

    /// Mechanical category derived from the kind.
    #[must_use]
    pub const fn category(&self) -> CardCategory {
        match &self.kind {
            CardKind::Conversation(card) => match card.effect {
                ConversationEffect::Comfort => CardCategory::Comfort,
                ConversationEffect::State { .. } => CardCategory::State,
                ConversationEffect::Observation => CardCategory::Observation,
                ConversationEffect::Crisis => CardCategory::Crisis,
            },
            CardKind::Token(_) => CardCategory::Token,
            CardKind::Burden(_) => CardCategory::Burden,
            CardKind::Exchange(_) => CardCategory::Exchange,
            CardKind::Letter(_) => CardCategory::Promise,
        }
    }

    /// Mechanical properties; exchange cards share fixed ones.
    #[must_use]
    pub fn mechanics(&self) -> &Mechanics {
        match &self.kind {
            CardKind::Conversation(card) => &card.mechanics,
            CardKind::Token(card) => &card.mechanics,
            CardKind::Burden(card) => &card.mechanics,
            CardKind::Letter(card) => &card.mechanics,
            CardKind::Exchange(_) => &EXCHANGE_MECHANICS,
        }
    }

    /// Weight cost.
    #[must_use]
    pub fn weight(&self) -> u8 {
        self.mechanics().weight
    }

    /// Depth gate.
    #[must_use]
    pub fn depth(&self) -> u8 {
        self.mechanics().depth
    }

    /// Persistence type.
    #[must_use]
    pub fn persistence(&self) -> Persistence {
        self.mechanics().persistence
    }

    /// Power level.
    #[must_use]
    pub fn power(&self) -> PowerLevel {
        self.mechanics().power
    }

    /// Fixed success chance, if the card carries one.
    #[must_use]
    pub const fn override_success(&self) -> Option<u8> {
        match &self.kind {
            CardKind::Conversation(card) => card.override_success,
            CardKind::Token(card) => card.override_success,
            CardKind::Letter(card) => card.override_success,
            CardKind::Burden(_) | CardKind::Exchange(_) => None,
        }
    }

    /// Comfort gained when the card succeeds.
    #[must_use]
    pub const fn base_comfort(&self) -> i32 {
        match &self.kind {
            CardKind::Conversation(card) => card.base_comfort,
            CardKind::Token(card) => card.base_comfort,
            CardKind::Burden(_) | CardKind::Exchange(_) | CardKind::Letter(_) => 0,
        }
    }

    /// Whether the card may be drawn while the NPC is in `state`.
    #[must_use]
    pub fn is_drawable_in(&self, state: EmotionalState) -> bool {
        let states = &self.mechanics().drawable_states;
        states.is_empty() || states.contains(&state)
    }

    /// Whether the card is a goal (letter) card.
    #[must_use]
    pub const fn is_goal(&self) -> bool {
        matches!(self.kind, CardKind::Letter(_))
    }
}

fn default_tokens_granted() -> u32 {
    1
}
