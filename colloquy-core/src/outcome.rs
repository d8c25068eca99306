//! Result values handed back by LISTEN, SPEAK and the session lifecycle.
//!
//! Nothing in here is an error. Rejected selections, empty draws, overflowing
//! hands and finished conversations are all ordinary values the presentation
//! layer inspects.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::card::{CardTemplate, LetterTerms};
use crate::deck::DiscardRoute;
use crate::rules::{EmotionalState, StateEffect};
use crate::types::{CardCategory, CardId, InstanceId, NpcId};

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Why a conversation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    /// The NPC reached a terminal state.
    Hostile,
    /// Deck and hand are both empty.
    Exhausted,
    /// The goal card was played.
    GoalResolved,
    /// The host signalled that the conversation's purpose was met elsewhere.
    ExternalResolution,
    /// The NPC ran out of patience.
    PatienceExhausted,
}

/// Whether a conversation can continue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConversationStatus {
    /// More turns may be taken.
    Active,
    /// The conversation is over.
    Ended(EndReason),
}

impl ConversationStatus {
    /// Whether the conversation is over.
    #[must_use]
    pub const fn is_ended(self) -> bool {
        matches!(self, Self::Ended(_))
    }
}

// ---------------------------------------------------------------------------
// LISTEN
// ---------------------------------------------------------------------------

/// What a LISTEN did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListenResult {
    /// Instances added to the hand, crisis cards first.
    pub drawn: Vec<InstanceId>,
    /// How many of the drawn instances were injected crisis cards.
    pub crisis_injected: usize,
    /// Instances removed from the hand before drawing (fleeting and opportunity).
    pub removed: Vec<InstanceId>,
    /// Goal instances that expired this turn.
    pub expired_goals: Vec<InstanceId>,
    /// Whether the discard pile was reshuffled to satisfy the draw.
    pub reshuffled: bool,
    /// State before the LISTEN.
    pub previous_state: EmotionalState,
    /// State after the LISTEN.
    pub state: EmotionalState,
    /// Whether the hand is above its limit.
    pub overflowing: bool,
    /// Conversation status after the LISTEN.
    pub status: ConversationStatus,
}

// ---------------------------------------------------------------------------
// SPEAK
// ---------------------------------------------------------------------------

/// Why a SPEAK selection was refused. The session is unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum Rejection {
    /// Nothing was selected.
    #[error("no cards selected")]
    EmptySelection,
    /// The same instance was selected twice.
    #[error("card {0} selected more than once")]
    DuplicateSelection(InstanceId),
    /// A selected instance is not in the hand.
    #[error("card {0} is not in the hand")]
    NotInHand(InstanceId),
    /// The current state forbids a selected category.
    #[error("{category:?} cards cannot be played while {state:?}")]
    CategoryNotAllowed {
        /// Offending instance.
        instance: InstanceId,
        /// Its category.
        category: CardCategory,
        /// Current state.
        state: EmotionalState,
    },
    /// More cards than the state allows in one SPEAK.
    #[error("{selected} cards selected, at most {max} allowed")]
    TooManyCards {
        /// Cards selected.
        selected: usize,
        /// State cap.
        max: u8,
    },
    /// A selected card's power level is not yet unlocked.
    #[error("card {instance} needs {required} tokens, player has {held}")]
    Locked {
        /// Offending instance.
        instance: InstanceId,
        /// Tokens required.
        required: u32,
        /// Tokens held.
        held: u32,
    },
    /// A letter's eligibility requirements are not met.
    #[error("letter {0} cannot be offered yet")]
    LetterIneligible(InstanceId),
    /// The player cannot pay an exchange's cost.
    #[error("exchange {0} is unaffordable")]
    Unaffordable(InstanceId),
    /// The selection is heavier than the state allows.
    #[error("selection weighs {total}, limit is {max}")]
    OverWeight {
        /// Effective weight of the selection.
        total: u32,
        /// State cap.
        max: u8,
    },
}

/// Terms a letter negotiation produced, reported to the obligation queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LetterNegotiation {
    /// Letter template.
    pub card: CardId,
    /// Whether the negotiation succeeded.
    pub success: bool,
    /// Resulting terms.
    pub terms: LetterTerms,
}

/// How one played instance resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardResolution {
    /// Played instance.
    pub instance: InstanceId,
    /// Its template.
    pub card: CardId,
    /// Its category.
    pub category: CardCategory,
    /// Success chance in percent.
    pub chance: u8,
    /// Roll, 1–100.
    pub roll: u8,
    /// Whether `roll <= chance`.
    pub success: bool,
    /// Comfort change caused by this card.
    pub comfort_delta: i32,
    /// Tokens granted through the ledger.
    pub tokens_granted: u32,
    /// State the card moved the NPC to.
    pub new_state: Option<EmotionalState>,
    /// Whether a burden or crisis was resolved.
    pub resolved: bool,
    /// Letter negotiation result.
    pub negotiation: Option<LetterNegotiation>,
    /// Where the instance went afterwards. `None` when it was destroyed.
    pub route: Option<DiscardRoute>,
}

/// Report of an accepted SPEAK.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeakReport {
    /// One entry per played instance, in selection order.
    pub resolutions: Vec<CardResolution>,
    /// Set bonus earned.
    pub set_bonus: i32,
    /// State the comfort ladder moved the NPC to. Comfort was reset to 0.
    pub comfort_shift: Option<EmotionalState>,
    /// Comfort after the SPEAK.
    pub comfort: i32,
    /// State before the SPEAK.
    pub previous_state: EmotionalState,
    /// State after the SPEAK.
    pub state: EmotionalState,
    /// Conversation status after the SPEAK.
    pub status: ConversationStatus,
}

/// Outcome of a SPEAK.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpeakResult {
    /// The selection was refused; nothing changed.
    Rejected(Rejection),
    /// The selection was played.
    Resolved(SpeakReport),
}

impl SpeakResult {
    /// The report, if the selection was played.
    #[must_use]
    pub const fn report(&self) -> Option<&SpeakReport> {
        match self {
            Self::Resolved(report) => Some(report),
            Self::Rejected(_) => None,
        }
    }

    /// The rejection, if the selection was refused.
    #[must_use]
    pub const fn rejection(&self) -> Option<&Rejection> {
        match self {
            Self::Rejected(rejection) => Some(rejection),
            Self::Resolved(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Presentation
// ---------------------------------------------------------------------------

/// One held card as shown to the player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandEntry {
    /// Instance id to pass back to SPEAK.
    pub instance: InstanceId,
    /// Template data.
    pub template: Arc<CardTemplate>,
}

/// Snapshot of a session for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnView {
    /// NPC on the other side.
    pub npc: NpcId,
    /// Current state.
    pub state: EmotionalState,
    /// Categorical effects of the current state.
    pub effects: Vec<StateEffect>,
    /// Held cards, in draw order.
    pub hand: Vec<HandEntry>,
    /// Whether the hand is above its limit.
    pub overflowing: bool,
    /// SPEAK weight limit.
    pub max_weight: u8,
    /// Current comfort.
    pub comfort: i32,
    /// Remaining patience.
    pub patience: u32,
    /// Whether more turns may be taken.
    pub status: ConversationStatus,
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Bonus tokens for achieving the conversation's goal.
const GOAL_BONUS_TOKENS: u32 = 2;

/// Summary of a finished conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationOutcome {
    /// NPC on the other side.
    pub npc: NpcId,
    /// State the conversation ended in.
    pub final_state: EmotionalState,
    /// Comfort the conversation ended with.
    pub final_comfort: i32,
    /// Tokens the relationship earns. Reported, not applied.
    pub tokens_earned: u32,
    /// Whether the goal card was played successfully.
    pub goal_achieved: bool,
    /// Why it ended; `None` when the host ended an active conversation.
    pub end_reason: Option<EndReason>,
    /// Turns taken (LISTEN and accepted SPEAK).
    pub turns: u32,
    /// Last letter negotiation, if any.
    pub negotiation: Option<LetterNegotiation>,
}

/// Tokens earned by ending a conversation in `state` with `comfort`.
///
/// Rapport pays: CONNECTED and EAGER earn at least one token, OPEN earns
/// half of comfort above one, anything else earns nothing. Achieving the goal
/// adds a flat bonus.
#[must_use]
pub fn token_reward(state: EmotionalState, comfort: i32, goal_achieved: bool) -> u32 {
    let base = match state {
        EmotionalState::Connected | EmotionalState::Eager => (comfort / 2).max(1),
        EmotionalState::Open => ((comfort - 1) / 2).max(0),
        _ => 0,
    };
    let base = u32::try_from(base).unwrap_or(0);
    if goal_achieved {
        base + GOAL_BONUS_TOKENS
    } else {
        base
    }
}
