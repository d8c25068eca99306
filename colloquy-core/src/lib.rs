//! # Colloquy Core Library
//!
//! Game-agnostic conversation engine for card-driven NPC dialogue.
//!
//! A conversation is a turn-based mini-game between the player and one NPC.
//! The NPC's emotional state *is* the rule set: it decides how many cards a
//! LISTEN draws, how much weight a SPEAK may carry and where the conversation
//! drifts next.
//!
//! - **Cards**: immutable templates ([`CardTemplate`]) shared through a
//!   [`CardCatalog`], instantiated per session.
//! - **Rules**: one [`StateRuleset`] per [`EmotionalState`].
//! - **Deck & hand**: session-scoped draw pool, discard pile and hand.
//! - **Ledger**: relationship tokens gate and weight cards ([`TokenLedger`]).
//! - **Engine**: session lifecycle keyed by [`SessionHandle`].
//!
//! ## Determinism
//!
//! Every shuffle, draw and roll in a session goes through one `ChaCha8Rng`
//! seeded at session start. Same seed, same catalog, same actions: same game.

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod card;
pub mod chance;
pub mod config;
pub mod deck;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod outcome;
pub mod rules;
pub mod session;
pub mod telemetry;
pub mod types;

pub use card::{CardCatalog, CardInstance, CardKind, CardTemplate, ContentProvider};
pub use config::ColloquyConfig;
pub use engine::{ConversationEngine, SessionOptions};
pub use error::ColloquyError;
pub use ledger::{RelationshipLedger, TokenLedger};
pub use outcome::{
    ConversationOutcome, ConversationStatus, EndReason, ListenResult, Rejection, SpeakResult,
    TurnView,
};
pub use rules::{EmotionalState, RulesTable, StateRuleset};
pub use session::ConversationSession;
pub use types::*;
