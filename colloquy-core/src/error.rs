//! Error types for the Colloquy conversation engine.
//!
//! Only configuration and lookup failures are errors. Invalid player input is
//! reported through [`crate::outcome::Rejection`] and empty draws, hand
//! overflow or terminal states are plain result values.

use thiserror::Error;

use crate::rules::EmotionalState;
use crate::types::{CardId, SessionHandle};

/// Top-level error type for all Colloquy operations.
#[derive(Error, Debug)]
pub enum ColloquyError {
    /// The rules table has no entry for an emotional state.
    #[error("No ruleset defined for emotional state {0:?}")]
    MissingRuleset(EmotionalState),

    /// A card id was referenced that the catalog does not contain.
    #[error("Unknown card template: {0}")]
    UnknownCard(CardId),

    /// The content provider supplied two templates with the same id.
    #[error("Duplicate card template: {0}")]
    DuplicateCard(CardId),

    /// No live session matches the handle.
    #[error("Unknown conversation session: {0}")]
    UnknownSession(SessionHandle),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, ColloquyError>;
