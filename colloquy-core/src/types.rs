//! Core type definitions for the Colloquy conversation engine.
//!
//! Identifiers and the small closed vocabularies (connection types,
//! persistence, power levels, mechanical categories) shared by every module.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Identity Types
// ---------------------------------------------------------------------------

/// Content-defined identifier of a card template.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CardId(pub String);

impl CardId {
    /// Create a card id from anything string-like.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw id.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CardId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for CardId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of the NPC on the other side of a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NpcId(pub String);

impl NpcId {
    /// Create an NPC id from anything string-like.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for NpcId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique identifier for one conversation session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Create a new random session ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle returned by the engine's session lifecycle API.
pub type SessionHandle = SessionId;

/// Unique identifier for a card instance.
///
/// The slot is handed out by the owning session's allocator and is never
/// reused within that session; the session id makes it unique process-wide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InstanceId {
    /// Session that spawned the instance.
    pub session: SessionId,
    /// Monotonic slot within the session.
    pub slot: u32,
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.session, self.slot)
    }
}

// ---------------------------------------------------------------------------
// Relationship Currencies
// ---------------------------------------------------------------------------

/// The four relationship currencies a card builds and tokens are tracked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ConnectionType {
    /// Personal, emotional bonds.
    Trust,
    /// Business and trade.
    Commerce,
    /// Social standing and formality.
    Status,
    /// Secrets, rumors and favors.
    Shadow,
}

impl ConnectionType {
    /// Every connection type, in declaration order.
    pub const ALL: [Self; 4] = [Self::Trust, Self::Commerce, Self::Status, Self::Shadow];
}

// ---------------------------------------------------------------------------
// Card Mechanics Vocabulary
// ---------------------------------------------------------------------------

/// How a card behaves when it sits in the hand or is discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Persistence {
    /// Stays in the live pool when drawn; returns through the discard pile.
    Persistent,
    /// Vanishes from the hand at the next LISTEN.
    Fleeting,
    /// One chance only: permanently removed once discarded or played.
    Opportunity,
    /// An unresolved obligation; never leaves the deck until resolved.
    Burden,
    /// Crisis injected by desperate states.
    Crisis,
}

/// Token-count gate controlling whether a card is playable at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum PowerLevel {
    /// Always playable.
    #[default]
    Basic,
    /// Requires 3 tokens of the card's connection type.
    Intermediate,
    /// Requires 5 tokens of the card's connection type.
    Advanced,
    /// Requires 10 tokens of the card's connection type.
    Master,
}

impl PowerLevel {
    /// Tokens of the card's connection type needed before it can be played.
    #[must_use]
    pub const fn required_tokens(self) -> u32 {
        match self {
            Self::Basic => 0,
            Self::Intermediate => 3,
            Self::Advanced => 5,
            Self::Master => 10,
        }
    }
}

/// Mechanical category of a card, derived from its template kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardCategory {
    /// Plain comfort building.
    Comfort,
    /// Grants relationship tokens on success.
    Token,
    /// Moves the NPC to another emotional state.
    State,
    /// Unresolved obligation.
    Burden,
    /// Something the player noticed in the world.
    Observation,
    /// Urgent plea raised by a desperate NPC.
    Crisis,
    /// Letter negotiation; the conversation's goal.
    Promise,
    /// Direct resource trade.
    Exchange,
}

// ---------------------------------------------------------------------------
// Exchange Resources
// ---------------------------------------------------------------------------

/// A resource that can change hands in an exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    /// Money.
    Coins,
    /// Player health.
    Health,
    /// Daily attention points.
    Attention,
    /// Hunger level.
    Hunger,
    /// Relationship tokens of one connection type.
    Tokens(ConnectionType),
}

/// A quantity of one resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceAmount {
    /// Which resource.
    pub kind: ResourceKind,
    /// How much of it.
    pub amount: u32,
}

impl ResourceAmount {
    /// Create a resource amount.
    #[must_use]
    pub const fn new(kind: ResourceKind, amount: u32) -> Self {
        Self { kind, amount }
    }
}
