//! The token ledger: the engine's window onto the relationship subsystem.
//!
//! Tokens are long-lived and outlive every conversation, so the engine never
//! owns them. Sessions read token counts to gate and weight cards, and write
//! through the ledger when a token card succeeds or an exchange is made.

use std::collections::HashMap;

use tracing::debug;

use crate::types::{ConnectionType, ResourceAmount, ResourceKind};

/// Relationship tokens and exchange resources as seen by a conversation.
pub trait TokenLedger {
    /// Tokens of `connection` the player holds with the NPC.
    fn token_count(&self, connection: ConnectionType) -> u32;

    /// Add tokens of `connection`.
    fn grant_tokens(&mut self, connection: ConnectionType, amount: u32);

    /// Current balance of an exchange resource.
    fn resource_balance(&self, kind: ResourceKind) -> u32;

    /// Pay `cost` and receive `reward`. Callers check affordability first.
    fn apply_exchange(&mut self, cost: &[ResourceAmount], reward: &[ResourceAmount]);

    /// Whether every amount in `cost` is covered.
    fn can_afford(&self, cost: &[ResourceAmount]) -> bool {
        let mut needed: HashMap<ResourceKind, u32> = HashMap::new();
        for item in cost {
            let total = needed.entry(item.kind).or_default();
            *total = total.saturating_add(item.amount);
        }
        needed
            .into_iter()
            .all(|(kind, amount)| self.resource_balance(kind) >= amount)
    }
}

/// In-memory ledger for one player/NPC relationship.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationshipLedger {
    tokens: HashMap<ConnectionType, u32>,
    resources: HashMap<ResourceKind, u32>,
}

impl RelationshipLedger {
    /// Empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a token count outright.
    #[must_use]
    pub fn with_tokens(mut self, connection: ConnectionType, count: u32) -> Self {
        self.tokens.insert(connection, count);
        self
    }

    /// Set a resource balance outright.
    #[must_use]
    pub fn with_resource(mut self, kind: ResourceKind, amount: u32) -> Self {
        self.resources.insert(kind, amount);
        self
    }
}

impl TokenLedger for RelationshipLedger {
    fn token_count(&self, connection: ConnectionType) -> u32 {
        self.tokens.get(&connection).copied().unwrap_or(0)
    }

    fn grant_tokens(&mut self, connection: ConnectionType, amount: u32) {
        let count = self.tokens.entry(connection).or_default();
        *count = count.saturating_add(amount);
        debug!(?connection, amount, total = *count, "Granted tokens");
    }

    fn resource_balance(&self, kind: ResourceKind) -> u32 {
        match kind {
            ResourceKind::Tokens(connection) => self.token_count(connection),
            other => self.resources.get(&other).copied().unwrap_or(0),
        }
    }

    fn apply_exchange(&mut self, cost: &[ResourceAmount], reward: &[ResourceAmount]) {
        for item in cost {
            let balance = match item.kind {
                ResourceKind::Tokens(connection) => self.tokens.entry(connection).or_default(),
                other => self.resources.entry(other).or_default(),
            };
            *balance = balance.saturating_sub(item.amount);
        }
        for item in reward {
            match item.kind {
                ResourceKind::Tokens(connection) => self.grant_tokens(connection, item.amount),
                other => {
                    let balance = self.resources.entry(other).or_default();
                    *balance = balance.saturating_add(item.amount);
                }
            }
        }
        debug!(paid = cost.len(), received = reward.len(), "Applied exchange");
    }
}
