//! Card instances: runtime occurrences of a template inside one session.

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use super::CardTemplate;
use crate::types::{InstanceId, SessionId};

/// A uniquely identified occurrence of a [`CardTemplate`] within one session.
///
/// Two instances of the same template are distinct; equality and hashing look
/// at the instance id only.
#[derive(Debug, Clone)]
pub struct CardInstance {
    id: InstanceId,
    template: Arc<CardTemplate>,
}

impl CardInstance {
    /// Instance id.
    #[must_use]
    pub const fn id(&self) -> InstanceId {
        self.id
    }

    /// Shared template.
    #[must_use]
    pub fn template(&self) -> &Arc<CardTemplate> {
        &self.template
    }
}

impl PartialEq for CardInstance {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for CardInstance {}

impl Hash for CardInstance {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Hands out instance ids for one session. Slots are never reused.
#[derive(Debug, Clone)]
pub struct InstanceAllocator {
    session: SessionId,
    next_slot: u32,
}

impl InstanceAllocator {
    /// Allocator for `session`, starting at slot 0.
    #[must_use]
    pub const fn new(session: SessionId) -> Self {
        Self {
            session,
            next_slot: 0,
        }
    }

    /// Create a fresh instance of `template`.
    pub fn spawn(&mut self, template: Arc<CardTemplate>) -> CardInstance {
        let id = InstanceId {
            session: self.session,
            slot: self.next_slot,
        };
        self.next_slot += 1;
        CardInstance { id, template }
    }
}
