//! Deck and hand bookkeeping for one conversation.
//!
//! The [`SessionDeck`] owns the live draw pool and the discard pile; the
//! [`Hand`] owns what the player holds. Neither knows about emotional states
//! beyond the filters a [`DrawRequest`] carries.

pub mod hand;
pub mod session;

pub use hand::Hand;
pub use session::{DiscardRoute, DrawRequest, SessionDeck};
