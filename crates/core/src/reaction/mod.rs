//! Post reactions.
//!
//! A user holds at most one reaction per post. Reacting toggles: the first
//! call adds a reaction, the next one removes it, whatever its type.

mod error;
mod service;
mod types;

pub use error::ReactionError;
pub use service::{ReactionRepository, ReactionService};
pub use types::{NewReaction, Reaction, ReactionType, ToggleOutcome};
