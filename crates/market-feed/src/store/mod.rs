//! In-memory client state
//!
//! Everything here is guarded by short `parking_lot` locks that are never
//! held across an `.await`.

mod conversation;
mod feed_store;
mod pending;

pub use conversation::ConversationState;
pub use feed_store::{FeedStore, LoadGuard};
pub use pending::{Delta, MutationId, PendingLedger, PendingMutation};
