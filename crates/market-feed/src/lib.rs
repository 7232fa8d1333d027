//! # market-feed
//!
//! Application layer containing the feed state store, the pending-mutation
//! ledger, and the services that drive them.

pub mod services;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

pub use services::{
    Acknowledgement, ClientContext, ClientContextBuilder, FeedService, LoadOutcome,
    MutationHandle, MutationOutcome, RealtimeRouter, RouterMode, Routed, ServiceError,
    ServiceResult, SocialService, UnreadCounter, UnreadService, UnreadSnapshot,
};
pub use store::{ConversationState, Delta, FeedStore, MutationId, PendingLedger, PendingMutation};
