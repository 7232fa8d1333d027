//! Client services
//!
//! Each service borrows the shared `ClientContext` and drives one concern:
//! feed loading, optimistic social mutations, unread aggregation, and
//! routing of real-time messages.

pub mod context;
pub mod error;
pub mod feed;
pub mod router;
pub mod social;
pub mod unread;

// Re-export all services for convenience
pub use context::{ClientContext, ClientContextBuilder};
pub use error::{ServiceError, ServiceResult};
pub use feed::{FeedService, LoadOutcome};
pub use router::{RealtimeRouter, RouterMode, Routed};
pub use social::{MutationHandle, MutationOutcome, SocialService};
pub use unread::{Acknowledgement, UnreadCounter, UnreadService, UnreadSnapshot};
