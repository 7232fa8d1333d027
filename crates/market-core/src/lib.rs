//! # market-core
//!
//! Domain layer containing feed entities, value objects, backend port traits, and store events.
//! This crate has zero dependencies on infrastructure (HTTP, WebSocket, runtime).

pub mod entities;
pub mod error;
pub mod events;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    ActivityKind, Author, ChatMessage, Comment, LikeToggle, Notification, Post, PostKind,
    ReactionCount, ReactionSymbol, ReactionTally, ReactionTransition, MAX_COMMENT_LENGTH,
};
pub use error::DomainError;
pub use events::{MutationKind, StoreEvent};
pub use traits::{ApiResult, FeedQuery, NotificationApi, SocialApi};
pub use value_objects::{Id, IdParseError};
