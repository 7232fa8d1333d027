//! Backend ports - what the client core needs from the marketplace API
//!
//! The feed layer depends only on these traits; `market-api` provides the
//! HTTP implementation and tests provide in-memory fakes.

use async_trait::async_trait;

use crate::entities::{Comment, Notification, Post, ReactionSymbol};
use crate::error::DomainError;
use crate::value_objects::Id;

/// Result type for backend calls
pub type ApiResult<T> = Result<T, DomainError>;

// ============================================================================
// Social API
// ============================================================================

/// Page selector for feed queries (pages start at 1)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedQuery {
    pub page: u32,
    pub page_size: u32,
}

impl FeedQuery {
    /// First page with the given size
    pub fn first(page_size: u32) -> Self {
        Self { page: 1, page_size }
    }

    /// The page after this one
    #[must_use]
    pub fn next(self) -> Self {
        Self {
            page: self.page + 1,
            ..self
        }
    }
}

#[async_trait]
pub trait SocialApi: Send + Sync {
    /// Fetch one page of the feed, newest first
    async fn fetch_feed(&self, query: FeedQuery) -> ApiResult<Vec<Post>>;

    /// Toggle the user's like on a post
    async fn like_post(&self, post_id: Id, user_id: Id) -> ApiResult<()>;

    /// Send the user's reaction pick for a post (the server toggles)
    async fn react_to_post(
        &self,
        post_id: Id,
        user_id: Id,
        reaction: ReactionSymbol,
    ) -> ApiResult<()>;

    /// Create a comment and return the stored copy
    async fn create_comment(&self, post_id: Id, user_id: Id, content: &str) -> ApiResult<Comment>;

    /// Toggle the user's like on a comment
    async fn like_comment(&self, comment_id: Id, user_id: Id) -> ApiResult<()>;
}

// ============================================================================
// Notification API
// ============================================================================

#[async_trait]
pub trait NotificationApi: Send + Sync {
    /// List every notification addressed to the user, read or not
    async fn list_notifications(&self, user_id: Id) -> ApiResult<Vec<Notification>>;

    /// Acknowledge a single notification
    async fn mark_read(&self, notification_id: Id) -> ApiResult<()>;
}
