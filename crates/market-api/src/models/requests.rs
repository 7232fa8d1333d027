//! Request bodies
//!
//! Bodies with user-entered text implement `Validate` and are checked before
//! they are sent.

use market_core::{Id, ReactionSymbol};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Body of the post-like and comment-like toggles
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeRequest {
    pub user_id: Id,
}

/// Reaction pick
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactRequest {
    pub post_id: Id,
    pub user_id: Id,
    pub reaction: ReactionSymbol,
}

/// New comment
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub post_id: Id,
    pub user_id: Id,

    #[validate(length(min = 1, max = 1000, message = "Comment must be 1-1000 characters"))]
    pub content: String,
}
