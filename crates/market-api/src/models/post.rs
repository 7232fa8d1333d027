//! Post, comment and author wire models

use chrono::{DateTime, Utc};
use market_core::{Id, PostKind};
use serde::{Deserialize, Serialize};

/// Embedded user reference
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorModel {
    pub id: Id,
    #[serde(default)]
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// Reaction tally entry as sent by the server
///
/// The symbol stays a string here so that an emoji outside the supported set
/// does not fail the whole feed page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactionCountModel {
    pub reaction: String,
    pub count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentModel {
    pub id: Id,
    pub post_id: Id,
    pub author: AuthorModel,
    pub content: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub likes_count: u32,
    #[serde(default)]
    pub is_liked: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostModel {
    pub id: Id,
    pub author: AuthorModel,
    #[serde(default)]
    pub kind: PostKind,
    #[serde(default)]
    pub content: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub likes_count: u32,
    #[serde(default)]
    pub is_liked: bool,
    #[serde(default)]
    pub my_reaction: Option<String>,
    #[serde(default)]
    pub reactions: Vec<ReactionCountModel>,
    #[serde(default)]
    pub comments: Vec<CommentModel>,
}
