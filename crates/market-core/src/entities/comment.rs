//! Comment entity - a reply on a feed post

use chrono::{DateTime, Utc};

use super::{Author, LikeToggle};
use crate::value_objects::Id;

/// Maximum comment length accepted by the backend
pub const MAX_COMMENT_LENGTH: usize = 1000;

/// Comment entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: Id,
    pub post_id: Id,
    pub author: Author,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub likes_count: u32,
    pub is_liked: bool,
}

impl Comment {
    /// Create a new Comment with no likes
    pub fn new(id: Id, post_id: Id, author: Author, content: String) -> Self {
        Self {
            id,
            post_id,
            author,
            content,
            created_at: Utc::now(),
            likes_count: 0,
            is_liked: false,
        }
    }

    /// Flip the current user's like
    pub fn toggle_like(&mut self) -> LikeToggle {
        LikeToggle::apply(&mut self.is_liked, &mut self.likes_count)
    }

    /// Undo a like toggle whose server call failed
    pub fn revert_like(&mut self, toggle: LikeToggle) {
        toggle.revert(&mut self.is_liked, &mut self.likes_count);
    }
}
