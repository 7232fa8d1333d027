//! Store events - emitted when local feed or badge state changes
//!
//! These events are used for:
//! - Re-rendering the affected post or badge
//! - Non-blocking toasts when an optimistic change is rolled back
//! - Hard alerts when a comment could not be posted

use serde::{Deserialize, Serialize};

use crate::value_objects::Id;

/// Which optimistic interaction a mutation came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MutationKind {
    PostLike,
    Reaction,
    CommentLike,
}

impl MutationKind {
    /// Short label for logs and toasts
    pub const fn label(self) -> &'static str {
        match self {
            Self::PostLike => "like",
            Self::Reaction => "reaction",
            Self::CommentLike => "comment like",
        }
    }
}

/// All possible store events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StoreEvent {
    // =========================================================================
    // Feed Events
    // =========================================================================
    FeedReloaded { count: usize },
    FeedAppended { added: usize },
    FeedCleared,

    // =========================================================================
    // Post Events
    // =========================================================================
    PostUpdated { post_id: Id },
    CommentAdded { post_id: Id, comment_id: Id },

    // =========================================================================
    // Mutation Outcomes
    // =========================================================================
    MutationConfirmed { post_id: Id, kind: MutationKind },
    /// Non-blocking signal (toast): an optimistic change was rolled back
    MutationReverted {
        post_id: Id,
        kind: MutationKind,
        reason: String,
    },
    /// User-visible alert: a comment was not posted
    CommentFailed { post_id: Id, reason: String },

    // =========================================================================
    // Badge Events
    // =========================================================================
    UnreadChanged { messages: u32, activity: u32 },

    // =========================================================================
    // Conversation Events
    // =========================================================================
    /// A live message landed in the open thread
    MessageAppended { conversation_id: Id },
}

impl StoreEvent {
    /// Get the event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::FeedReloaded { .. } => "FEED_RELOADED",
            Self::FeedAppended { .. } => "FEED_APPENDED",
            Self::FeedCleared => "FEED_CLEARED",
            Self::PostUpdated { .. } => "POST_UPDATED",
            Self::CommentAdded { .. } => "COMMENT_ADDED",
            Self::MutationConfirmed { .. } => "MUTATION_CONFIRMED",
            Self::MutationReverted { .. } => "MUTATION_REVERTED",
            Self::CommentFailed { .. } => "COMMENT_FAILED",
            Self::UnreadChanged { .. } => "UNREAD_CHANGED",
            Self::MessageAppended { .. } => "MESSAGE_APPENDED",
        }
    }

    /// The post this event concerns, if any
    pub fn post_id(&self) -> Option<Id> {
        match self {
            Self::PostUpdated { post_id }
            | Self::CommentAdded { post_id, .. }
            | Self::MutationConfirmed { post_id, .. }
            | Self::MutationReverted { post_id, .. }
            | Self::CommentFailed { post_id, .. } => Some(*post_id),
            _ => None,
        }
    }

    /// Check if the UI should show something to the user
    pub fn needs_attention(&self) -> bool {
        matches!(
            self,
            Self::MutationReverted { .. } | Self::CommentFailed { .. }
        )
    }
}
