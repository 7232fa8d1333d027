//! Notification entity - an activity item addressed to the current user

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::value_objects::Id;

/// Classification of an activity item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum ActivityKind {
    BidPlaced,
    BidAccepted,
    ChatMessage,
    ConnectionRequest,
    ConnectionAccepted,
    Like,
    Comment,
    Reaction,
    #[default]
    #[serde(other)]
    Generic,
}

impl ActivityKind {
    /// Get the wire name of this kind
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BidPlaced => "bidPlaced",
            Self::BidAccepted => "bidAccepted",
            Self::ChatMessage => "chatMessage",
            Self::ConnectionRequest => "connectionRequest",
            Self::ConnectionAccepted => "connectionAccepted",
            Self::Like => "like",
            Self::Comment => "comment",
            Self::Reaction => "reaction",
            Self::Generic => "generic",
        }
    }

    /// Chat activity is badged separately from everything else
    #[inline]
    pub const fn is_chat(self) -> bool {
        matches!(self, Self::ChatMessage)
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Notification entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: Id,
    pub recipient_id: Id,
    pub kind: ActivityKind,
    /// Job, post, conversation or user the activity points at
    pub related_id: Option<Id>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Create a new unread Notification
    pub fn new(id: Id, recipient_id: Id, kind: ActivityKind) -> Self {
        Self {
            id,
            recipient_id,
            kind,
            related_id: None,
            is_read: false,
            created_at: Utc::now(),
        }
    }

    /// Attach the related entity
    #[must_use]
    pub fn with_related(mut self, related_id: Id) -> Self {
        self.related_id = Some(related_id);
        self
    }

    #[inline]
    pub fn is_unread(&self) -> bool {
        !self.is_read
    }

    /// Check if this notification points at the given entity
    #[inline]
    pub fn relates_to(&self, entity_id: Id) -> bool {
        self.related_id == Some(entity_id)
    }
}
