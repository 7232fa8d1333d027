//! Chat message - as delivered by the real-time channel

use chrono::{DateTime, Utc};

use crate::value_objects::Id;

/// Chat message entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    /// Absent when the channel does not echo the stored id
    pub id: Option<Id>,
    pub sender_id: Id,
    pub conversation_id: Id,
    pub content: String,
    pub sent_at: DateTime<Utc>,
}

impl ChatMessage {
    /// Create a new ChatMessage
    pub fn new(sender_id: Id, conversation_id: Id, content: String, sent_at: DateTime<Utc>) -> Self {
        Self {
            id: None,
            sender_id,
            conversation_id,
            content,
            sent_at,
        }
    }

    /// Check if the message was sent by the given user
    #[inline]
    pub fn is_from(&self, user_id: Id) -> bool {
        self.sender_id == user_id
    }

    /// Get a truncated preview of the message (for notifications)
    pub fn preview(&self, max_len: usize) -> &str {
        if self.content.len() <= max_len {
            &self.content
        } else {
            let mut end = max_len;
            while !self.content.is_char_boundary(end) && end > 0 {
                end -= 1;
            }
            &self.content[..end]
        }
    }
}
