//! Dispatch payload definitions

use chrono::{DateTime, Utc};
use market_core::{ActivityKind, ChatMessage, Id};
use serde::{Deserialize, Serialize};

/// READY payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadyEvent {
    pub session_id: String,
}

/// RECEIVE_MESSAGE payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiveMessageEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,
    pub sender_id: Id,
    pub conversation_id: Id,
    #[serde(default)]
    pub content: String,
    /// Missing timestamps fall back to arrival time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sent_at: Option<DateTime<Utc>>,
}

impl From<ReceiveMessageEvent> for ChatMessage {
    fn from(event: ReceiveMessageEvent) -> Self {
        let mut message = ChatMessage::new(
            event.sender_id,
            event.conversation_id,
            event.content,
            event.sent_at.unwrap_or_else(Utc::now),
        );
        message.id = event.id;
        message
    }
}

/// NOTIFICATION_CREATE payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationCreateEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,
    #[serde(default, rename = "type")]
    pub kind: ActivityKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_id: Option<Id>,
}
