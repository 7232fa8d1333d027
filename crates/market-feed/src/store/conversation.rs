//! Active conversation state
//!
//! Tracks which chat thread is on screen and the live messages appended to
//! it. With no thread open, inbound messages only move the unread badge.

use market_core::{ChatMessage, Id};
use parking_lot::RwLock;

#[derive(Debug)]
struct OpenThread {
    conversation_id: Id,
    messages: Vec<ChatMessage>,
}

/// Which conversation (if any) is in the foreground
#[derive(Debug, Default)]
pub struct ConversationState {
    open: RwLock<Option<OpenThread>>,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put a conversation in the foreground with its loaded history
    pub fn open(&self, conversation_id: Id, history: Vec<ChatMessage>) {
        *self.open.write() = Some(OpenThread {
            conversation_id,
            messages: history,
        });
    }

    /// Leave the foreground conversation
    ///
    /// Returns the id that was open.
    pub fn close(&self) -> Option<Id> {
        self.open.write().take().map(|t| t.conversation_id)
    }

    pub fn active(&self) -> Option<Id> {
        self.open.read().as_ref().map(|t| t.conversation_id)
    }

    pub fn is_active(&self, conversation_id: Id) -> bool {
        self.active() == Some(conversation_id)
    }

    /// Append to the open thread if it is the message's conversation
    ///
    /// Hands the message back when another or no thread is open.
    pub fn append_if_active(&self, message: ChatMessage) -> Result<(), ChatMessage> {
        let mut open = self.open.write();
        match open.as_mut() {
            Some(thread) if thread.conversation_id == message.conversation_id => {
                thread.messages.push(message);
                Ok(())
            }
            _ => Err(message),
        }
    }

    /// Copy of the open thread's messages in arrival order
    pub fn messages(&self) -> Vec<ChatMessage> {
        self.open
            .read()
            .as_ref()
            .map(|t| t.messages.clone())
            .unwrap_or_default()
    }
}
