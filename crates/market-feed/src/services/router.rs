//! Realtime router
//!
//! Decides what an inbound real-time message does. With the message's
//! conversation open it lands in the thread; otherwise the unread badge is
//! recounted from the server.

use market_core::{ChatMessage, Id, StoreEvent};
use tracing::{debug, instrument};

use super::context::ClientContext;
use super::error::ServiceResult;
use super::unread::{UnreadService, UnreadSnapshot};

/// Where inbound messages currently go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouterMode {
    /// No conversation on screen; messages trigger a recount
    Background,
    /// A conversation is on screen; its messages append to the thread
    Foreground(Id),
}

/// What routing a message did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Routed {
    AppendedToThread,
    Recounted(UnreadSnapshot),
}

/// Realtime router
pub struct RealtimeRouter<'a> {
    ctx: &'a ClientContext,
}

impl<'a> RealtimeRouter<'a> {
    /// Create a new RealtimeRouter
    pub fn new(ctx: &'a ClientContext) -> Self {
        Self { ctx }
    }

    pub fn mode(&self) -> RouterMode {
        match self.ctx.conversation().active() {
            Some(id) => RouterMode::Foreground(id),
            None => RouterMode::Background,
        }
    }

    /// Bring a conversation to the foreground with its loaded history
    pub fn open_conversation(&self, conversation_id: Id, history: Vec<ChatMessage>) {
        self.ctx.conversation().open(conversation_id, history);
        debug!(conversation_id = %conversation_id, "Conversation opened");
    }

    /// Return to background mode
    pub fn close_conversation(&self) -> Option<Id> {
        let closed = self.ctx.conversation().close();
        if let Some(id) = closed {
            debug!(conversation_id = %id, "Conversation closed");
        }
        closed
    }

    /// Messages of the open thread in arrival order
    pub fn thread(&self) -> Vec<ChatMessage> {
        self.ctx.conversation().messages()
    }

    /// Route an inbound chat message
    #[instrument(skip(self, message), fields(conversation_id = %message.conversation_id))]
    pub async fn route_message(&self, message: ChatMessage) -> ServiceResult<Routed> {
        let conversation_id = message.conversation_id;
        match self.ctx.conversation().append_if_active(message) {
            Ok(()) => {
                self.ctx.emit(StoreEvent::MessageAppended { conversation_id });
                Ok(Routed::AppendedToThread)
            }
            Err(_) => {
                let snapshot = UnreadService::new(self.ctx).recount().await?;
                Ok(Routed::Recounted(snapshot))
            }
        }
    }

    /// Route a non-chat activity signal (always a recount)
    #[instrument(skip(self))]
    pub async fn route_activity(&self) -> ServiceResult<Routed> {
        let snapshot = UnreadService::new(self.ctx).recount().await?;
        Ok(Routed::Recounted(snapshot))
    }
}
