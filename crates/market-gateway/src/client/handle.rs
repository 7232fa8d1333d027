//! Control handle for the gateway task

use market_core::Id;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

use crate::connection::{ConnectionInfo, ConnectionState};

/// Commands understood by the gateway task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayCommand {
    Subscribe(Id),
    Unsubscribe(Id),
    Shutdown,
}

/// Cloneable handle to the gateway task
///
/// The desired subscription is stored on the shared connection state, so a
/// subscribe issued while disconnected takes effect on the next READY.
#[derive(Debug, Clone)]
pub struct GatewayHandle {
    commands: mpsc::UnboundedSender<GatewayCommand>,
    info: Arc<ConnectionInfo>,
}

impl GatewayHandle {
    pub(crate) fn new(commands: mpsc::UnboundedSender<GatewayCommand>, info: Arc<ConnectionInfo>) -> Self {
        Self { commands, info }
    }

    /// Follow a conversation, leaving the previous one
    pub fn subscribe(&self, conversation_id: Id) {
        let previous = self.info.set_subscription(Some(conversation_id));
        if previous == Some(conversation_id) {
            return;
        }
        if let Some(previous) = previous {
            self.send(GatewayCommand::Unsubscribe(previous));
        }
        self.send(GatewayCommand::Subscribe(conversation_id));
    }

    /// Stop following the current conversation
    pub fn unsubscribe(&self) -> Option<Id> {
        let previous = self.info.set_subscription(None);
        if let Some(id) = previous {
            self.send(GatewayCommand::Unsubscribe(id));
        }
        previous
    }

    /// Close the socket and stop reconnecting
    pub fn shutdown(&self) {
        self.send(GatewayCommand::Shutdown);
    }

    pub fn subscription(&self) -> Option<Id> {
        self.info.subscription()
    }

    pub fn state(&self) -> ConnectionState {
        self.info.state()
    }

    pub fn info(&self) -> &ConnectionInfo {
        &self.info
    }

    /// Whether the task is still alive
    pub fn is_running(&self) -> bool {
        !self.commands.is_closed()
    }

    fn send(&self, command: GatewayCommand) {
        if self.commands.send(command).is_err() {
            debug!(?command, "Gateway task has stopped, command dropped");
        }
    }
}
