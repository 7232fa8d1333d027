//! Real-time channel client
//!
//! `GatewayClient::spawn` starts a background task that owns the socket,
//! keeps it alive with heartbeats and reconnects with jittered exponential
//! backoff. The application steers it through a `GatewayHandle` and reads
//! decoded `RealtimeEvent`s from a channel.

mod handle;
mod runner;

pub use handle::{GatewayCommand, GatewayHandle};

use market_common::{RealtimeConfig, TokenStore};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::connection::ConnectionInfo;
use crate::events::RealtimeEvent;
use runner::GatewayRunner;

/// Default capacity of the event channel
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// A running gateway client
pub struct GatewayClient {
    pub handle: GatewayHandle,
    pub events: mpsc::Receiver<RealtimeEvent>,
    pub task: JoinHandle<()>,
}

impl GatewayClient {
    /// Spawn the connection task on the current runtime
    pub fn spawn(config: RealtimeConfig, tokens: TokenStore) -> Self {
        Self::spawn_with_capacity(config, tokens, DEFAULT_EVENT_CAPACITY)
    }

    pub fn spawn_with_capacity(
        config: RealtimeConfig,
        tokens: TokenStore,
        capacity: usize,
    ) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::channel(capacity.max(1));
        let info = Arc::new(ConnectionInfo::new());

        let runner = GatewayRunner::new(config, tokens, Arc::clone(&info), command_rx, event_tx);
        let task = tokio::spawn(runner.run());

        Self {
            handle: GatewayHandle::new(command_tx, info),
            events: event_rx,
            task,
        }
    }

    /// Split into the handle, the event stream and the task
    pub fn into_parts(self) -> (GatewayHandle, mpsc::Receiver<RealtimeEvent>, JoinHandle<()>) {
        (self.handle, self.events, self.task)
    }
}
