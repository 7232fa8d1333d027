//! Event pump
//!
//! Feeds decoded real-time events into the client context: READY triggers a
//! recount, chat messages go through the router, activity signals recount.

use market_common::AppResult;
use market_feed::{ClientContext, RealtimeRouter, Routed, UnreadService};
use market_gateway::RealtimeEvent;
use tokio::sync::mpsc;
use tracing::{debug, instrument, warn};

pub struct EventPump {
    ctx: ClientContext,
}

impl EventPump {
    pub fn new(ctx: ClientContext) -> Self {
        Self { ctx }
    }

    /// Consume events until the gateway stops
    pub async fn run(self, mut events: mpsc::Receiver<RealtimeEvent>) {
        while let Some(event) = events.recv().await {
            if let Err(e) = self.handle(event).await {
                warn!(error = %e, code = e.error_code(), "Realtime event not applied");
            }
        }
        debug!("Realtime event stream ended");
    }

    /// Apply one event; returns what routing did, if anything
    #[instrument(skip(self, event))]
    pub async fn handle(&self, event: RealtimeEvent) -> AppResult<Option<Routed>> {
        let routed = match event {
            RealtimeEvent::Ready { session_id } => {
                debug!(session_id = %session_id, "Channel ready, recounting unread");
                let snapshot = UnreadService::new(&self.ctx).recount().await?;
                Some(Routed::Recounted(snapshot))
            }
            RealtimeEvent::Message(message) => {
                Some(RealtimeRouter::new(&self.ctx).route_message(message).await?)
            }
            RealtimeEvent::Activity(activity) => {
                debug!(kind = %activity.kind, related_id = ?activity.related_id, "Activity signal");
                Some(RealtimeRouter::new(&self.ctx).route_activity().await?)
            }
            RealtimeEvent::Disconnected { retry_in } => {
                debug!(retry_in_ms = retry_in.as_millis() as u64, "Channel disconnected");
                None
            }
            RealtimeEvent::Terminated { reason } => {
                warn!(reason = %reason, "Channel closed for good");
                None
            }
        };
        Ok(routed)
    }
}
