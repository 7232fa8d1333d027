//! Headless session runner
//!
//! Restores the session, loads the first feed page, connects the real-time
//! channel and logs unread badge changes until interrupted.

use market_common::{AppResult, ClientConfig};
use market_core::StoreEvent;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use crate::MarketClient;

pub async fn run(config: ClientConfig) -> AppResult<()> {
    let mut client = MarketClient::from_config(&config)?;
    client.start_realtime();

    match client.feed().refresh().await {
        Ok(outcome) => info!(?outcome, posts = client.feed().posts().len(), "Feed loaded"),
        Err(e) => warn!(error = %e, "Feed load failed"),
    }
    if let Err(e) = client.unread().recount().await {
        warn!(error = %e, "Initial unread count failed");
    }

    let mut badge = client.badge();
    let mut events = client.events();
    loop {
        tokio::select! {
            changed = badge.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = *badge.borrow_and_update();
                info!(
                    messages = snapshot.messages,
                    activity = snapshot.activity,
                    total = snapshot.total(),
                    "Unread badge changed"
                );
            }
            event = events.recv() => match event {
                Ok(event) => log_store_event(&event),
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "Store events dropped"),
                Err(RecvError::Closed) => break,
            },
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
        }
    }

    client.shutdown().await;
    Ok(())
}

fn log_store_event(event: &StoreEvent) {
    if event.needs_attention() {
        warn!(event_type = event.event_type(), post_id = ?event.post_id(), "Action failed");
    } else {
        debug!(event_type = event.event_type(), "Store event");
    }
}
