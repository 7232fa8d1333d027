//! Decoded real-time events

use market_core::ChatMessage;
use std::time::Duration;

use super::{GatewayEventType, NotificationCreateEvent, ReadyEvent, ReceiveMessageEvent};
use crate::error::{GatewayError, GatewayResult};
use crate::protocol::GatewayMessage;

/// What the gateway client hands to the application
#[derive(Debug, Clone)]
pub enum RealtimeEvent {
    /// Identify accepted; fires again after every reconnect
    Ready { session_id: String },
    /// Inbound chat message
    Message(ChatMessage),
    /// Non-chat activity signal
    Activity(NotificationCreateEvent),
    /// Connection lost; the client retries after `retry_in`
    Disconnected { retry_in: Duration },
    /// Connection lost for good (credentials refused)
    Terminated { reason: String },
}

impl RealtimeEvent {
    /// Decode a dispatch frame
    ///
    /// Unknown event types are skipped with `Ok(None)`. A known type whose
    /// payload does not decode is an error.
    pub fn from_dispatch(message: &GatewayMessage) -> GatewayResult<Option<Self>> {
        let Some(name) = message.event_type() else {
            return Ok(None);
        };
        let Some(event_type) = GatewayEventType::from_str(name) else {
            return Ok(None);
        };

        let data = message.d.clone().unwrap_or_default();
        let decode_err = |source| GatewayError::Payload { event_type, source };

        let event = match event_type {
            GatewayEventType::Ready => {
                let ready: ReadyEvent = serde_json::from_value(data).map_err(decode_err)?;
                Self::Ready {
                    session_id: ready.session_id,
                }
            }
            GatewayEventType::ReceiveMessage => {
                let payload: ReceiveMessageEvent =
                    serde_json::from_value(data).map_err(decode_err)?;
                Self::Message(payload.into())
            }
            GatewayEventType::NotificationCreate => {
                // an empty body is still a valid "something happened" signal
                let payload = if data.is_null() {
                    NotificationCreateEvent::default()
                } else {
                    serde_json::from_value(data).map_err(decode_err)?
                };
                Self::Activity(payload)
            }
        };
        Ok(Some(event))
    }
}
