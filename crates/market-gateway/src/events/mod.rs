//! Gateway events
//!
//! Dispatch types the marketplace channel sends, their payloads, and the
//! decoded `RealtimeEvent` handed to the application.

mod event_types;
mod payloads;
mod realtime;

pub use event_types::GatewayEventType;
pub use payloads::{NotificationCreateEvent, ReadyEvent, ReceiveMessageEvent};
pub use realtime::RealtimeEvent;
