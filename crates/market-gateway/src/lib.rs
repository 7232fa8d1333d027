//! # market-gateway
//!
//! WebSocket client for the marketplace real-time channel.

pub mod client;
pub mod connection;
pub mod error;
pub mod events;
pub mod protocol;

pub use client::{GatewayClient, GatewayCommand, GatewayHandle};
pub use connection::{ConnectionInfo, ConnectionState};
pub use error::{GatewayError, GatewayResult};
pub use events::RealtimeEvent;
