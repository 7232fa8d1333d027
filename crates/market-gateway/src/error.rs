//! Gateway client errors

use thiserror::Error;
use tokio_tungstenite::tungstenite;

use crate::events::GatewayEventType;
use crate::protocol::{CloseCode, OpCode};

pub type GatewayResult<T> = Result<T, GatewayError>;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),

    #[error("Invalid frame: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Malformed {event_type} payload: {source}")]
    Payload {
        event_type: GatewayEventType,
        #[source]
        source: serde_json::Error,
    },

    #[error("Expected {expected} but received {received}")]
    UnexpectedOp { expected: OpCode, received: OpCode },

    #[error("No session token available")]
    MissingToken,

    #[error("Session invalidated by the server")]
    InvalidSession,

    #[error("Heartbeat was not acknowledged")]
    HeartbeatTimeout,

    #[error("Connection closed{}", close_suffix(.0))]
    Closed(Option<u16>),
}

fn close_suffix(code: &Option<u16>) -> String {
    code.map(|c| format!(" with code {c}")).unwrap_or_default()
}

impl GatewayError {
    /// Whether the reconnect loop should try again
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Closed(Some(code)) => {
                CloseCode::from_u16(*code).map_or(true, CloseCode::should_reconnect)
            }
            Self::InvalidSession => false,
            _ => true,
        }
    }

    pub fn close_code(&self) -> Option<CloseCode> {
        match self {
            Self::Closed(Some(code)) => CloseCode::from_u16(*code),
            _ => None,
        }
    }
}
