//! Gateway message format
//!
//! Every frame on the channel is a JSON text frame `{op, t?, s?, d?}`.

use super::{HelloPayload, IdentifyPayload, OpCode, SubscribePayload};
use market_core::Id;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Gateway message format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayMessage {
    /// Operation code
    pub op: OpCode,

    /// Event type (only for op=0 Dispatch)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t: Option<String>,

    /// Sequence number (only for op=0 Dispatch)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s: Option<u64>,

    /// Event data payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub d: Option<Value>,
}

impl GatewayMessage {
    fn control(op: OpCode, d: Option<Value>) -> Self {
        Self {
            op,
            t: None,
            s: None,
            d,
        }
    }

    // === Client Messages ===

    /// Heartbeat (op=1) carrying the last sequence seen
    #[must_use]
    pub fn heartbeat(last_sequence: Option<u64>) -> Self {
        Self::control(OpCode::Heartbeat, last_sequence.map(|s| Value::Number(s.into())))
    }

    /// Identify (op=2)
    #[must_use]
    pub fn identify(token: impl Into<String>) -> Self {
        let payload = IdentifyPayload::new(token);
        Self::control(OpCode::Identify, serde_json::to_value(payload).ok())
    }

    /// Subscribe (op=3) to one conversation
    #[must_use]
    pub fn subscribe(conversation_id: Id) -> Self {
        let payload = SubscribePayload { conversation_id };
        Self::control(OpCode::Subscribe, serde_json::to_value(payload).ok())
    }

    /// Unsubscribe (op=4) from a conversation
    #[must_use]
    pub fn unsubscribe(conversation_id: Id) -> Self {
        let payload = SubscribePayload { conversation_id };
        Self::control(OpCode::Unsubscribe, serde_json::to_value(payload).ok())
    }

    // === Server Messages ===

    /// Dispatch (op=0)
    #[must_use]
    pub fn dispatch(event_type: impl Into<String>, sequence: u64, data: Value) -> Self {
        Self {
            op: OpCode::Dispatch,
            t: Some(event_type.into()),
            s: Some(sequence),
            d: Some(data),
        }
    }

    /// Hello (op=10)
    #[must_use]
    pub fn hello(payload: HelloPayload) -> Self {
        Self::control(OpCode::Hello, serde_json::to_value(payload).ok())
    }

    /// Heartbeat ACK (op=11)
    #[must_use]
    pub fn heartbeat_ack() -> Self {
        Self::control(OpCode::HeartbeatAck, None)
    }

    /// Invalid Session (op=7)
    #[must_use]
    pub fn invalid_session() -> Self {
        Self::control(OpCode::InvalidSession, Some(Value::Bool(false)))
    }

    // === Parsing ===

    /// Decode `d` into a typed payload
    pub fn data<T: DeserializeOwned>(&self) -> Option<T> {
        self.d
            .as_ref()
            .and_then(|d| serde_json::from_value(d.clone()).ok())
    }

    /// Try to parse as a Hello payload (op=10)
    pub fn as_hello(&self) -> Option<HelloPayload> {
        if self.op != OpCode::Hello {
            return None;
        }
        self.data()
    }

    /// Try to parse as an Identify payload (op=2)
    pub fn as_identify(&self) -> Option<IdentifyPayload> {
        if self.op != OpCode::Identify {
            return None;
        }
        self.data()
    }

    /// Conversation id of a Subscribe or Unsubscribe (op=3/4)
    pub fn as_subscription(&self) -> Option<SubscribePayload> {
        if !matches!(self.op, OpCode::Subscribe | OpCode::Unsubscribe) {
            return None;
        }
        self.data()
    }

    /// Event type of a dispatch
    pub fn event_type(&self) -> Option<&str> {
        match self.op {
            OpCode::Dispatch => self.t.as_deref(),
            _ => None,
        }
    }

    // === Utilities ===

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl std::fmt::Display for GatewayMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(t) = &self.t {
            write!(f, "GatewayMessage(op={}, t={}", self.op, t)?;
            if let Some(s) = self.s {
                write!(f, ", s={s}")?;
            }
            write!(f, ")")
        } else {
            write!(f, "GatewayMessage(op={})", self.op)
        }
    }
}
