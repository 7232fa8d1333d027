//! Connection state shared between the runner task and its handle

use market_core::Id;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Instant;

/// Connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionState {
    /// Socket opening, waiting for Hello
    Connecting,
    /// Identify sent, waiting for READY
    Identifying,
    /// READY received
    Ready,
    /// Between attempts or stopped
    Disconnected,
}

/// State of the real-time connection
///
/// The runner writes it; the handle and the application read it. The
/// desired subscription outlives individual sockets so it can be replayed
/// after every reconnect.
#[derive(Debug)]
pub struct ConnectionInfo {
    state: RwLock<ConnectionState>,
    session_id: RwLock<Option<String>>,
    subscription: RwLock<Option<Id>>,
    /// Last dispatch sequence seen on the current socket
    sequence: AtomicU64,
    heartbeat_acked: AtomicBool,
    last_heartbeat: RwLock<Option<Instant>>,
    /// Successful READYs since the client started
    sessions: AtomicU64,
}

impl ConnectionInfo {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(ConnectionState::Disconnected),
            session_id: RwLock::new(None),
            subscription: RwLock::new(None),
            sequence: AtomicU64::new(0),
            heartbeat_acked: AtomicBool::new(true),
            last_heartbeat: RwLock::new(None),
            sessions: AtomicU64::new(0),
        }
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    pub fn state(&self) -> ConnectionState {
        *self.state.read()
    }

    pub fn set_state(&self, state: ConnectionState) {
        *self.state.write() = state;
    }

    pub fn is_ready(&self) -> bool {
        self.state() == ConnectionState::Ready
    }

    /// Reset per-socket counters for a fresh connection attempt
    pub fn begin_attempt(&self) {
        self.set_state(ConnectionState::Connecting);
        self.sequence.store(0, Ordering::SeqCst);
        self.heartbeat_acked.store(true, Ordering::SeqCst);
        *self.last_heartbeat.write() = None;
    }

    pub fn mark_ready(&self, session_id: String) {
        *self.session_id.write() = Some(session_id);
        self.sessions.fetch_add(1, Ordering::SeqCst);
        self.set_state(ConnectionState::Ready);
    }

    pub fn mark_disconnected(&self) {
        *self.session_id.write() = None;
        self.set_state(ConnectionState::Disconnected);
    }

    pub fn session_id(&self) -> Option<String> {
        self.session_id.read().clone()
    }

    pub fn sessions(&self) -> u64 {
        self.sessions.load(Ordering::SeqCst)
    }

    // ========================================================================
    // Subscription
    // ========================================================================

    /// Desired conversation subscription
    pub fn subscription(&self) -> Option<Id> {
        *self.subscription.read()
    }

    /// Replace the desired subscription, returning the previous one
    pub fn set_subscription(&self, conversation_id: Option<Id>) -> Option<Id> {
        std::mem::replace(&mut *self.subscription.write(), conversation_id)
    }

    // ========================================================================
    // Sequence & heartbeat
    // ========================================================================

    /// Record a dispatch sequence; older numbers are ignored
    pub fn observe_sequence(&self, seq: u64) {
        self.sequence.fetch_max(seq, Ordering::SeqCst);
    }

    /// Last sequence seen, `None` before the first dispatch
    pub fn last_sequence(&self) -> Option<u64> {
        match self.sequence.load(Ordering::SeqCst) {
            0 => None,
            seq => Some(seq),
        }
    }

    /// Record an outgoing heartbeat; returns false if the previous one was never acked
    pub fn record_heartbeat(&self) -> bool {
        let acked = self.heartbeat_acked.swap(false, Ordering::SeqCst);
        *self.last_heartbeat.write() = Some(Instant::now());
        acked
    }

    pub fn ack_heartbeat(&self) {
        self.heartbeat_acked.store(true, Ordering::SeqCst);
    }

    pub fn is_heartbeat_acked(&self) -> bool {
        self.heartbeat_acked.load(Ordering::SeqCst)
    }

    pub fn since_last_heartbeat(&self) -> Option<std::time::Duration> {
        self.last_heartbeat.read().map(|at| at.elapsed())
    }
}

impl Default for ConnectionInfo {
    fn default() -> Self {
        Self::new()
    }
}
