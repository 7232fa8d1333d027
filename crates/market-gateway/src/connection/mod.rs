//! Connection bookkeeping
//!
//! Shared state of the single real-time connection and the reconnect delay
//! schedule.

mod backoff;
mod state;

pub use backoff::Backoff;
pub use state::{ConnectionInfo, ConnectionState};
