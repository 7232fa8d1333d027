//! # market-client
//!
//! One signed-in client session: the REST adapters, the feed and unread
//! state, and the real-time channel wired together.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use market_client::MarketClient;
//! use market_common::ClientConfig;
//!
//! let config = ClientConfig::from_env()?;
//! let mut client = MarketClient::from_config(&config)?;
//! client.start_realtime();
//!
//! client.feed().refresh().await?;
//! let handle = client.social().toggle_like(post_id)?;
//! ```

pub mod app;
pub mod client;
pub mod pump;

pub use client::MarketClient;
pub use pump::EventPump;
