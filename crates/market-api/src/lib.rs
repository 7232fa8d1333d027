//! # market-api
//!
//! REST layer implementing the backend port traits over HTTP via reqwest.
//!
//! ## Overview
//!
//! This crate provides HTTP implementations for the port traits defined in
//! `market-core`. It handles:
//!
//! - Bearer authentication from the shared token store
//! - Wire models with serde derives and request validation
//! - Wire model → entity mappers
//! - Endpoint implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use market_api::{ApiClient, HttpSocialApi};
//! use market_common::{ClientConfig, TokenStore};
//! use market_core::{FeedQuery, SocialApi};
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::from_env()?;
//!     let client = ApiClient::new(config.api, TokenStore::with_token("..."))?;
//!     let social = HttpSocialApi::new(client);
//!
//!     let posts = social.fetch_feed(FeedQuery::first(20)).await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod endpoints;
pub mod mappers;
pub mod models;

// Re-export commonly used types
pub use client::ApiClient;
pub use endpoints::{HttpNotificationApi, HttpSocialApi};
