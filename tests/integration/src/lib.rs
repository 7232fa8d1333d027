//! Integration test utilities for the marketplace client
//!
//! This crate provides an in-process mock of the marketplace backend (REST
//! routes and the real-time channel) plus helpers for driving a real
//! `MarketClient` against it.

pub mod fixtures;
pub mod helpers;
pub mod mock_backend;

pub use fixtures::*;
pub use helpers::*;
pub use mock_backend::MockBackend;
