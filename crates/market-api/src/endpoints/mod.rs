//! Endpoint implementations
//!
//! HTTP implementations of the port traits defined in market-core. Each one
//! wraps a shared `ApiClient`.

mod notification;
mod social;

pub use notification::HttpNotificationApi;
pub use social::HttpSocialApi;
