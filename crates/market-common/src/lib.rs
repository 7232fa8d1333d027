//! # market-common
//!
//! Shared utilities including configuration, error handling, bearer-token storage, and telemetry.

pub mod auth;
pub mod config;
pub mod error;
pub mod telemetry;

// Re-export commonly used types at crate root
pub use auth::{Claims, Session, TokenStore};
pub use config::{
    ApiConfig, AppSettings, ClientConfig, ConfigError, Environment, FailurePolicy, FeedConfig,
    RealtimeConfig,
};
pub use error::{AppError, AppResult};
pub use telemetry::{
    init_tracing, init_tracing_with_config, try_init_tracing, try_init_tracing_with_config,
    TracingConfig, TracingError,
};
