//! Client configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file if present).

use serde::Deserialize;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Main client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    pub app: AppSettings,
    pub api: ApiConfig,
    pub realtime: RealtimeConfig,
    pub feed: FeedConfig,
    /// Bearer token to start the session with
    pub token: Option<String>,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default = "default_env")]
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "production" => Ok(Self::Production),
            "staging" => Ok(Self::Staging),
            "development" => Ok(Self::Development),
            other => Err(ConfigError::InvalidValue("APP_ENV", other.to_string())),
        }
    }
}

/// REST backend configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Base URL without trailing slash, e.g. `https://api.example.com`
    pub base_url: String,
    #[serde(default = "default_api_timeout")]
    pub timeout_secs: u64,
}

impl ApiConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Join a path onto the base URL
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// Real-time channel configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RealtimeConfig {
    /// WebSocket URL, e.g. `wss://api.example.com/realtime`
    pub url: String,
    #[serde(default = "default_reconnect_base_ms")]
    pub reconnect_base_ms: u64,
    #[serde(default = "default_reconnect_max_ms")]
    pub reconnect_max_ms: u64,
}

/// What to do with an optimistic change when the server call fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Roll back the specific local delta and emit a toast event
    #[default]
    Revert,
    /// Leave the optimistic state in place and only log
    Keep,
}

impl FromStr for FailurePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "revert" => Ok(Self::Revert),
            "keep" => Ok(Self::Keep),
            other => Err(ConfigError::InvalidValue(
                "MARKET_FAILURE_POLICY",
                other.to_string(),
            )),
        }
    }
}

/// Feed screen configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default)]
    pub failure_policy: FailurePolicy,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            failure_policy: FailurePolicy::default(),
        }
    }
}

// Default value functions
fn default_app_name() -> String {
    "market-client".to_string()
}

fn default_env() -> Environment {
    Environment::Development
}

fn default_api_timeout() -> u64 {
    15
}

fn default_reconnect_base_ms() -> u64 {
    1000
}

fn default_reconnect_max_ms() -> u64 {
    30_000
}

fn default_page_size() -> u32 {
    20
}

/// Parse an optional variable, falling back to a default when unset
fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: impl FnOnce() -> T,
) -> Result<T, ConfigError> {
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(name, raw)),
        None => Ok(default()),
    }
}

impl ClientConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing or invalid
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = match lookup("APP_ENV") {
            Some(raw) => raw.parse()?,
            None => default_env(),
        };
        let failure_policy = match lookup("MARKET_FAILURE_POLICY") {
            Some(raw) => raw.parse()?,
            None => FailurePolicy::default(),
        };

        let config = Self {
            app: AppSettings {
                name: lookup("APP_NAME").unwrap_or_else(default_app_name),
                env,
            },
            api: ApiConfig {
                base_url: lookup("MARKET_API_BASE_URL")
                    .ok_or(ConfigError::MissingVar("MARKET_API_BASE_URL"))?,
                timeout_secs: parse_or(&lookup, "MARKET_API_TIMEOUT_SECS", default_api_timeout)?,
            },
            realtime: RealtimeConfig {
                url: lookup("MARKET_REALTIME_URL")
                    .ok_or(ConfigError::MissingVar("MARKET_REALTIME_URL"))?,
                reconnect_base_ms: parse_or(
                    &lookup,
                    "MARKET_RECONNECT_BASE_MS",
                    default_reconnect_base_ms,
                )?,
                reconnect_max_ms: parse_or(
                    &lookup,
                    "MARKET_RECONNECT_MAX_MS",
                    default_reconnect_max_ms,
                )?,
            },
            feed: FeedConfig {
                page_size: parse_or(&lookup, "MARKET_FEED_PAGE_SIZE", default_page_size)?,
                failure_policy,
            },
            token: lookup("MARKET_TOKEN").filter(|t| !t.trim().is_empty()),
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.feed.page_size == 0 {
            return Err(ConfigError::InvalidValue(
                "MARKET_FEED_PAGE_SIZE",
                "0".to_string(),
            ));
        }
        if self.realtime.reconnect_max_ms < self.realtime.reconnect_base_ms {
            return Err(ConfigError::InvalidValue(
                "MARKET_RECONNECT_MAX_MS",
                self.realtime.reconnect_max_ms.to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
