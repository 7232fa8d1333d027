//! Test helpers for integration tests
//!
//! Spawns the mock backend, builds client configuration pointing at it and
//! polls for asynchronous effects.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Result;
use market_client::MarketClient;
use market_common::{
    ApiConfig, AppSettings, ClientConfig, Environment, FailurePolicy, FeedConfig, RealtimeConfig,
};
use market_core::Id;
use tokio::task::JoinHandle;

use crate::fixtures::TEST_USER;
use crate::mock_backend::MockBackend;

/// Mock backend bound to an ephemeral port
pub struct TestServer {
    pub addr: SocketAddr,
    pub backend: MockBackend,
    _handle: JoinHandle<()>,
}

impl TestServer {
    /// Start an empty mock backend
    pub async fn start() -> Result<Self> {
        Self::start_with(MockBackend::new()).await
    }

    /// Start a mock backend with prepared data
    pub async fn start_with(backend: MockBackend) -> Result<Self> {
        let (addr, handle) = backend.serve().await?;
        Ok(Self {
            addr,
            backend,
            _handle: handle,
        })
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn realtime_url(&self) -> String {
        format!("ws://{}/realtime", self.addr)
    }

    /// Client configuration pointing at this server
    pub fn client_config(&self, page_size: u32, failure_policy: FailurePolicy) -> ClientConfig {
        ClientConfig {
            app: AppSettings {
                name: "market-client-test".to_string(),
                env: Environment::Development,
            },
            api: ApiConfig {
                base_url: self.base_url(),
                timeout_secs: 5,
            },
            realtime: RealtimeConfig {
                url: self.realtime_url(),
                reconnect_base_ms: 20,
                reconnect_max_ms: 200,
            },
            feed: FeedConfig {
                page_size,
                failure_policy,
            },
            token: Some(token_for(TEST_USER)),
        }
    }

    /// Signed-in client with default settings and no real-time channel
    pub fn client(&self) -> Result<MarketClient> {
        self.client_with(20, FailurePolicy::Revert)
    }

    pub fn client_with(&self, page_size: u32, failure_policy: FailurePolicy) -> Result<MarketClient> {
        Ok(MarketClient::from_config(&self.client_config(page_size, failure_policy))?)
    }
}

/// Unsigned bearer token carrying a user id claim
pub fn token_for(user_id: Id) -> String {
    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &serde_json::json!({ "userId": user_id, "sub": format!("user-{user_id}") }),
        &jsonwebtoken::EncodingKey::from_secret(b"integration"),
    )
    .unwrap_or_default()
}

/// Poll until `condition` holds or `timeout` elapses
pub async fn wait_until<F>(timeout: Duration, mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if condition() {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// Default patience for asynchronous effects
pub const WAIT: Duration = Duration::from_secs(5);
