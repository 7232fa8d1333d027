//! Client facade
//!
//! Builds the HTTP adapters and the client context from configuration and
//! owns the real-time link for the lifetime of the session.

use std::sync::Arc;

use market_api::{ApiClient, HttpNotificationApi, HttpSocialApi};
use market_common::{AppError, AppResult, ClientConfig, RealtimeConfig, Session, TokenStore};
use market_core::{ChatMessage, Id, StoreEvent};
use market_feed::{
    ClientContext, ClientContextBuilder, FeedService, RealtimeRouter, SocialService,
    UnreadService, UnreadSnapshot,
};
use market_gateway::{ConnectionState, GatewayClient, GatewayHandle};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::pump::EventPump;

/// Running gateway plus the task feeding its events into the context
struct RealtimeLink {
    handle: GatewayHandle,
    gateway_task: JoinHandle<()>,
    pump_task: JoinHandle<()>,
}

/// A signed-in marketplace client
pub struct MarketClient {
    ctx: ClientContext,
    tokens: TokenStore,
    realtime_config: RealtimeConfig,
    realtime: Option<RealtimeLink>,
}

impl MarketClient {
    /// Build a client from configuration using the configured token
    pub fn from_config(config: &ClientConfig) -> AppResult<Self> {
        let token = config.token.clone().ok_or(AppError::MissingAuth)?;
        Self::with_token(config, token)
    }

    /// Build a client for an explicit bearer token
    pub fn with_token(config: &ClientConfig, token: impl Into<String>) -> AppResult<Self> {
        let token = token.into();
        let session = Session::from_token(&token)?;
        let tokens = TokenStore::with_token(token);

        let api = ApiClient::new(config.api.clone(), tokens.clone())?;
        let ctx = ClientContextBuilder::new()
            .social_api(Arc::new(HttpSocialApi::new(api.clone())))
            .notification_api(Arc::new(HttpNotificationApi::new(api)))
            .session(session)
            .feed_config(config.feed.clone())
            .build()?;

        info!(user_id = %ctx.user_id(), "Client session created");

        Ok(Self {
            ctx,
            tokens,
            realtime_config: config.realtime.clone(),
            realtime: None,
        })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn context(&self) -> &ClientContext {
        &self.ctx
    }

    pub fn user_id(&self) -> Id {
        self.ctx.user_id()
    }

    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    pub fn feed(&self) -> FeedService<'_> {
        FeedService::new(&self.ctx)
    }

    pub fn social(&self) -> SocialService<'_> {
        SocialService::new(&self.ctx)
    }

    pub fn unread(&self) -> UnreadService<'_> {
        UnreadService::new(&self.ctx)
    }

    pub fn router(&self) -> RealtimeRouter<'_> {
        RealtimeRouter::new(&self.ctx)
    }

    /// Store events for a renderer
    pub fn events(&self) -> broadcast::Receiver<StoreEvent> {
        self.ctx.subscribe()
    }

    /// Unread badge updates
    pub fn badge(&self) -> watch::Receiver<UnreadSnapshot> {
        self.ctx.unread().subscribe()
    }

    // ========================================================================
    // Conversations
    // ========================================================================

    /// Bring a conversation to the foreground and follow it on the channel
    pub fn open_conversation(&self, conversation_id: Id, history: Vec<ChatMessage>) {
        self.router().open_conversation(conversation_id, history);
        if let Some(link) = &self.realtime {
            link.handle.subscribe(conversation_id);
        }
    }

    /// Leave the foreground conversation
    pub fn close_conversation(&self) -> Option<Id> {
        let closed = self.router().close_conversation();
        if let Some(link) = &self.realtime {
            link.handle.unsubscribe();
        }
        closed
    }

    // ========================================================================
    // Real-time channel
    // ========================================================================

    /// Connect the real-time channel; no-op when already started
    pub fn start_realtime(&mut self) {
        if self.realtime.is_some() {
            return;
        }

        let (handle, events, gateway_task) =
            GatewayClient::spawn(self.realtime_config.clone(), self.tokens.clone()).into_parts();
        if let Some(active) = self.ctx.conversation().active() {
            handle.subscribe(active);
        }

        let pump_task = tokio::spawn(EventPump::new(self.ctx.clone()).run(events));
        debug!(url = %self.realtime_config.url, "Realtime channel started");

        self.realtime = Some(RealtimeLink {
            handle,
            gateway_task,
            pump_task,
        });
    }

    pub fn realtime_state(&self) -> ConnectionState {
        self.realtime
            .as_ref()
            .map_or(ConnectionState::Disconnected, |link| link.handle.state())
    }

    /// Stop the channel and tear down feed state
    pub async fn shutdown(mut self) {
        if let Some(link) = self.realtime.take() {
            link.handle.shutdown();
            link.gateway_task.await.ok();
            link.pump_task.await.ok();
        }
        self.feed().teardown();
        info!(user_id = %self.user_id(), "Client session closed");
    }
}

impl std::fmt::Debug for MarketClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarketClient")
            .field("user_id", &self.ctx.user_id())
            .field("tokens", &self.tokens)
            .field("realtime", &self.realtime_state())
            .finish()
    }
}
