//! Client context - dependency container for services
//!
//! Holds the backend ports, the session, and the shared state every service
//! works against. Cloning is cheap; clones share the same state.

use std::sync::Arc;

use market_common::{FailurePolicy, FeedConfig, Session};
use market_core::{Id, NotificationApi, SocialApi, StoreEvent};
use tokio::sync::broadcast;

use super::error::{ServiceError, ServiceResult};
use super::unread::UnreadCounter;
use crate::store::{ConversationState, FeedStore, PendingLedger};

/// Default capacity of the store event channel
const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Client context containing all dependencies
///
/// This is the dependency container handed to every service. It provides:
/// - Backend ports (social and notification APIs)
/// - The signed-in session
/// - Feed, pending-mutation and conversation state
/// - The unread counter
/// - The store event channel
#[derive(Clone)]
pub struct ClientContext {
    // Backend ports
    social_api: Arc<dyn SocialApi>,
    notification_api: Arc<dyn NotificationApi>,

    // Session
    session: Session,

    // State
    feed: Arc<FeedStore>,
    pending: Arc<PendingLedger>,
    conversation: Arc<ConversationState>,
    unread: UnreadCounter,

    // Events
    events: broadcast::Sender<StoreEvent>,

    // Settings
    feed_config: FeedConfig,
}

impl ClientContext {
    /// Create a new client context with fresh state
    pub fn new(
        social_api: Arc<dyn SocialApi>,
        notification_api: Arc<dyn NotificationApi>,
        session: Session,
        feed_config: FeedConfig,
        event_capacity: usize,
    ) -> Self {
        let (events, _) = broadcast::channel(event_capacity.max(1));

        Self {
            social_api,
            notification_api,
            session,
            feed: Arc::new(FeedStore::new()),
            pending: Arc::new(PendingLedger::new()),
            conversation: Arc::new(ConversationState::new()),
            unread: UnreadCounter::new(),
            events,
            feed_config,
        }
    }

    // === Backend Ports ===

    pub fn social_api(&self) -> &dyn SocialApi {
        self.social_api.as_ref()
    }

    pub fn notification_api(&self) -> &dyn NotificationApi {
        self.notification_api.as_ref()
    }

    // === Session ===

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Id of the signed-in user
    pub fn user_id(&self) -> Id {
        self.session.user_id
    }

    // === State ===

    pub fn feed(&self) -> &FeedStore {
        &self.feed
    }

    pub fn pending(&self) -> &PendingLedger {
        &self.pending
    }

    pub fn conversation(&self) -> &ConversationState {
        &self.conversation
    }

    pub fn unread(&self) -> &UnreadCounter {
        &self.unread
    }

    // === Events ===

    /// Publish a store event; dropped silently when nobody listens
    pub fn emit(&self, event: StoreEvent) {
        tracing::trace!(event_type = event.event_type(), "Store event");
        self.events.send(event).ok();
    }

    /// Subscribe to store events
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    // === Settings ===

    pub fn page_size(&self) -> u32 {
        self.feed_config.page_size
    }

    pub fn failure_policy(&self) -> FailurePolicy {
        self.feed_config.failure_policy
    }
}

impl std::fmt::Debug for ClientContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientContext")
            .field("session", &self.session)
            .field("feed_config", &self.feed_config)
            .field("posts", &self.feed.len())
            .field("pending", &self.pending.len())
            .finish()
    }
}

/// Builder for creating ClientContext with custom configuration
pub struct ClientContextBuilder {
    social_api: Option<Arc<dyn SocialApi>>,
    notification_api: Option<Arc<dyn NotificationApi>>,
    session: Option<Session>,
    feed_config: FeedConfig,
    event_capacity: usize,
}

impl ClientContextBuilder {
    pub fn new() -> Self {
        Self {
            social_api: None,
            notification_api: None,
            session: None,
            feed_config: FeedConfig::default(),
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }

    pub fn social_api(mut self, api: Arc<dyn SocialApi>) -> Self {
        self.social_api = Some(api);
        self
    }

    pub fn notification_api(mut self, api: Arc<dyn NotificationApi>) -> Self {
        self.notification_api = Some(api);
        self
    }

    pub fn session(mut self, session: Session) -> Self {
        self.session = Some(session);
        self
    }

    pub fn feed_config(mut self, config: FeedConfig) -> Self {
        self.feed_config = config;
        self
    }

    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.feed_config.failure_policy = policy;
        self
    }

    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    /// Build the ClientContext
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if any required dependency is missing
    pub fn build(self) -> ServiceResult<ClientContext> {
        if self.feed_config.page_size == 0 {
            return Err(ServiceError::validation("page_size must be positive"));
        }
        Ok(ClientContext::new(
            self.social_api
                .ok_or_else(|| ServiceError::validation("social_api is required"))?,
            self.notification_api
                .ok_or_else(|| ServiceError::validation("notification_api is required"))?,
            self.session
                .ok_or_else(|| ServiceError::validation("session is required"))?,
            self.feed_config,
            self.event_capacity,
        ))
    }
}

impl Default for ClientContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}
