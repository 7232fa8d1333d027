//! Feed service
//!
//! Fills the feed store: pull-to-refresh, pagination and teardown.

use market_core::{FeedQuery, Id, Post, StoreEvent};
use tracing::{debug, info, instrument};

use super::context::ClientContext;
use super::error::ServiceResult;

/// Result of a load request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A page was fetched; carries how many posts were new
    Loaded(usize),
    /// Another load was already running; nothing was fetched
    InFlight,
    /// The feed has no more pages
    Exhausted,
    /// The feed was torn down while the page was in flight; nothing was stored
    Stale,
}

/// Feed service
pub struct FeedService<'a> {
    ctx: &'a ClientContext,
}

impl<'a> FeedService<'a> {
    /// Create a new FeedService
    pub fn new(ctx: &'a ClientContext) -> Self {
        Self { ctx }
    }

    /// Fetch the first page and replace the store content
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> ServiceResult<LoadOutcome> {
        let store = self.ctx.feed();
        let Some(_guard) = store.try_begin_load() else {
            debug!("Feed load already in flight");
            return Ok(LoadOutcome::InFlight);
        };

        let epoch = store.epoch();
        let query = FeedQuery::first(self.ctx.page_size());
        let posts = self.ctx.social_api().fetch_feed(query).await?;
        let count = posts.len();
        if !store.replace_if_current(epoch, posts, query) {
            debug!("Feed torn down during refresh, page dropped");
            return Ok(LoadOutcome::Stale);
        }

        info!(count, exhausted = store.is_exhausted(), "Feed refreshed");
        self.ctx.emit(StoreEvent::FeedReloaded { count });

        Ok(LoadOutcome::Loaded(count))
    }

    /// Fetch the next page and append unseen posts
    #[instrument(skip(self))]
    pub async fn load_more(&self) -> ServiceResult<LoadOutcome> {
        let store = self.ctx.feed();
        if store.is_exhausted() {
            return Ok(LoadOutcome::Exhausted);
        }
        let Some(_guard) = store.try_begin_load() else {
            debug!("Feed load already in flight");
            return Ok(LoadOutcome::InFlight);
        };

        let epoch = store.epoch();
        let query = store.next_query(self.ctx.page_size());
        let page = self.ctx.social_api().fetch_feed(query).await?;
        let Some(added) = store.append_if_current(epoch, page, query) else {
            debug!(page = query.page, "Feed replaced during load, page dropped");
            return Ok(LoadOutcome::Stale);
        };

        info!(page = query.page, added, exhausted = store.is_exhausted(), "Feed page appended");
        self.ctx.emit(StoreEvent::FeedAppended { added });

        Ok(LoadOutcome::Loaded(added))
    }

    /// Drop all local feed state (screen teardown)
    ///
    /// Loads still in flight store nothing and pending mutations resolve as
    /// `Discarded`.
    pub fn teardown(&self) {
        self.ctx.feed().clear();
        self.ctx.pending().clear();
        self.ctx.emit(StoreEvent::FeedCleared);
        debug!("Feed torn down");
    }

    /// Current posts in display order
    pub fn posts(&self) -> Vec<Post> {
        self.ctx.feed().snapshot()
    }

    /// A single post by id
    pub fn post(&self, post_id: Id) -> Option<Post> {
        self.ctx.feed().post(post_id)
    }
}
