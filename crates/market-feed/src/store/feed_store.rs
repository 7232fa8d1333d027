//! Feed state store - the ordered posts shown on the feed screen
//!
//! The epoch moves whenever the content is replaced or cleared. Writers that
//! started against an older epoch are refused.

use market_core::{FeedQuery, Id, Post};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Default)]
struct FeedState {
    posts: Vec<Post>,
    /// Last page merged into `posts` (0 = nothing loaded)
    last_page: u32,
    exhausted: bool,
    /// Post whose comment sheet is open
    active_post: Option<Id>,
    epoch: u64,
}

/// Ordered collection of posts owned by the feed screen
#[derive(Debug, Default)]
pub struct FeedStore {
    state: RwLock<FeedState>,
    loading: AtomicBool,
}

impl FeedStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Copy of every post in display order
    pub fn snapshot(&self) -> Vec<Post> {
        self.state.read().posts.clone()
    }

    /// Copy of a single post
    pub fn post(&self, post_id: Id) -> Option<Post> {
        self.state.read().posts.iter().find(|p| p.id == post_id).cloned()
    }

    pub fn contains(&self, post_id: Id) -> bool {
        self.state.read().posts.iter().any(|p| p.id == post_id)
    }

    pub fn len(&self) -> usize {
        self.state.read().posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().posts.is_empty()
    }

    /// Whether the last page came back short
    pub fn is_exhausted(&self) -> bool {
        self.state.read().exhausted
    }

    /// Current content epoch
    pub fn epoch(&self) -> u64 {
        self.state.read().epoch
    }

    /// Query for the page after the last merged one
    pub fn next_query(&self, page_size: u32) -> FeedQuery {
        FeedQuery {
            page: self.state.read().last_page + 1,
            page_size,
        }
    }

    // ========================================================================
    // Writes
    // ========================================================================

    /// Run a closure against one post under the write lock
    ///
    /// Returns `None` if the post is not in the store.
    pub fn update_post<R>(&self, post_id: Id, f: impl FnOnce(&mut Post) -> R) -> Option<R> {
        let mut state = self.state.write();
        state.posts.iter_mut().find(|p| p.id == post_id).map(f)
    }

    /// Like `update_post`, also returning the epoch the change was made in
    pub fn update_post_stamped<R>(
        &self,
        post_id: Id,
        f: impl FnOnce(&mut Post) -> R,
    ) -> Option<(R, u64)> {
        let mut state = self.state.write();
        let epoch = state.epoch;
        state
            .posts
            .iter_mut()
            .find(|p| p.id == post_id)
            .map(|post| (f(post), epoch))
    }

    /// Run a closure against one post only if the content is still from `epoch`
    pub fn update_post_in<R>(
        &self,
        epoch: u64,
        post_id: Id,
        f: impl FnOnce(&mut Post) -> R,
    ) -> Option<R> {
        let mut state = self.state.write();
        if state.epoch != epoch {
            return None;
        }
        state.posts.iter_mut().find(|p| p.id == post_id).map(f)
    }

    /// Replace the content with a freshly fetched first page
    pub fn replace(&self, posts: Vec<Post>, query: FeedQuery) {
        let mut state = self.state.write();
        Self::replace_locked(&mut state, posts, query);
    }

    /// Replace the content unless it moved past `epoch` while the page was
    /// being fetched. Returns whether the page was stored.
    pub fn replace_if_current(&self, epoch: u64, posts: Vec<Post>, query: FeedQuery) -> bool {
        let mut state = self.state.write();
        if state.epoch != epoch {
            return false;
        }
        Self::replace_locked(&mut state, posts, query);
        true
    }

    fn replace_locked(state: &mut FeedState, posts: Vec<Post>, query: FeedQuery) {
        state.epoch += 1;
        state.exhausted = posts.len() < query.page_size as usize;
        state.last_page = query.page;
        if let Some(active) = state.active_post {
            if !posts.iter().any(|p| p.id == active) {
                state.active_post = None;
            }
        }
        state.posts = posts;
    }

    /// Append a page, skipping posts already present
    ///
    /// Returns how many posts were added.
    pub fn append(&self, page: Vec<Post>, query: FeedQuery) -> usize {
        let mut state = self.state.write();
        Self::append_locked(&mut state, page, query)
    }

    /// Append a page unless the content moved past `epoch` meanwhile
    pub fn append_if_current(&self, epoch: u64, page: Vec<Post>, query: FeedQuery) -> Option<usize> {
        let mut state = self.state.write();
        if state.epoch != epoch {
            return None;
        }
        Some(Self::append_locked(&mut state, page, query))
    }

    fn append_locked(state: &mut FeedState, page: Vec<Post>, query: FeedQuery) -> usize {
        state.exhausted = page.len() < query.page_size as usize;
        state.last_page = query.page;

        let mut added = 0;
        for post in page {
            if state.posts.iter().any(|p| p.id == post.id) {
                continue;
            }
            state.posts.push(post);
            added += 1;
        }
        added
    }

    /// Drop everything (screen teardown)
    pub fn clear(&self) {
        let mut state = self.state.write();
        let epoch = state.epoch + 1;
        *state = FeedState {
            epoch,
            ..FeedState::default()
        };
    }

    // ========================================================================
    // Comment sheet
    // ========================================================================

    pub fn active_post(&self) -> Option<Id> {
        self.state.read().active_post
    }

    /// Mark a post's comment sheet as open; fails if the post is unknown
    pub fn set_active_post(&self, post_id: Id) -> bool {
        let mut state = self.state.write();
        if !state.posts.iter().any(|p| p.id == post_id) {
            return false;
        }
        state.active_post = Some(post_id);
        true
    }

    pub fn clear_active_post(&self) {
        self.state.write().active_post = None;
    }

    // ========================================================================
    // Load gate
    // ========================================================================

    /// Claim the single load slot
    ///
    /// Returns `None` if another load is in flight. The slot is released when
    /// the guard drops.
    pub fn try_begin_load(&self) -> Option<LoadGuard<'_>> {
        self.loading
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| LoadGuard { store: self })
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }
}

/// Held while a feed page is being fetched
#[derive(Debug)]
pub struct LoadGuard<'a> {
    store: &'a FeedStore,
}

impl Drop for LoadGuard<'_> {
    fn drop(&mut self) {
        self.store.loading.store(false, Ordering::Release);
    }
}
