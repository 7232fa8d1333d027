//! In-memory backend and fixtures for service tests

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use market_common::{FailurePolicy, FeedConfig, Session};
use market_core::{
    ActivityKind, ApiResult, Author, ChatMessage, Comment, DomainError, FeedQuery, Id,
    Notification, NotificationApi, Post, PostKind, ReactionSymbol, SocialApi,
};
use parking_lot::Mutex;
use tokio::sync::Notify;

use crate::services::ClientContext;

pub const USER: Id = Id::new(1);
pub const PAGE_SIZE: u32 = 2;

pub fn post(id: i64) -> Post {
    Post::new(
        Id::new(id),
        Author::new(Id::new(100 + id), "Dana Reyes"),
        PostKind::JobPosted,
        format!("post {id}"),
    )
}

pub fn comment(id: i64, post_id: i64) -> Comment {
    Comment::new(
        Id::new(id),
        Id::new(post_id),
        Author::new(Id::new(200), "Sam Ortiz"),
        format!("comment {id}"),
    )
}

pub fn chat(conversation_id: i64, content: &str) -> ChatMessage {
    ChatMessage::new(Id::new(9), Id::new(conversation_id), content.to_string(), Utc::now())
}

pub fn note(id: i64, kind: ActivityKind) -> Notification {
    Notification::new(Id::new(id), USER, kind)
}

pub fn context(backend: Arc<FakeBackend>) -> ClientContext {
    context_with_policy(backend, FailurePolicy::Revert)
}

pub fn context_with_policy(backend: Arc<FakeBackend>, policy: FailurePolicy) -> ClientContext {
    ClientContext::new(
        backend.clone(),
        backend,
        Session::new(USER),
        FeedConfig {
            page_size: PAGE_SIZE,
            failure_policy: policy,
        },
        64,
    )
}

fn refused() -> DomainError {
    DomainError::Rejected {
        status: 500,
        message: "refused".to_string(),
    }
}

/// Scriptable fake of both backend ports
#[derive(Default)]
pub struct FakeBackend {
    posts: Mutex<Vec<Post>>,
    notifications: Mutex<Vec<Notification>>,
    refused_reads: Mutex<HashSet<Id>>,
    reactions_sent: Mutex<Vec<ReactionSymbol>>,
    marked: Mutex<Vec<Id>>,
    fail_mutations: AtomicBool,
    feed_gate: Mutex<Option<Arc<Notify>>>,
    mutation_gates: Mutex<VecDeque<Arc<Notify>>>,
    next_comment_id: AtomicI64,
    feed_calls: AtomicUsize,
    like_calls: AtomicUsize,
    comment_like_calls: AtomicUsize,
    comment_calls: AtomicUsize,
    list_calls: AtomicUsize,
}

impl FakeBackend {
    pub fn with_posts(posts: Vec<Post>) -> Self {
        let backend = Self::default();
        *backend.posts.lock() = posts;
        backend
    }

    pub fn add_notification(&self, notification: Notification) {
        self.notifications.lock().push(notification);
    }

    pub fn refuse_mark_read(&self, id: Id) {
        self.refused_reads.lock().insert(id);
    }

    /// Make every like, reaction, comment-like and comment call fail
    pub fn fail_mutations(&self, fail: bool) {
        self.fail_mutations.store(fail, Ordering::SeqCst);
    }

    /// Hold feed fetches until the returned handle is notified
    pub fn gate_feed(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.feed_gate.lock() = Some(gate.clone());
        gate
    }

    /// Hold the next `count` mutation calls, one handle per call in call order
    pub fn gate_mutations(&self, count: usize) -> Vec<Arc<Notify>> {
        let gates: Vec<_> = (0..count).map(|_| Arc::new(Notify::new())).collect();
        self.mutation_gates.lock().extend(gates.iter().cloned());
        gates
    }

    pub fn marked(&self) -> Vec<Id> {
        self.marked.lock().clone()
    }

    pub fn reactions_sent(&self) -> Vec<ReactionSymbol> {
        self.reactions_sent.lock().clone()
    }

    pub fn feed_calls(&self) -> usize {
        self.feed_calls.load(Ordering::SeqCst)
    }

    pub fn like_calls(&self) -> usize {
        self.like_calls.load(Ordering::SeqCst)
    }

    pub fn comment_like_calls(&self) -> usize {
        self.comment_like_calls.load(Ordering::SeqCst)
    }

    pub fn comment_calls(&self) -> usize {
        self.comment_calls.load(Ordering::SeqCst)
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    async fn mutation_result(&self) -> ApiResult<()> {
        let gate = self.mutation_gates.lock().pop_front();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if self.fail_mutations.load(Ordering::SeqCst) {
            Err(refused())
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl SocialApi for FakeBackend {
    async fn fetch_feed(&self, query: FeedQuery) -> ApiResult<Vec<Post>> {
        self.feed_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.feed_gate.lock().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        let posts = self.posts.lock();
        let start = ((query.page - 1) * query.page_size) as usize;
        Ok(posts
            .iter()
            .skip(start)
            .take(query.page_size as usize)
            .cloned()
            .collect())
    }

    async fn like_post(&self, _post_id: Id, _user_id: Id) -> ApiResult<()> {
        self.like_calls.fetch_add(1, Ordering::SeqCst);
        self.mutation_result().await
    }

    async fn react_to_post(
        &self,
        _post_id: Id,
        _user_id: Id,
        reaction: ReactionSymbol,
    ) -> ApiResult<()> {
        self.reactions_sent.lock().push(reaction);
        self.mutation_result().await
    }

    async fn create_comment(&self, post_id: Id, user_id: Id, content: &str) -> ApiResult<Comment> {
        self.comment_calls.fetch_add(1, Ordering::SeqCst);
        self.mutation_result().await?;
        let id = 1000 + self.next_comment_id.fetch_add(1, Ordering::SeqCst);
        Ok(Comment::new(
            Id::new(id),
            post_id,
            Author::new(user_id, "Me"),
            content.to_string(),
        ))
    }

    async fn like_comment(&self, _comment_id: Id, _user_id: Id) -> ApiResult<()> {
        self.comment_like_calls.fetch_add(1, Ordering::SeqCst);
        self.mutation_result().await
    }
}

#[async_trait]
impl NotificationApi for FakeBackend {
    async fn list_notifications(&self, user_id: Id) -> ApiResult<Vec<Notification>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .notifications
            .lock()
            .iter()
            .filter(|n| n.recipient_id == user_id)
            .cloned()
            .collect())
    }

    async fn mark_read(&self, notification_id: Id) -> ApiResult<()> {
        if self.refused_reads.lock().contains(&notification_id) {
            return Err(refused());
        }
        let mut notifications = self.notifications.lock();
        let target = notifications
            .iter_mut()
            .find(|n| n.id == notification_id)
            .ok_or_else(|| DomainError::Rejected {
                status: 404,
                message: "no such notification".to_string(),
            })?;
        target.is_read = true;
        self.marked.lock().push(notification_id);
        Ok(())
    }
}
