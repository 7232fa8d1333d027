//! In-process mock of the marketplace backend
//!
//! REST routes keep their data in memory and behave like the real server
//! (likes and reactions toggle server-side). The `/realtime` route speaks the
//! gateway protocol: Hello, Identify, READY, heartbeats and dispatches.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, Query, Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::StatusCode;
use axum::middleware::{from_fn_with_state, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use futures_util::{SinkExt, StreamExt};
use market_api::models::{
    CommentModel, CreateCommentRequest, NotificationModel, PostModel, ReactRequest,
};
use market_core::{ActivityKind, Id};
use market_gateway::protocol::{GatewayMessage, HelloPayload, OpCode};
use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::fixtures::author;

/// Heartbeat interval announced in Hello
const HEARTBEAT_INTERVAL_MS: u64 = 200;

struct Inner {
    posts: Mutex<Vec<PostModel>>,
    notifications: Mutex<Vec<NotificationModel>>,
    requests: Mutex<Vec<String>>,
    next_comment_id: AtomicI64,

    // failure injection
    fail_mutations: AtomicBool,
    reject_credentials: AtomicBool,
    refuse_identify: AtomicBool,
    mutation_delay_ms: AtomicU64,

    // gateway
    pushes: broadcast::Sender<(String, Value)>,
    kicks: broadcast::Sender<()>,
    ready_sessions: AtomicUsize,
    heartbeats: AtomicUsize,
    subscriptions: Mutex<Vec<(OpCode, Id)>>,
}

/// Shared mock state; clones see the same data
#[derive(Clone)]
pub struct MockBackend {
    inner: Arc<Inner>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    pub fn new() -> Self {
        let inner = Inner {
            posts: Mutex::new(Vec::new()),
            notifications: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
            next_comment_id: AtomicI64::new(500),
            fail_mutations: AtomicBool::new(false),
            reject_credentials: AtomicBool::new(false),
            refuse_identify: AtomicBool::new(false),
            mutation_delay_ms: AtomicU64::new(0),
            pushes: broadcast::channel(64).0,
            kicks: broadcast::channel(4).0,
            ready_sessions: AtomicUsize::new(0),
            heartbeats: AtomicUsize::new(0),
            subscriptions: Mutex::new(Vec::new()),
        };
        Self {
            inner: Arc::new(inner),
        }
    }

    // ========================================================================
    // Seeding & inspection
    // ========================================================================

    pub fn with_posts(self, posts: Vec<PostModel>) -> Self {
        *self.inner.posts.lock() = posts;
        self
    }

    pub fn add_notification(&self, notification: NotificationModel) {
        self.inner.notifications.lock().push(notification);
    }

    pub fn post(&self, id: i64) -> Option<PostModel> {
        self.inner
            .posts
            .lock()
            .iter()
            .find(|p| p.id == Id::new(id))
            .cloned()
    }

    pub fn unread_count(&self) -> usize {
        self.inner
            .notifications
            .lock()
            .iter()
            .filter(|n| !n.is_read)
            .count()
    }

    /// Requests that passed authentication, as `METHOD /path`
    pub fn requests(&self) -> Vec<String> {
        self.inner.requests.lock().clone()
    }

    pub fn count_requests(&self, prefix: &str) -> usize {
        self.inner
            .requests
            .lock()
            .iter()
            .filter(|r| r.starts_with(prefix))
            .count()
    }

    // ========================================================================
    // Failure injection
    // ========================================================================

    /// Answer like/react/comment calls with 500
    pub fn fail_mutations(&self, fail: bool) {
        self.inner.fail_mutations.store(fail, Ordering::SeqCst);
    }

    /// Answer every REST call with 401
    pub fn reject_credentials(&self, reject: bool) {
        self.inner.reject_credentials.store(reject, Ordering::SeqCst);
    }

    /// Close the real-time channel with 4004 after Identify
    pub fn refuse_identify(&self, refuse: bool) {
        self.inner.refuse_identify.store(refuse, Ordering::SeqCst);
    }

    /// Hold mutation answers back for the given time
    pub fn delay_mutations(&self, delay: Duration) {
        self.inner
            .mutation_delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    // ========================================================================
    // Real-time channel
    // ========================================================================

    /// Dispatch an event to every connected socket
    pub fn push(&self, event_type: &str, data: Value) {
        // no receivers just means no socket is connected
        self.inner.pushes.send((event_type.to_string(), data)).ok();
    }

    pub fn push_message(&self, conversation_id: i64, sender_id: i64, content: &str) {
        self.push(
            "RECEIVE_MESSAGE",
            json!({
                "senderId": sender_id,
                "conversationId": conversation_id,
                "content": content,
                "sentAt": Utc::now(),
            }),
        );
    }

    pub fn push_activity(&self, kind: ActivityKind) {
        self.push("NOTIFICATION_CREATE", json!({ "type": kind }));
    }

    /// Drop every open socket without a close frame
    pub fn kick_connections(&self) {
        self.inner.kicks.send(()).ok();
    }

    pub fn ready_sessions(&self) -> usize {
        self.inner.ready_sessions.load(Ordering::SeqCst)
    }

    pub fn heartbeats(&self) -> usize {
        self.inner.heartbeats.load(Ordering::SeqCst)
    }

    /// Subscribe/Unsubscribe frames received, in order
    pub fn subscriptions(&self) -> Vec<(OpCode, Id)> {
        self.inner.subscriptions.lock().clone()
    }

    // ========================================================================
    // Server
    // ========================================================================

    pub fn router(&self) -> Router {
        let api = Router::new()
            .route("/api/posts/feed", get(feed))
            .route("/api/posts/:id/like", post(like_post))
            .route("/api/posts/react", post(react))
            .route("/api/posts/comment", post(create_comment))
            .route("/api/comments/:id/like", post(like_comment))
            .route("/api/notifications/user/:user_id", get(list_notifications))
            .route("/api/notifications/:id/read", post(mark_read))
            .route_layer(from_fn_with_state(self.clone(), require_bearer));

        Router::new()
            .merge(api)
            .route("/realtime", get(realtime))
            .with_state(self.clone())
    }

    /// Bind to an ephemeral port and serve in the background
    pub async fn serve(&self) -> anyhow::Result<(SocketAddr, JoinHandle<()>)> {
        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = listener.local_addr()?;
        let app = self.router();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });
        Ok((addr, handle))
    }

    fn record(&self, line: String) {
        self.inner.requests.lock().push(line);
    }

    async fn mutation_gate(&self) -> Result<(), Response> {
        let delay = self.inner.mutation_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        if self.inner.fail_mutations.load(Ordering::SeqCst) {
            return Err(error(StatusCode::INTERNAL_SERVER_ERROR, "MOCK_FAILURE", "injected failure"));
        }
        Ok(())
    }
}

fn error(status: StatusCode, code: &str, message: &str) -> Response {
    (status, Json(json!({ "code": code, "message": message }))).into_response()
}

// ============================================================================
// REST handlers
// ============================================================================

async fn require_bearer(State(backend): State<MockBackend>, request: Request, next: Next) -> Response {
    let has_bearer = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("Bearer "));

    if !has_bearer || backend.inner.reject_credentials.load(Ordering::SeqCst) {
        return error(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", "invalid token");
    }

    backend.record(format!("{} {}", request.method(), request.uri().path()));
    next.run(request).await
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FeedParams {
    page: usize,
    page_size: usize,
}

async fn feed(State(backend): State<MockBackend>, Query(params): Query<FeedParams>) -> Json<Vec<PostModel>> {
    let posts = backend.inner.posts.lock();
    let page = posts
        .iter()
        .skip(params.page.saturating_sub(1) * params.page_size)
        .take(params.page_size)
        .cloned()
        .collect();
    Json(page)
}

async fn like_post(State(backend): State<MockBackend>, Path(id): Path<i64>) -> Response {
    if let Err(response) = backend.mutation_gate().await {
        return response;
    }
    let mut posts = backend.inner.posts.lock();
    let Some(post) = posts.iter_mut().find(|p| p.id == Id::new(id)) else {
        return error(StatusCode::NOT_FOUND, "POST_NOT_FOUND", "no such post");
    };
    post.is_liked = !post.is_liked;
    if post.is_liked {
        post.likes_count += 1;
    } else {
        post.likes_count = post.likes_count.saturating_sub(1);
    }
    StatusCode::OK.into_response()
}

async fn react(State(backend): State<MockBackend>, Json(body): Json<ReactRequest>) -> Response {
    if let Err(response) = backend.mutation_gate().await {
        return response;
    }
    let mut posts = backend.inner.posts.lock();
    let Some(post) = posts.iter_mut().find(|p| p.id == body.post_id) else {
        return error(StatusCode::NOT_FOUND, "POST_NOT_FOUND", "no such post");
    };

    let picked = body.reaction.as_str().to_string();
    let previous = post.my_reaction.take();
    if let Some(previous) = &previous {
        if let Some(entry) = post.reactions.iter_mut().find(|r| &r.reaction == previous) {
            entry.count = entry.count.saturating_sub(1);
        }
    }
    if previous.as_deref() != Some(picked.as_str()) {
        match post.reactions.iter_mut().find(|r| r.reaction == picked) {
            Some(entry) => entry.count += 1,
            None => post.reactions.push(crate::fixtures::tally(&picked, 1)),
        }
        post.my_reaction = Some(picked);
    }
    post.reactions.retain(|r| r.count > 0);
    StatusCode::OK.into_response()
}

async fn create_comment(
    State(backend): State<MockBackend>,
    Json(body): Json<CreateCommentRequest>,
) -> Response {
    if let Err(response) = backend.mutation_gate().await {
        return response;
    }
    let mut posts = backend.inner.posts.lock();
    let Some(post) = posts.iter_mut().find(|p| p.id == body.post_id) else {
        return error(StatusCode::NOT_FOUND, "POST_NOT_FOUND", "no such post");
    };

    let comment = CommentModel {
        id: Id::new(backend.inner.next_comment_id.fetch_add(1, Ordering::SeqCst)),
        post_id: body.post_id,
        author: author(body.user_id.into_inner()),
        content: body.content,
        created_at: Utc::now(),
        likes_count: 0,
        is_liked: false,
    };
    post.comments.push(comment.clone());
    Json(comment).into_response()
}

async fn like_comment(State(backend): State<MockBackend>, Path(id): Path<i64>) -> Response {
    if let Err(response) = backend.mutation_gate().await {
        return response;
    }
    let mut posts = backend.inner.posts.lock();
    let comment = posts
        .iter_mut()
        .flat_map(|p| p.comments.iter_mut())
        .find(|c| c.id == Id::new(id));
    let Some(comment) = comment else {
        return error(StatusCode::NOT_FOUND, "COMMENT_NOT_FOUND", "no such comment");
    };
    comment.is_liked = !comment.is_liked;
    if comment.is_liked {
        comment.likes_count += 1;
    } else {
        comment.likes_count = comment.likes_count.saturating_sub(1);
    }
    StatusCode::OK.into_response()
}

async fn list_notifications(
    State(backend): State<MockBackend>,
    Path(user_id): Path<i64>,
) -> Json<Vec<NotificationModel>> {
    let notifications = backend
        .inner
        .notifications
        .lock()
        .iter()
        .filter(|n| n.recipient_id == Id::new(user_id))
        .cloned()
        .collect();
    Json(notifications)
}

async fn mark_read(State(backend): State<MockBackend>, Path(id): Path<i64>) -> Response {
    let mut notifications = backend.inner.notifications.lock();
    match notifications.iter_mut().find(|n| n.id == Id::new(id)) {
        Some(notification) => {
            notification.is_read = true;
            StatusCode::NO_CONTENT.into_response()
        }
        None => error(StatusCode::NOT_FOUND, "NOTIFICATION_NOT_FOUND", "no such notification"),
    }
}

// ============================================================================
// Real-time channel
// ============================================================================

async fn realtime(State(backend): State<MockBackend>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| serve_socket(backend, socket))
}

async fn send_frame<S>(sink: &mut S, message: &GatewayMessage) -> bool
where
    S: futures_util::Sink<Message> + Unpin,
{
    match message.to_json() {
        Ok(json) => sink.send(Message::Text(json)).await.is_ok(),
        Err(_) => false,
    }
}

async fn serve_socket(backend: MockBackend, socket: WebSocket) {
    let (mut sink, mut stream) = socket.split();
    let mut pushes = backend.inner.pushes.subscribe();
    let mut kicks = backend.inner.kicks.subscribe();

    let hello = GatewayMessage::hello(HelloPayload::with_interval(HEARTBEAT_INTERVAL_MS));
    if !send_frame(&mut sink, &hello).await {
        return;
    }

    // Identify must come first
    loop {
        match stream.next().await {
            Some(Ok(Message::Text(text))) => {
                if let Some(identify) = GatewayMessage::from_json(&text).ok().and_then(|m| m.as_identify()) {
                    if identify.token.is_empty() {
                        return;
                    }
                    break;
                }
            }
            Some(Ok(_)) => {}
            _ => return,
        }
    }

    if backend.inner.refuse_identify.load(Ordering::SeqCst) {
        let frame = CloseFrame {
            code: 4004,
            reason: "Authentication failed".into(),
        };
        sink.send(Message::Close(Some(frame))).await.ok();
        return;
    }

    let session = backend.inner.ready_sessions.fetch_add(1, Ordering::SeqCst) + 1;
    let mut sequence = 1;
    let ready = GatewayMessage::dispatch("READY", sequence, json!({ "sessionId": format!("session-{session}") }));
    if !send_frame(&mut sink, &ready).await {
        return;
    }

    loop {
        tokio::select! {
            frame = stream.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    let Ok(message) = GatewayMessage::from_json(&text) else {
                        continue;
                    };
                    match message.op {
                        OpCode::Heartbeat => {
                            backend.inner.heartbeats.fetch_add(1, Ordering::SeqCst);
                            if !send_frame(&mut sink, &GatewayMessage::heartbeat_ack()).await {
                                return;
                            }
                        }
                        OpCode::Subscribe | OpCode::Unsubscribe => {
                            if let Some(payload) = message.as_subscription() {
                                backend.inner.subscriptions.lock().push((message.op, payload.conversation_id));
                            }
                        }
                        _ => {}
                    }
                }
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => return,
                Some(Ok(_)) => {}
            },
            push = pushes.recv() => match push {
                Ok((event_type, data)) => {
                    sequence += 1;
                    if !send_frame(&mut sink, &GatewayMessage::dispatch(event_type, sequence, data)).await {
                        return;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(_)) => {}
                Err(broadcast::error::RecvError::Closed) => return,
            },
            _ = kicks.recv() => return,
        }
    }
}
