//! Unread-activity counter
//!
//! The badge value is never incremented locally. Every change comes from a
//! recount: fetch the user's notifications and count the unread ones.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use market_core::{ActivityKind, Id, Notification, StoreEvent};
use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use super::context::ClientContext;
use super::error::ServiceResult;

// ============================================================================
// Snapshot
// ============================================================================

/// Derived badge values
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnreadSnapshot {
    /// Unread chat-message activity
    pub messages: u32,
    /// All other unread activity
    pub activity: u32,
}

impl UnreadSnapshot {
    pub fn total(&self) -> u32 {
        self.messages + self.activity
    }

    /// Count unread notifications, split by chat vs. everything else
    pub fn from_notifications(notifications: &[Notification]) -> Self {
        notifications
            .iter()
            .filter(|n| n.is_unread())
            .fold(Self::default(), |mut acc, n| {
                if n.kind.is_chat() {
                    acc.messages += 1;
                } else {
                    acc.activity += 1;
                }
                acc
            })
    }
}

// ============================================================================
// Counter
// ============================================================================

struct CounterInner {
    tx: watch::Sender<UnreadSnapshot>,
    /// Last generation handed out
    issued: AtomicU64,
    /// Generation of the snapshot currently published
    applied: Mutex<u64>,
}

/// Session-scoped unread counter
///
/// Holds a single derived snapshot. Recounts are numbered so that a slow
/// fetch finishing after a newer one cannot overwrite it.
#[derive(Clone)]
pub struct UnreadCounter {
    inner: Arc<CounterInner>,
}

impl UnreadCounter {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(UnreadSnapshot::default());
        Self {
            inner: Arc::new(CounterInner {
                tx,
                issued: AtomicU64::new(0),
                applied: Mutex::new(0),
            }),
        }
    }

    /// Current badge values
    pub fn current(&self) -> UnreadSnapshot {
        *self.inner.tx.borrow()
    }

    /// Watch badge changes
    pub fn subscribe(&self) -> watch::Receiver<UnreadSnapshot> {
        self.inner.tx.subscribe()
    }

    /// Reserve a generation number for a recount about to start
    pub fn begin_recount(&self) -> u64 {
        self.inner.issued.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Publish a recount result
    ///
    /// Results older than the published one are discarded. Returns true if
    /// the visible value changed.
    pub fn publish(&self, generation: u64, snapshot: UnreadSnapshot) -> bool {
        let mut applied = self.inner.applied.lock();
        if generation < *applied {
            debug!(generation, applied = *applied, "Discarding stale recount");
            return false;
        }
        *applied = generation;
        self.inner.tx.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot;
                true
            }
        })
    }
}

impl Default for UnreadCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for UnreadCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnreadCounter")
            .field("current", &self.current())
            .finish()
    }
}

// ============================================================================
// Service
// ============================================================================

/// Explicit mark-read action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Acknowledgement {
    /// A single notification was opened
    Notification(Id),
    /// Every unread notification pointing at an entity (e.g. a job's thread)
    Related(Id),
    /// Every unread notification of the given kinds (e.g. the requests tab)
    Kinds(Vec<ActivityKind>),
}

impl Acknowledgement {
    fn matches(&self, notification: &Notification) -> bool {
        match self {
            Self::Notification(id) => notification.id == *id,
            Self::Related(entity_id) => notification.relates_to(*entity_id),
            Self::Kinds(kinds) => kinds.contains(&notification.kind),
        }
    }
}

/// Unread service
pub struct UnreadService<'a> {
    ctx: &'a ClientContext,
}

impl<'a> UnreadService<'a> {
    /// Create a new UnreadService
    pub fn new(ctx: &'a ClientContext) -> Self {
        Self { ctx }
    }

    /// Re-fetch notifications and republish the badge
    #[instrument(skip(self))]
    pub async fn recount(&self) -> ServiceResult<UnreadSnapshot> {
        let counter = self.ctx.unread();
        let generation = counter.begin_recount();

        let notifications = self
            .ctx
            .notification_api()
            .list_notifications(self.ctx.user_id())
            .await?;
        let snapshot = UnreadSnapshot::from_notifications(&notifications);

        if counter.publish(generation, snapshot) {
            info!(
                messages = snapshot.messages,
                activity = snapshot.activity,
                "Unread count changed"
            );
            self.ctx.emit(StoreEvent::UnreadChanged {
                messages: snapshot.messages,
                activity: snapshot.activity,
            });
        }

        Ok(counter.current())
    }

    /// Mark notifications read, then recount
    ///
    /// A single-notification acknowledgement fails as a whole. Bulk forms skip
    /// items the server refuses and still recount.
    #[instrument(skip(self))]
    pub async fn acknowledge(&self, ack: Acknowledgement) -> ServiceResult<UnreadSnapshot> {
        let api = self.ctx.notification_api();

        if let Acknowledgement::Notification(id) = ack {
            api.mark_read(id).await?;
            debug!(notification_id = %id, "Notification marked read");
            return self.recount().await;
        }

        let targets: Vec<Id> = api
            .list_notifications(self.ctx.user_id())
            .await?
            .into_iter()
            .filter(|n| n.is_unread() && ack.matches(n))
            .map(|n| n.id)
            .collect();

        let mut marked = 0usize;
        for id in &targets {
            match api.mark_read(*id).await {
                Ok(()) => marked += 1,
                Err(e) => warn!(notification_id = %id, error = %e, "Failed to mark notification read"),
            }
        }
        info!(marked, matched = targets.len(), "Bulk acknowledgement done");

        self.recount().await
    }
}
