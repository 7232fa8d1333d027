//! Pending-mutation ledger
//!
//! Every optimistic change is recorded here with the exact delta it applied
//! until the server answers. A failed call takes its entry back out and uses
//! the delta to undo precisely that change.
//!
//! Entries are stamped with the feed epoch they were applied in and a
//! recording sequence. Answers are resolved one at a time under the
//! resolution lock.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use market_core::{Id, LikeToggle, MutationKind, Post, ReactionSymbol, ReactionTransition};
use parking_lot::{Mutex, MutexGuard};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Identifier of one optimistic mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MutationId(Uuid);

impl MutationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MutationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MutationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Local change applied ahead of server confirmation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delta {
    PostLike {
        post_id: Id,
        toggle: LikeToggle,
    },
    Reaction {
        post_id: Id,
        transition: ReactionTransition,
        /// Slot value a failure restores; starts as the transition's previous
        /// value and is handed down when an older pick fails under this one
        restore: Option<ReactionSymbol>,
    },
    CommentLike {
        post_id: Id,
        comment_id: Id,
        toggle: LikeToggle,
    },
}

impl Delta {
    /// Reaction delta restoring the slot the transition started from
    pub fn reaction(post_id: Id, transition: ReactionTransition) -> Self {
        Self::Reaction {
            post_id,
            transition,
            restore: transition.previous(),
        }
    }

    pub fn post_id(&self) -> Id {
        match *self {
            Self::PostLike { post_id, .. }
            | Self::Reaction { post_id, .. }
            | Self::CommentLike { post_id, .. } => post_id,
        }
    }

    pub fn kind(&self) -> MutationKind {
        match self {
            Self::PostLike { .. } => MutationKind::PostLike,
            Self::Reaction { .. } => MutationKind::Reaction,
            Self::CommentLike { .. } => MutationKind::CommentLike,
        }
    }

    /// Undo this delta on its post
    ///
    /// Like toggles always flip back. A reaction is only undone while the
    /// slot still shows its result; otherwise a later pick owns the slot and
    /// nothing changes. Returns whether anything was undone.
    pub fn revert(&self, post: &mut Post) -> bool {
        match *self {
            Self::PostLike { toggle, .. } => {
                post.revert_like(toggle);
                true
            }
            Self::Reaction {
                transition,
                restore,
                ..
            } => post.restore_reaction(transition.resulting(), restore),
            Self::CommentLike {
                comment_id, toggle, ..
            } => match post.comment_mut(comment_id) {
                Some(comment) => {
                    comment.revert_like(toggle);
                    true
                }
                None => false,
            },
        }
    }
}

/// A ledger entry
#[derive(Debug, Clone)]
pub struct PendingMutation {
    pub id: MutationId,
    pub delta: Delta,
    /// Feed epoch the delta was applied in
    pub epoch: u64,
    /// Recording order across the ledger
    pub seq: u64,
    pub started_at: DateTime<Utc>,
}

impl PendingMutation {
    fn is_reaction_on(&self, post_id: Id, epoch: u64) -> bool {
        self.epoch == epoch
            && matches!(self.delta, Delta::Reaction { post_id: p, .. } if p == post_id)
    }
}

/// Concurrent map of in-flight optimistic mutations
#[derive(Debug, Default)]
pub struct PendingLedger {
    entries: DashMap<MutationId, PendingMutation>,
    next_seq: AtomicU64,
    resolution: Mutex<()>,
}

impl PendingLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a delta applied in `epoch` and return its mutation id
    pub fn record(&self, delta: Delta, epoch: u64) -> MutationId {
        let id = MutationId::new();
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        self.entries.insert(
            id,
            PendingMutation {
                id,
                delta,
                epoch,
                seq,
                started_at: Utc::now(),
            },
        );
        id
    }

    /// Serialize the resolution of server answers
    pub fn lock_resolution(&self) -> MutexGuard<'_, ()> {
        self.resolution.lock()
    }

    /// Remove an entry once the server has answered
    pub fn take(&self, id: MutationId) -> Option<PendingMutation> {
        self.entries.remove(&id).map(|(_, entry)| entry)
    }

    /// Whether a reaction pick recorded after `entry` on the same post is
    /// still waiting for its answer
    pub fn has_newer_reaction(&self, entry: &PendingMutation) -> bool {
        let post_id = entry.delta.post_id();
        self.entries
            .iter()
            .any(|e| e.seq > entry.seq && e.is_reaction_on(post_id, entry.epoch))
    }

    /// Give a failed reaction's restore point to the next pick stacked on it
    ///
    /// The pick recorded right after `entry` was planned from a slot the
    /// server never accepted, so its own failure must land on what `entry`
    /// would have restored. Returns false if no such pick is pending.
    pub fn hand_down_restore(&self, entry: &PendingMutation) -> bool {
        let Delta::Reaction { post_id, restore, .. } = entry.delta else {
            return false;
        };
        let next = self
            .entries
            .iter()
            .filter(|e| e.seq > entry.seq && e.is_reaction_on(post_id, entry.epoch))
            .min_by_key(|e| e.seq)
            .map(|e| e.id);

        let Some(next) = next else {
            return false;
        };
        match self.entries.get_mut(&next) {
            Some(mut newer) => {
                if let Delta::Reaction { restore: slot, .. } = &mut newer.delta {
                    *slot = restore;
                }
                true
            }
            None => false,
        }
    }

    /// Number of in-flight mutations touching a post
    pub fn pending_for(&self, post_id: Id) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.delta.post_id() == post_id)
            .count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}
