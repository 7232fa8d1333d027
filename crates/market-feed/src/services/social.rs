//! Social service
//!
//! Optimistic likes, reactions and comment likes, plus comment submission.
//!
//! Toggles change the store synchronously, record the applied delta in the
//! pending ledger, and confirm with the backend on a spawned task. Nothing
//! here waits on the network except `submit_comment`.

use market_common::FailurePolicy;
use market_core::{
    ApiResult, Comment, DomainError, Id, Post, ReactionSymbol, StoreEvent, MAX_COMMENT_LENGTH,
};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use super::context::ClientContext;
use super::error::{ServiceError, ServiceResult};
use crate::store::{Delta, MutationId};

// ============================================================================
// Mutation handle
// ============================================================================

/// How an optimistic mutation ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    /// The server accepted the change
    Confirmed,
    /// The server refused and the local change was rolled back
    Reverted { reason: String },
    /// The server refused but a newer local change already replaced this one
    Superseded { reason: String },
    /// The server refused and the optimistic state was left in place
    Kept { reason: String },
    /// The feed was torn down or refreshed before the server answered
    Discarded,
}

impl MutationOutcome {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, Self::Confirmed)
    }
}

/// Handle to an in-flight optimistic mutation
///
/// Dropping it does not cancel the server call.
#[derive(Debug)]
pub struct MutationHandle {
    id: MutationId,
    task: JoinHandle<MutationOutcome>,
}

impl MutationHandle {
    pub fn id(&self) -> MutationId {
        self.id
    }

    /// Wait for the server to answer
    pub async fn outcome(self) -> ServiceResult<MutationOutcome> {
        self.task
            .await
            .map_err(|e| ServiceError::internal(format!("mutation task failed: {e}")))
    }
}

// ============================================================================
// Service
// ============================================================================

/// Social service
pub struct SocialService<'a> {
    ctx: &'a ClientContext,
}

impl<'a> SocialService<'a> {
    /// Create a new SocialService
    pub fn new(ctx: &'a ClientContext) -> Self {
        Self { ctx }
    }

    /// Flip the current user's like on a post
    #[instrument(skip(self))]
    pub fn toggle_like(&self, post_id: Id) -> ServiceResult<MutationHandle> {
        let (toggle, epoch) = self
            .ctx
            .feed()
            .update_post_stamped(post_id, Post::toggle_like)
            .ok_or(DomainError::PostNotFound(post_id))?;

        debug!(now_liked = toggle.now_liked, "Like toggled locally");
        self.ctx.emit(StoreEvent::PostUpdated { post_id });

        let user_id = self.ctx.user_id();
        Ok(self.dispatch(Delta::PostLike { post_id, toggle }, epoch, move |ctx| async move {
            ctx.social_api().like_post(post_id, user_id).await
        }))
    }

    /// Pick a reaction on a post; picking the held one removes it
    ///
    /// Exactly one server call carries the picked symbol, whatever the
    /// local transition was.
    #[instrument(skip(self))]
    pub fn set_reaction(&self, post_id: Id, symbol: ReactionSymbol) -> ServiceResult<MutationHandle> {
        let (transition, epoch) = self
            .ctx
            .feed()
            .update_post_stamped(post_id, |post| post.set_reaction(symbol))
            .ok_or(DomainError::PostNotFound(post_id))?;

        debug!(?transition, "Reaction changed locally");
        self.ctx.emit(StoreEvent::PostUpdated { post_id });

        let user_id = self.ctx.user_id();
        let requested = transition.requested();
        Ok(self.dispatch(
            Delta::reaction(post_id, transition),
            epoch,
            move |ctx| async move {
                ctx.social_api()
                    .react_to_post(post_id, user_id, requested)
                    .await
            },
        ))
    }

    /// Open a post's comment sheet; comment likes are scoped to it
    pub fn open_comments(&self, post_id: Id) -> ServiceResult<()> {
        if !self.ctx.feed().set_active_post(post_id) {
            return Err(DomainError::PostNotFound(post_id).into());
        }
        debug!(post_id = %post_id, "Comments opened");
        Ok(())
    }

    pub fn close_comments(&self) {
        self.ctx.feed().clear_active_post();
    }

    /// Flip the current user's like on a comment of the open post
    #[instrument(skip(self))]
    pub fn toggle_comment_like(&self, comment_id: Id) -> ServiceResult<MutationHandle> {
        let post_id = self
            .ctx
            .feed()
            .active_post()
            .ok_or(DomainError::NoActivePost)?;

        let (toggle, epoch) = self
            .ctx
            .feed()
            .update_post_stamped(post_id, |post| {
                post.comment_mut(comment_id).map(|c| c.toggle_like())
            })
            .ok_or(DomainError::PostNotFound(post_id))?;
        let toggle = toggle.ok_or(DomainError::CommentNotFound(comment_id))?;

        debug!(post_id = %post_id, now_liked = toggle.now_liked, "Comment like toggled locally");
        self.ctx.emit(StoreEvent::PostUpdated { post_id });

        let user_id = self.ctx.user_id();
        Ok(self.dispatch(
            Delta::CommentLike {
                post_id,
                comment_id,
                toggle,
            },
            epoch,
            move |ctx| async move { ctx.social_api().like_comment(comment_id, user_id).await },
        ))
    }

    /// Post a comment and append the stored copy
    ///
    /// Whitespace-only drafts are ignored (`Ok(None)`, no server call). On
    /// success the draft is cleared; on failure it is kept and a
    /// `CommentFailed` event is emitted.
    #[instrument(skip(self, draft))]
    pub async fn submit_comment(
        &self,
        post_id: Id,
        draft: &mut String,
    ) -> ServiceResult<Option<Comment>> {
        let content = draft.trim();
        if content.is_empty() {
            return Ok(None);
        }
        if content.chars().count() > MAX_COMMENT_LENGTH {
            return Err(DomainError::ContentTooLong {
                max: MAX_COMMENT_LENGTH,
            }
            .into());
        }
        if !self.ctx.feed().contains(post_id) {
            return Err(DomainError::PostNotFound(post_id).into());
        }

        let result = self
            .ctx
            .social_api()
            .create_comment(post_id, self.ctx.user_id(), content)
            .await;

        let comment = match result {
            Ok(comment) => comment,
            Err(e) => {
                warn!(post_id = %post_id, error = %e, "Comment submission failed");
                self.ctx.emit(StoreEvent::CommentFailed {
                    post_id,
                    reason: e.to_string(),
                });
                return Err(e.into());
            }
        };

        let comment_id = comment.id;
        let appended = self
            .ctx
            .feed()
            .update_post(post_id, |post| post.push_comment(comment.clone()))
            .is_some();
        draft.clear();

        if appended {
            self.ctx.emit(StoreEvent::CommentAdded {
                post_id,
                comment_id,
            });
        }
        info!(post_id = %post_id, comment_id = %comment_id, "Comment posted");

        Ok(Some(comment))
    }

    // ========================================================================
    // Confirmation
    // ========================================================================

    /// Record a delta and confirm it with the backend on a spawned task
    fn dispatch<F, Fut>(&self, delta: Delta, epoch: u64, call: F) -> MutationHandle
    where
        F: FnOnce(ClientContext) -> Fut + Send + 'static,
        Fut: std::future::Future<Output = ApiResult<()>> + Send + 'static,
    {
        let id = self.ctx.pending().record(delta, epoch);
        let ctx = self.ctx.clone();

        let task = tokio::spawn(async move {
            let result = call(ctx.clone()).await;
            settle(&ctx, id, result)
        });

        MutationHandle { id, task }
    }
}

/// Apply the server's answer to a pending mutation
///
/// Answers are resolved one at a time. A failure only touches the post if
/// the feed still holds the content the delta was applied to.
fn settle(ctx: &ClientContext, id: MutationId, result: ApiResult<()>) -> MutationOutcome {
    let ledger = ctx.pending();
    let _resolving = ledger.lock_resolution();

    let Some(pending) = ledger.take(id) else {
        debug!(mutation_id = %id, "Mutation answered after teardown");
        return MutationOutcome::Discarded;
    };
    let post_id = pending.delta.post_id();
    let kind = pending.delta.kind();

    let error = match result {
        Ok(()) => {
            debug!(mutation_id = %id, kind = kind.label(), "Mutation confirmed");
            ctx.emit(StoreEvent::MutationConfirmed { post_id, kind });
            return MutationOutcome::Confirmed;
        }
        Err(e) => e,
    };
    let reason = error.to_string();

    if ctx.failure_policy() == FailurePolicy::Keep {
        warn!(
            mutation_id = %id,
            post_id = %post_id,
            kind = kind.label(),
            error = %error,
            "Mutation failed, keeping local state"
        );
        return MutationOutcome::Kept { reason };
    }

    if pending.epoch != ctx.feed().epoch() {
        debug!(mutation_id = %id, error = %error, "Mutation failed against replaced feed content");
        return MutationOutcome::Discarded;
    }

    // a newer pick was planned on top of this one; it inherits the restore point
    if matches!(pending.delta, Delta::Reaction { .. }) && ledger.has_newer_reaction(&pending) {
        ledger.hand_down_restore(&pending);
        warn!(
            mutation_id = %id,
            post_id = %post_id,
            kind = kind.label(),
            error = %error,
            "Mutation failed under a newer pick"
        );
        return MutationOutcome::Superseded { reason };
    }

    let reverted = ctx
        .feed()
        .update_post_in(pending.epoch, post_id, |post| pending.delta.revert(post));

    match reverted {
        None => {
            debug!(mutation_id = %id, error = %error, "Mutation failed after its post left the feed");
            MutationOutcome::Discarded
        }
        Some(false) => {
            warn!(
                mutation_id = %id,
                post_id = %post_id,
                kind = kind.label(),
                error = %error,
                "Mutation failed, newer local state kept"
            );
            MutationOutcome::Superseded { reason }
        }
        Some(true) => {
            warn!(
                mutation_id = %id,
                post_id = %post_id,
                kind = kind.label(),
                error = %error,
                "Mutation failed, reverted"
            );
            ctx.emit(StoreEvent::PostUpdated { post_id });
            ctx.emit(StoreEvent::MutationReverted {
                post_id,
                kind,
                reason: reason.clone(),
            });
            MutationOutcome::Reverted { reason }
        }
    }
}
