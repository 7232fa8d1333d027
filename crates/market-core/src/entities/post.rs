//! Post entity - an item of the social feed
//!
//! Posts carry the current user's view of likes and reactions. The like set
//! itself is never materialized client-side, only `is_liked` and the count.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Author, Comment, LikeToggle, ReactionSymbol, ReactionTally, ReactionTransition};
use crate::value_objects::Id;

/// What a post narrates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum PostKind {
    /// A client published a new job
    JobPosted,
    /// A client accepted a freelancer's bid
    BidAccepted,
    #[default]
    #[serde(other)]
    General,
}

/// Post entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub id: Id,
    pub author: Author,
    pub kind: PostKind,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub likes_count: u32,
    pub is_liked: bool,
    pub my_reaction: Option<ReactionSymbol>,
    pub reactions: ReactionTally,
    pub comments: Vec<Comment>,
}

impl Post {
    /// Create a new Post with no engagement
    pub fn new(id: Id, author: Author, kind: PostKind, content: String) -> Self {
        Self {
            id,
            author,
            kind,
            content,
            created_at: Utc::now(),
            likes_count: 0,
            is_liked: false,
            my_reaction: None,
            reactions: ReactionTally::new(),
            comments: Vec::new(),
        }
    }

    /// Flip the current user's like
    pub fn toggle_like(&mut self) -> LikeToggle {
        LikeToggle::apply(&mut self.is_liked, &mut self.likes_count)
    }

    /// Undo a like toggle whose server call failed
    pub fn revert_like(&mut self, toggle: LikeToggle) {
        toggle.revert(&mut self.is_liked, &mut self.likes_count);
    }

    /// Pick a reaction; picking the held one removes it
    pub fn set_reaction(&mut self, symbol: ReactionSymbol) -> ReactionTransition {
        let transition = ReactionTransition::plan(self.my_reaction, symbol);
        transition.apply(&mut self.my_reaction, &mut self.reactions);
        transition
    }

    /// Undo a reaction transition if the slot still shows its result
    pub fn revert_reaction(&mut self, transition: ReactionTransition) -> bool {
        self.restore_reaction(transition.resulting(), transition.previous())
    }

    /// Move the slot back to `restore` if it still holds `expected`
    ///
    /// The tally follows the slot. Returns false when the slot moved on.
    pub fn restore_reaction(
        &mut self,
        expected: Option<ReactionSymbol>,
        restore: Option<ReactionSymbol>,
    ) -> bool {
        if self.my_reaction != expected {
            return false;
        }
        if let Some(undo) = ReactionTransition::between(self.my_reaction, restore) {
            undo.apply(&mut self.my_reaction, &mut self.reactions);
        }
        true
    }

    /// Find a comment by id
    pub fn comment(&self, comment_id: Id) -> Option<&Comment> {
        self.comments.iter().find(|c| c.id == comment_id)
    }

    /// Find a comment by id for mutation
    pub fn comment_mut(&mut self, comment_id: Id) -> Option<&mut Comment> {
        self.comments.iter_mut().find(|c| c.id == comment_id)
    }

    /// Append a comment at the end of the thread
    pub fn push_comment(&mut self, comment: Comment) {
        self.comments.push(comment);
    }

    #[inline]
    pub fn comment_count(&self) -> usize {
        self.comments.len()
    }

    /// Check that the reaction slot is backed by the tally
    pub fn reaction_consistent(&self) -> bool {
        self.my_reaction
            .is_none_or(|symbol| self.reactions.count_of(symbol) >= 1)
    }
}
