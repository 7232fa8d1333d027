//! Test fixtures and data generators

use chrono::{Duration, Utc};
use market_api::models::{AuthorModel, CommentModel, NotificationModel, PostModel, ReactionCountModel};
use market_core::{ActivityKind, Id, PostKind};

/// User the test session signs in as
pub const TEST_USER: Id = Id::new(42);

pub fn author(id: i64) -> AuthorModel {
    AuthorModel {
        id: Id::new(id),
        display_name: format!("user{id}"),
        avatar_url: None,
    }
}

/// A post by another user, newest first when ids grow
pub fn post_model(id: i64) -> PostModel {
    PostModel {
        id: Id::new(id),
        author: author(100 + id),
        kind: PostKind::JobPosted,
        content: format!("Job #{id}: need a logo designer"),
        created_at: Utc::now() - Duration::minutes(id),
        likes_count: 0,
        is_liked: false,
        my_reaction: None,
        reactions: Vec::new(),
        comments: Vec::new(),
    }
}

pub fn comment_model(id: i64, post_id: i64) -> CommentModel {
    CommentModel {
        id: Id::new(id),
        post_id: Id::new(post_id),
        author: author(200 + id),
        content: format!("comment {id}"),
        created_at: Utc::now(),
        likes_count: 0,
        is_liked: false,
    }
}

pub fn tally(reaction: &str, count: u32) -> ReactionCountModel {
    ReactionCountModel {
        reaction: reaction.to_string(),
        count,
    }
}

/// Unread notification for the test user
pub fn notification_model(id: i64, kind: ActivityKind) -> NotificationModel {
    NotificationModel {
        id: Id::new(id),
        recipient_id: TEST_USER,
        kind,
        related_id: None,
        is_read: false,
        created_at: Utc::now(),
    }
}

/// Unread chat notification for a conversation
pub fn chat_notification(id: i64, conversation_id: i64) -> NotificationModel {
    NotificationModel {
        related_id: Some(Id::new(conversation_id)),
        ..notification_model(id, ActivityKind::ChatMessage)
    }
}
