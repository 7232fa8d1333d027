//! Wire models
//!
//! Shapes of the JSON documents exchanged with the REST backend. Field names
//! are camelCase on the wire.

mod notification;
mod post;
mod requests;

pub use notification::NotificationModel;
pub use post::{AuthorModel, CommentModel, PostModel, ReactionCountModel};
pub use requests::{CreateCommentRequest, LikeRequest, ReactRequest};
