//! Domain entities - the client's view of feed and activity objects

mod author;
mod comment;
mod like;
mod message;
mod notification;
mod post;
mod reaction;

pub use author::Author;
pub use comment::{Comment, MAX_COMMENT_LENGTH};
pub use like::LikeToggle;
pub use message::ChatMessage;
pub use notification::{ActivityKind, Notification};
pub use post::{Post, PostKind};
pub use reaction::{ReactionCount, ReactionSymbol, ReactionTally, ReactionTransition};
