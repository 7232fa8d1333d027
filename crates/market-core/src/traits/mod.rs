//! Port traits

mod api;

pub use api::{ApiResult, FeedQuery, NotificationApi, SocialApi};
