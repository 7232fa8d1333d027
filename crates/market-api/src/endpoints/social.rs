//! HTTP implementation of SocialApi

use async_trait::async_trait;
use tracing::instrument;
use validator::Validate;

use market_core::{ApiResult, Comment, DomainError, FeedQuery, Id, Post, ReactionSymbol, SocialApi};

use crate::client::ApiClient;
use crate::models::{CommentModel, CreateCommentRequest, LikeRequest, PostModel, ReactRequest};

/// HTTP implementation of SocialApi
#[derive(Clone, Debug)]
pub struct HttpSocialApi {
    client: ApiClient,
}

impl HttpSocialApi {
    /// Create a new HttpSocialApi
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SocialApi for HttpSocialApi {
    #[instrument(skip(self))]
    async fn fetch_feed(&self, query: FeedQuery) -> ApiResult<Vec<Post>> {
        let models: Vec<PostModel> = self
            .client
            .get_json(
                "/api/posts/feed",
                &[
                    ("page", query.page.to_string()),
                    ("pageSize", query.page_size.to_string()),
                ],
            )
            .await?;

        Ok(models.into_iter().map(Post::from).collect())
    }

    #[instrument(skip(self))]
    async fn like_post(&self, post_id: Id, user_id: Id) -> ApiResult<()> {
        self.client
            .post_unit(
                &format!("/api/posts/{post_id}/like"),
                Some(&LikeRequest { user_id }),
            )
            .await
    }

    #[instrument(skip(self))]
    async fn react_to_post(
        &self,
        post_id: Id,
        user_id: Id,
        reaction: ReactionSymbol,
    ) -> ApiResult<()> {
        let body = ReactRequest {
            post_id,
            user_id,
            reaction,
        };
        self.client.post_unit("/api/posts/react", Some(&body)).await
    }

    #[instrument(skip(self, content))]
    async fn create_comment(&self, post_id: Id, user_id: Id, content: &str) -> ApiResult<Comment> {
        let body = CreateCommentRequest {
            post_id,
            user_id,
            content: content.to_string(),
        };
        body.validate()
            .map_err(|e| DomainError::ValidationError(e.to_string()))?;

        let model: CommentModel = self.client.post_json("/api/posts/comment", &body).await?;
        Ok(model.into())
    }

    #[instrument(skip(self))]
    async fn like_comment(&self, comment_id: Id, user_id: Id) -> ApiResult<()> {
        self.client
            .post_unit(
                &format!("/api/comments/{comment_id}/like"),
                Some(&LikeRequest { user_id }),
            )
            .await
    }
}
