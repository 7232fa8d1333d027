//! HTTP implementation of NotificationApi

use async_trait::async_trait;
use tracing::instrument;

use market_core::{ApiResult, Id, Notification, NotificationApi};

use crate::client::ApiClient;
use crate::models::NotificationModel;

/// HTTP implementation of NotificationApi
#[derive(Clone, Debug)]
pub struct HttpNotificationApi {
    client: ApiClient,
}

impl HttpNotificationApi {
    /// Create a new HttpNotificationApi
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl NotificationApi for HttpNotificationApi {
    #[instrument(skip(self))]
    async fn list_notifications(&self, user_id: Id) -> ApiResult<Vec<Notification>> {
        let models: Vec<NotificationModel> = self
            .client
            .get_json(&format!("/api/notifications/user/{user_id}"), &[])
            .await?;

        Ok(models.into_iter().map(Notification::from).collect())
    }

    #[instrument(skip(self))]
    async fn mark_read(&self, notification_id: Id) -> ApiResult<()> {
        self.client
            .post_unit::<()>(&format!("/api/notifications/{notification_id}/read"), None)
            .await
    }
}
