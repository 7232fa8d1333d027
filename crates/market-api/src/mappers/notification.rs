//! Notification mapper

use market_core::Notification;

use crate::models::NotificationModel;

impl From<NotificationModel> for Notification {
    fn from(model: NotificationModel) -> Self {
        Self {
            id: model.id,
            recipient_id: model.recipient_id,
            kind: model.kind,
            related_id: model.related_id,
            is_read: model.is_read,
            created_at: model.created_at,
        }
    }
}
