//! Notification wire model

use chrono::{DateTime, Utc};
use market_core::{ActivityKind, Id};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationModel {
    pub id: Id,
    pub recipient_id: Id,
    #[serde(rename = "type", default)]
    pub kind: ActivityKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_id: Option<Id>,
    #[serde(default)]
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}
