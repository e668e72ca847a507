//! Notification domain type.

use chrono::{DateTime, Utc};
use serde::Serialize;

use farmlink_core::{NotificationId, UserId};

/// An in-app notification.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Notification {
    /// Unique notification ID.
    pub id: NotificationId,
    /// User the notification belongs to.
    pub user_id: UserId,
    /// Message body.
    pub message: String,
    /// Whether the user has read it.
    pub is_read: bool,
    /// When the notification was created.
    pub created_at: DateTime<Utc>,
}
