//! Notification route handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use serde_json::{Value, json};

use farmlink_core::NotificationId;

use crate::db::NotificationRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::state::AppState;

/// GET /api/v1/notifications
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
) -> Result<Json<Value>> {
    let notifications = NotificationRepository::new(state.pool())
        .list_for_user(auth.id)
        .await?;

    Ok(Json(json!({
        "status": "success",
        "message": "Notifications fetched successfully",
        "notifications": notifications,
    })))
}

/// PUT /api/v1/notifications/{id}/read
pub async fn mark_read(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
    Path(id): Path<NotificationId>,
) -> Result<Json<Value>> {
    let notification = NotificationRepository::new(state.pool())
        .mark_read(id, auth.id)
        .await?
        .ok_or_else(|| AppError::NotFound("notification not found".to_owned()))?;

    Ok(Json(json!({
        "status": "success",
        "message": "Notification marked as read",
        "notification": notification,
    })))
}
