//! services/api/src/web/notifications.rs
//!
//! Handlers for the polled notification inbox.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use ride_share_core::domain::EntityId;
use std::sync::Arc;

use crate::web::dto::NotificationResponse;
use crate::web::rest::{port_failure, HandlerError};
use crate::web::state::{AppState, CurrentUser};

/// GET /api/notifications - The caller's notifications, newest first
#[utoipa::path(
    get,
    path = "/api/notifications",
    responses(
        (status = 200, description = "Notifications", body = [NotificationResponse])
    )
)]
pub async fn list_notifications_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
) -> Result<Json<Vec<NotificationResponse>>, HandlerError> {
    let notifications = state
        .notifications
        .list_for_user(user_id)
        .await
        .map_err(port_failure("Failed to load notifications"))?;
    Ok(Json(notifications.into_iter().map(Into::into).collect()))
}

/// PATCH /api/notifications/{id}/read - Mark a notification as read
#[utoipa::path(
    patch,
    path = "/api/notifications/{id}/read",
    params(
        ("id" = i64, Path, description = "Notification id")
    ),
    responses(
        (status = 200, description = "Marked as read (unknown ids are ignored)")
    )
)]
pub async fn mark_notification_read_handler(
    State(state): State<Arc<AppState>>,
    Path(notification_id): Path<EntityId>,
) -> Result<StatusCode, HandlerError> {
    state
        .notifications
        .mark_read(notification_id)
        .await
        .map_err(port_failure("Failed to update notification"))?;
    Ok(StatusCode::OK)
}
