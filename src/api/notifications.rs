//! Notification endpoints: list own, create (admin), flip read/paid flags.

use super::AppState;
use super::auth::CurrentMember;
use crate::core::notification;
use crate::entities::notification::Model as NotificationModel;
use crate::errors::{Error, Result};
use axum::Json;
use axum::extract::{Path, State};
use serde::Deserialize;

/// GET /api/notifications
///
/// The caller's own notifications plus broadcasts, newest first.
pub async fn list_notifications(
    State(state): State<AppState>,
    caller: CurrentMember,
) -> Result<Json<Vec<NotificationModel>>> {
    let notifications = notification::list_for_member(&state.db, caller.0.id).await?;
    Ok(Json(notifications))
}

/// Body for POST /api/notifications.
#[derive(Debug, Deserialize)]
pub struct CreateNotificationBody {
    /// Member id string, or `"all"` for broadcast
    pub target: String,
    /// Message text
    pub message: String,
    /// Free-form kind tag
    pub kind: String,
    /// Payment amount, for payment-due notifications
    pub amount: Option<f64>,
}

/// POST /api/notifications (admin only: broadcasts and payment reminders)
pub async fn create_notification(
    State(state): State<AppState>,
    caller: CurrentMember,
    Json(body): Json<CreateNotificationBody>,
) -> Result<Json<NotificationModel>> {
    caller.require_admin()?;

    let created = notification::create_notification(
        &state.db,
        body.target,
        body.message,
        body.kind,
        body.amount,
    )
    .await?;
    Ok(Json(created))
}

/// PUT /api/notifications/:id/read (target member or admin)
pub async fn mark_read(
    State(state): State<AppState>,
    caller: CurrentMember,
    Path(notification_id): Path<i64>,
) -> Result<Json<NotificationModel>> {
    authorize_flag_flip(&state, &caller, notification_id).await?;
    let updated = notification::mark_read(&state.db, notification_id).await?;
    Ok(Json(updated))
}

/// PUT /api/notifications/:id/paid (target member or admin)
pub async fn mark_paid(
    State(state): State<AppState>,
    caller: CurrentMember,
    Path(notification_id): Path<i64>,
) -> Result<Json<NotificationModel>> {
    authorize_flag_flip(&state, &caller, notification_id).await?;
    let updated = notification::mark_paid(&state.db, notification_id).await?;
    Ok(Json(updated))
}

/// Flag flips are allowed for the targeted member, anyone for broadcasts,
/// and admins.
async fn authorize_flag_flip(
    state: &AppState,
    caller: &CurrentMember,
    notification_id: i64,
) -> Result<()> {
    if caller.is_admin() {
        return Ok(());
    }

    let visible = notification::list_for_member(&state.db, caller.0.id).await?;
    if visible.iter().any(|n| n.id == notification_id) {
        Ok(())
    } else {
        Err(Error::Forbidden {
            message: "Not your notification".to_string(),
        })
    }
}
